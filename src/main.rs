use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trackforge::config::StorageBackend;
use trackforge_common::{Density, Priority, Stage};

mod cmd;

#[derive(Parser)]
#[command(name = "trackforge")]
#[command(version, about = "Tasks, clients and a kanban project board")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Use the guest workspace even when a user is configured
    #[arg(long, global = true)]
    pub guest: bool,

    /// Storage for signed-in sessions (local, sqlite). Overrides trackforge.toml.
    #[arg(long, global = true)]
    pub backend: Option<StorageBackend>,

    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .trackforge/ with a default trackforge.toml
    Init,
    /// Show the project board, one column per stage
    Board,
    /// Dashboard numbers and the weekly completion rhythm
    Stats,
    /// Manage projects on the board
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage clients
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },
    /// Manage personal tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// View or change display settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Business mode and sample data
    Business {
        #[command(subcommand)]
        command: BusinessCommands,
    },
    /// View or create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ProjectCommands {
    Add {
        title: String,
        #[arg(long)]
        client: Option<String>,
        #[arg(long, default_value = "0")]
        value: f64,
        #[arg(long, default_value = "all")]
        stage: Stage,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Due date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        due: Option<String>,
    },
    List {
        #[arg(long)]
        stage: Option<Stage>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Move a project into a stage, optionally at a column position
    Move {
        id: String,
        stage: String,
        #[arg(long, allow_negative_numbers = true)]
        index: Option<isize>,
    },
    /// Reorder a project within its column
    Reorder {
        stage: Stage,
        from: usize,
        to: usize,
    },
    /// Drag a card and drop it on a column, optionally at a slot
    Drag {
        id: String,
        stage: Stage,
        #[arg(long)]
        slot: Option<usize>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ClientCommands {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long)]
        notes: Option<String>,
    },
    List,
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Link the task to a project
        #[arg(long)]
        project: Option<String>,
        /// Create the task already completed
        #[arg(long)]
        done: bool,
    },
    List {
        #[arg(long, conflicts_with = "completed")]
        pending: bool,
        #[arg(long)]
        completed: bool,
    },
    Toggle {
        id: String,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        project: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum SettingsCommands {
    Show,
    Density { density: Density },
    /// Flip animations on or off
    Animations,
}

#[derive(Subcommand, Clone)]
pub enum BusinessCommands {
    /// Flip business mode on or off
    Toggle,
    /// Replace clients and projects with sample data
    Demo,
    /// Remove all clients and projects
    Clear,
    Reset,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    Show,
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    trackforge::logging::init(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::Board => cmd::cmd_board(&cli, &project_dir).await?,
        Commands::Stats => cmd::cmd_stats(&cli, &project_dir).await?,
        Commands::Project { command } => {
            cmd::cmd_project(&cli, &project_dir, command.clone()).await?
        }
        Commands::Client { command } => {
            cmd::cmd_client(&cli, &project_dir, command.clone()).await?
        }
        Commands::Task { command } => cmd::cmd_task(&cli, &project_dir, command.clone()).await?,
        Commands::Settings { command } => {
            cmd::cmd_settings(&cli, &project_dir, command.clone()).await?
        }
        Commands::Business { command } => {
            cmd::cmd_business(&cli, &project_dir, command.clone()).await?
        }
        Commands::Config { command } => cmd::cmd_config(&cli, &project_dir, command.clone())?,
    }

    Ok(())
}
