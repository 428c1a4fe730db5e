//! Configuration view and creation commands: `trackforge config`.

use anyhow::Result;
use std::path::Path;

use trackforge::config::{CONFIG_DIR, CONFIG_FILE, TrackforgeToml};

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    let config_dir = project_dir.join(CONFIG_DIR);
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("TrackForge Configuration");
            println!("========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No trackforge.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let config = super::load_config(cli, project_dir)?;
            let toml = &config.toml;

            println!("[storage]");
            println!("  backend = \"{}\"", toml.storage.backend);
            if let Some(dir) = &toml.storage.data_dir {
                println!("  data_dir = \"{}\"", dir.display());
            }
            if let Some(path) = &toml.storage.db_path {
                println!("  db_path = \"{}\"", path.display());
            }
            println!();
            println!("[sync]");
            println!("  on_failure = \"{}\"", toml.sync.on_failure);
            println!();
            println!("[session]");
            if let Some(user) = &toml.session.user_id {
                println!("  user_id = \"{}\"", user);
            }
            println!("  guest = {}", toml.session.guest);
            println!();
            println!("[display]");
            println!("  density = \"{}\"", toml.display.density.as_str());
            println!("  animations = {}", toml.display.animations);
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  session = {}", config.session);
            println!("  backend = {}", config.backend);
            println!("  data_dir = {}", config.data_dir.display());
            println!("  db_path = {}", config.db_path.display());
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("trackforge.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
            }

            TrackforgeToml::default().save(&config_path)?;

            println!("Created trackforge.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [storage] backend, data_dir, db_path");
            println!("  - [sync] on_failure");
            println!("  - [session] user_id, guest");
            println!("  - [display] density, animations");
            println!();
        }
    }

    Ok(())
}
