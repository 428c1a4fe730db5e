//! Business mode and sample data: `trackforge business`.

use anyhow::Result;
use std::path::Path;

use super::super::{BusinessCommands, Cli};
use super::check_status;

pub async fn cmd_business(cli: &Cli, project_dir: &Path, command: BusinessCommands) -> Result<()> {
    let mut ws = super::open_workspace(cli, project_dir).await?;

    match command {
        BusinessCommands::Toggle => {
            let report = ws.toggle_business_mode().await;
            check_status(&report.status)?;
            println!(
                "Business mode {}",
                if report.value {
                    console::style("on").green()
                } else {
                    console::style("off").dim()
                }
            );
        }
        BusinessCommands::Demo => {
            check_status(&ws.load_demo_data().await.status)?;
            println!(
                "Loaded demo data: {} clients, {} projects",
                ws.clients().len(),
                ws.board().len()
            );
        }
        BusinessCommands::Clear => {
            check_status(&ws.clear_data().await.status)?;
            println!("Cleared all clients and projects");
        }
        BusinessCommands::Reset => {
            check_status(&ws.reset().await.status)?;
            println!("Business data reset");
        }
    }

    Ok(())
}
