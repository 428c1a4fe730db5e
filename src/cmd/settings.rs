//! Display settings: `trackforge settings`.

use anyhow::Result;
use std::path::Path;

use super::super::{Cli, SettingsCommands};
use super::check_status;

pub async fn cmd_settings(
    cli: &Cli,
    project_dir: &Path,
    command: Option<SettingsCommands>,
) -> Result<()> {
    let mut ws = super::open_workspace(cli, project_dir).await?;

    match command {
        None | Some(SettingsCommands::Show) => {
            let settings = ws.settings();
            println!("density = {}", settings.density);
            println!(
                "animations = {}",
                if settings.animations { "on" } else { "off" }
            );
        }
        Some(SettingsCommands::Density { density }) => {
            let report = ws.set_density(density).await;
            check_status(&report.status)?;
            println!("density = {}", report.value.density);
        }
        Some(SettingsCommands::Animations) => {
            let report = ws.toggle_animations().await;
            check_status(&report.status)?;
            println!("animations = {}", if report.value { "on" } else { "off" });
        }
    }

    Ok(())
}
