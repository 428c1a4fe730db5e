//! Client commands: `trackforge client`.

use anyhow::Result;
use std::path::Path;

use trackforge_common::{ClientDraft, ClientPatch};

use super::super::{ClientCommands, Cli};
use super::{check_status, non_empty, resolve_id, short_id};

pub async fn cmd_client(cli: &Cli, project_dir: &Path, command: ClientCommands) -> Result<()> {
    let mut ws = super::open_workspace(cli, project_dir).await?;

    match command {
        ClientCommands::Add {
            name,
            email,
            company,
            notes,
        } => {
            let draft = ClientDraft {
                name: non_empty(&name, "Name")?,
                email,
                company,
                notes,
            };
            let report = ws.add_client(draft).await;
            check_status(&report.status)?;
            println!(
                "{} {} ({})",
                console::style("Added").green().bold(),
                report.value.name,
                short_id(&report.value.id)
            );
        }
        ClientCommands::List => {
            if ws.clients().is_empty() {
                println!("No clients.");
                return Ok(());
            }
            for client in ws.clients().clients() {
                let projects = ws
                    .board()
                    .projects()
                    .iter()
                    .filter(|p| p.client_id == client.id)
                    .count();
                println!(
                    "{:<8}  {:<20} {:<24} {:<20} {} project(s)",
                    short_id(&client.id),
                    client.name,
                    client.email,
                    client.company,
                    projects
                );
                if let Some(notes) = &client.notes {
                    println!("          {}", console::style(notes).dim());
                }
            }
        }
        ClientCommands::Update {
            id,
            name,
            email,
            company,
            notes,
        } => {
            let id = client_id(&ws, &id)?;
            let patch = ClientPatch {
                name: name.map(|n| non_empty(&n, "Name")).transpose()?,
                email,
                company,
                notes,
            };
            let report = ws.update_client(&id, &patch).await;
            if check_status(&report.status)? {
                println!("{} {}", console::style("Updated").green().bold(), short_id(&id));
            }
        }
        ClientCommands::Delete { id } => {
            let id = client_id(&ws, &id)?;
            let report = ws.delete_client(&id).await;
            if check_status(&report.status)? {
                println!("{} {}", console::style("Deleted").green().bold(), short_id(&id));
            }
        }
    }

    Ok(())
}

fn client_id(ws: &super::CliWorkspace, prefix: &str) -> Result<String> {
    resolve_id(
        ws.clients().clients().iter().map(|c| c.id.as_str()),
        prefix,
        "client",
    )
}
