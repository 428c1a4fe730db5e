//! Project board commands: `trackforge project`.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use trackforge::dnd::DragController;
use trackforge_common::{Density, ProjectDraft, ProjectPatch, format_timestamp};

use super::super::{Cli, ProjectCommands};
use super::board::{column_title, print_card};
use super::{
    CliWorkspace, check_status, check_value, non_empty, parse_due, resolve_assignment, resolve_id,
    short_id,
};

pub async fn cmd_project(cli: &Cli, project_dir: &Path, command: ProjectCommands) -> Result<()> {
    let mut ws = super::open_workspace(cli, project_dir).await?;

    match command {
        ProjectCommands::Add {
            title,
            client,
            value,
            stage,
            priority,
            due,
        } => {
            let client_id = match client {
                Some(prefix) => client_id(&ws, &prefix)?,
                None => String::new(),
            };
            let due_date = match due {
                Some(due) => parse_due(&due)?,
                None => format_timestamp(Utc::now()),
            };
            let draft = ProjectDraft {
                title: non_empty(&title, "Title")?,
                client_id,
                value: check_value(value)?,
                stage,
                priority,
                due_date,
            };
            let report = ws.add_project(draft).await;
            check_status(&report.status)?;
            println!(
                "{} {} ({}) in {}",
                console::style("Added").green().bold(),
                report.value.title,
                short_id(&report.value.id),
                report.value.stage
            );
        }
        ProjectCommands::List { stage } => {
            let compact = ws.settings().density == Density::Compact;
            let view = ws.board().view();
            let mut shown = 0;
            for column in view.columns.iter().filter(|c| stage.is_none_or(|s| s == c.stage)) {
                if column.projects.is_empty() {
                    continue;
                }
                println!("{}", console::style(column_title(column.stage)).bold());
                for (index, project) in column.projects.iter().enumerate() {
                    print_card(index, project, ws.clients(), compact);
                    shown += 1;
                }
            }
            if shown == 0 {
                println!("No projects.");
            }
        }
        ProjectCommands::Update {
            id,
            title,
            client,
            value,
            priority,
            due,
        } => {
            let id = project_id(&ws, &id)?;
            let patch = ProjectPatch {
                title: title.map(|t| non_empty(&t, "Title")).transpose()?,
                client_id: client.map(|c| client_id(&ws, &c)).transpose()?,
                value: value.map(check_value).transpose()?,
                priority,
                due_date: due.map(|d| parse_due(&d)).transpose()?,
            };
            let report = ws.update_project(&id, &patch).await;
            if check_status(&report.status)? {
                println!("{} {}", console::style("Updated").green().bold(), short_id(&id));
            }
        }
        ProjectCommands::Move { id, stage, index } => {
            let id = project_id(&ws, &id)?;
            let report = ws.move_project_named(&id, &stage, index).await;
            if check_status(&report.status)? {
                print_position(&ws, &id);
            }
        }
        ProjectCommands::Reorder { stage, from, to } => {
            let report = ws.reorder_projects(stage, from, to).await;
            if check_status(&report.status)? {
                let ids = ws.board().column_ids(stage);
                if let Some(id) = ids.get(to) {
                    print_position(&ws, id);
                }
            }
        }
        ProjectCommands::Drag { id, stage, slot } => {
            let id = project_id(&ws, &id)?;
            let mut drag = DragController::new();
            if !drag.drag_project(ws.board(), &id) {
                anyhow::bail!("Project {} is not on the board", short_id(&id));
            }
            if let Some(action) = drag.drop(stage, slot) {
                let report = ws.apply_drop(&action).await;
                if check_status(&report.status)? {
                    print_position(&ws, &id);
                }
            }
        }
        ProjectCommands::Delete { id } => {
            let id = project_id(&ws, &id)?;
            let report = ws.delete_project(&id).await;
            if check_status(&report.status)? {
                println!("{} {}", console::style("Deleted").green().bold(), short_id(&id));
            }
        }
    }

    Ok(())
}

fn project_id(ws: &CliWorkspace, prefix: &str) -> Result<String> {
    resolve_id(
        ws.board().projects().iter().map(|p| p.id.as_str()),
        prefix,
        "project",
    )
}

/// A blank reference leaves the project unassigned.
fn client_id(ws: &CliWorkspace, prefix: &str) -> Result<String> {
    resolve_assignment(
        ws.clients().clients().iter().map(|c| c.id.as_str()),
        prefix,
        "client",
    )
}

fn print_position(ws: &CliWorkspace, id: &str) {
    if let Some((stage, index)) = ws.board().index_in_stage(id) {
        println!(
            "{} {} is now #{} in {}",
            console::style("Moved").green().bold(),
            short_id(id),
            index,
            stage
        );
    }
}
