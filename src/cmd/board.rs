//! `trackforge board`.

use anyhow::Result;
use std::path::Path;

use trackforge::business::ClientBook;
use trackforge_common::{Density, Priority, Project, Stage};

use super::super::Cli;
use super::{display_date, short_id};

pub async fn cmd_board(cli: &Cli, project_dir: &Path) -> Result<()> {
    let ws = super::open_workspace(cli, project_dir).await?;
    let compact = ws.settings().density == Density::Compact;
    let view = ws.board().view();

    for column in &view.columns {
        println!();
        println!(
            "{} ({}) {}",
            console::style(column_title(column.stage)).bold().cyan(),
            column.projects.len(),
            console::style(format!("${:.0}", column.total_value())).dim()
        );
        if column.projects.is_empty() {
            println!("  {}", console::style("(empty)").dim());
        }
        for (index, project) in column.projects.iter().enumerate() {
            print_card(index, project, ws.clients(), compact);
        }
    }
    println!();
    Ok(())
}

/// Column heading, `in-progress` shown as `IN PROGRESS`.
pub(crate) fn column_title(stage: Stage) -> String {
    stage.as_str().replace('-', " ").to_uppercase()
}

pub(crate) fn print_card(index: usize, project: &Project, clients: &ClientBook, compact: bool) {
    if compact {
        println!(
            "  {:>2}. {} {}",
            index,
            short_id(&project.id),
            project.title
        );
        return;
    }

    let client = clients
        .get(&project.client_id)
        .map(|c| c.name.as_str())
        .unwrap_or("-");
    let priority = match project.priority {
        Priority::High => console::style(project.priority.as_str()).red(),
        Priority::Medium => console::style(project.priority.as_str()).yellow(),
        Priority::Low => console::style(project.priority.as_str()).dim(),
    };
    println!(
        "  {:>2}. {:<8}  {:<28} ${:<9.0} {:<6} due {}  {}",
        index,
        short_id(&project.id),
        project.title,
        project.value,
        priority,
        display_date(&project.due_date),
        client
    );
}
