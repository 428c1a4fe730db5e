//! Task commands: `trackforge task`.

use anyhow::Result;
use std::path::Path;

use trackforge_common::{Priority, Task, TaskDraft, TaskPatch};

use super::super::{Cli, TaskCommands};
use super::{CliWorkspace, check_status, display_date, non_empty, resolve_id, short_id};

pub async fn cmd_task(cli: &Cli, project_dir: &Path, command: TaskCommands) -> Result<()> {
    let mut ws = super::open_workspace(cli, project_dir).await?;

    match command {
        TaskCommands::Add {
            title,
            description,
            priority,
            project,
            done,
        } => {
            let project_id = project.map(|p| project_id(&ws, &p)).transpose()?;
            let draft = TaskDraft {
                title: non_empty(&title, "Title")?,
                description,
                priority,
                completed: Some(done),
                project_id,
            };
            let report = ws.add_task(draft).await;
            check_status(&report.status)?;
            println!(
                "{} {} ({})",
                console::style("Added").green().bold(),
                report.value.title,
                short_id(&report.value.id)
            );
        }
        TaskCommands::List { pending, completed } => {
            let tasks: Vec<&Task> = ws
                .tasks()
                .tasks()
                .iter()
                .filter(|t| !pending || !t.completed)
                .filter(|t| !completed || t.completed)
                .collect();
            if tasks.is_empty() {
                println!("No tasks.");
                return Ok(());
            }
            for task in tasks {
                print_task(task);
            }
        }
        TaskCommands::Toggle { id } => {
            let id = task_id(&ws, &id)?;
            let report = ws.toggle_task(&id).await;
            if check_status(&report.status)? {
                if let Some(task) = ws.tasks().get(&id) {
                    print_task(task);
                }
            }
        }
        TaskCommands::Update {
            id,
            title,
            description,
            priority,
            project,
        } => {
            let id = task_id(&ws, &id)?;
            let patch = TaskPatch {
                title: title.map(|t| non_empty(&t, "Title")).transpose()?,
                description,
                priority,
                completed: None,
                project_id: project.map(|p| project_id(&ws, &p)).transpose()?,
            };
            let report = ws.update_task(&id, &patch).await;
            if check_status(&report.status)? {
                println!("{} {}", console::style("Updated").green().bold(), short_id(&id));
            }
        }
        TaskCommands::Delete { id } => {
            let id = task_id(&ws, &id)?;
            let report = ws.delete_task(&id).await;
            if check_status(&report.status)? {
                println!("{} {}", console::style("Deleted").green().bold(), short_id(&id));
            }
        }
    }

    Ok(())
}

fn print_task(task: &Task) {
    let mark = if task.completed {
        console::style("[x]").green()
    } else {
        console::style("[ ]").dim()
    };
    let priority = match task.priority {
        Priority::High => console::style("high").red(),
        Priority::Medium => console::style("medium").yellow(),
        Priority::Low => console::style("low").dim(),
    };
    println!(
        "{} {:<8}  {:<32} {:<6} {}",
        mark,
        short_id(&task.id),
        task.title,
        priority,
        display_date(&task.created_at)
    );
    if let Some(description) = &task.description {
        println!("             {}", console::style(description).dim());
    }
}

fn task_id(ws: &CliWorkspace, prefix: &str) -> Result<String> {
    resolve_id(
        ws.tasks().tasks().iter().map(|t| t.id.as_str()),
        prefix,
        "task",
    )
}

fn project_id(ws: &CliWorkspace, prefix: &str) -> Result<String> {
    resolve_id(
        ws.board().projects().iter().map(|p| p.id.as_str()),
        prefix,
        "project",
    )
}
