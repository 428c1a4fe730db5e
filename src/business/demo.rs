//! Sample data shown to guest sessions.

use chrono::{Duration, Utc};
use trackforge_common::{Client, Priority, Project, Stage, Task, format_timestamp};

pub fn demo_clients() -> Vec<Client> {
    let now = format_timestamp(Utc::now());
    vec![
        Client {
            id: "demo-client-1".into(),
            name: "Acme Corp".into(),
            email: "contact@acme.com".into(),
            company: "Acme Corporation".into(),
            notes: Some("Enterprise client, yearly renewal".into()),
            created_at: now.clone(),
        },
        Client {
            id: "demo-client-2".into(),
            name: "Jane Doe".into(),
            email: "jane@startup.io".into(),
            company: "StartupIO".into(),
            notes: Some("Early-stage, needs hand-holding".into()),
            created_at: now,
        },
    ]
}

pub fn demo_projects() -> Vec<Project> {
    let now = Utc::now();
    vec![
        Project {
            id: "demo-proj-1".into(),
            title: "Rebrand Landing".into(),
            client_id: "demo-client-1".into(),
            value: 8500.0,
            stage: Stage::InProgress,
            priority: Priority::High,
            due_date: format_timestamp(now + Duration::days(5)),
            created_at: format_timestamp(now),
        },
        Project {
            id: "demo-proj-2".into(),
            title: "Pitch Deck Design".into(),
            client_id: "demo-client-2".into(),
            value: 2400.0,
            stage: Stage::Review,
            priority: Priority::Medium,
            due_date: format_timestamp(now + Duration::days(2)),
            created_at: format_timestamp(now),
        },
    ]
}

pub fn demo_tasks() -> Vec<Task> {
    let now = Utc::now();
    vec![
        Task {
            id: "1".into(),
            title: "Write landing copy".into(),
            description: Some("Keep it short and punchy".into()),
            priority: Priority::High,
            completed: false,
            created_at: format_timestamp(now),
            project_id: None,
        },
        Task {
            id: "2".into(),
            title: "Refactor auth hook".into(),
            description: None,
            priority: Priority::Medium,
            completed: true,
            created_at: format_timestamp(now - Duration::days(1)),
            project_id: None,
        },
        Task {
            id: "3".into(),
            title: "Push latest commit".into(),
            description: None,
            priority: Priority::Low,
            completed: false,
            created_at: format_timestamp(now),
            project_id: None,
        },
    ]
}
