//! Persistence gateways.
//!
//! A [`Gateway`] loads a [`Snapshot`] of everything a session owns and
//! applies one [`Change`] per applied mutation. Stores mutate their own state
//! first; the gateway only mirrors what already happened locally.
//!
//! | Gateway          | Used for                                        |
//! |------------------|-------------------------------------------------|
//! | `LocalGateway`   | guest sessions, JSON documents in a directory   |
//! | `SqliteGateway`  | user sessions, rows scoped by user id           |
//! | `MemoryGateway`  | in-process state, failure injection             |

pub mod local;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trackforge_common::{Client, Project, Settings, Task};

use crate::board::{ProjectBoard, ProjectChange};
use crate::business::{ClientBook, ClientChange};
use crate::errors::GatewayError;
use crate::tasks::{TaskChange, TaskList};

pub use local::LocalGateway;
pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

/// Everything persisted for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub business_mode: bool,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// `None` until settings have been saved once.
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub demo_seeded: bool,
}

/// One applied mutation, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "change", rename_all = "snake_case")]
pub enum Change {
    Project(ProjectChange),
    Client(ClientChange),
    Task(TaskChange),
    Settings(Settings),
    BusinessMode(bool),
    /// Replace all projects and clients at once (demo load, clear, reset).
    ReplaceBusiness {
        projects: Vec<Project>,
        clients: Vec<Client>,
        business_mode: bool,
    },
    ReplaceTasks(Vec<Task>),
    MarkDemoSeeded,
}

impl Change {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Project(_) => "project",
            Self::Client(_) => "client",
            Self::Task(_) => "task",
            Self::Settings(_) => "settings",
            Self::BusinessMode(_) => "business_mode",
            Self::ReplaceBusiness { .. } => "replace_business",
            Self::ReplaceTasks(_) => "replace_tasks",
            Self::MarkDemoSeeded => "mark_demo_seeded",
        }
    }
}

impl Snapshot {
    /// Apply a change the same way the stores produced it.
    pub fn apply(&mut self, change: &Change) {
        match change {
            Change::Project(change) => {
                let mut board = ProjectBoard::from_projects(std::mem::take(&mut self.projects));
                board.replay(change);
                self.projects = board.into_projects();
            }
            Change::Client(change) => {
                let mut book = ClientBook::from_clients(std::mem::take(&mut self.clients));
                book.replay(change);
                self.clients = book.into_clients();
            }
            Change::Task(change) => {
                let mut list = TaskList::from_tasks(std::mem::take(&mut self.tasks));
                list.replay(change);
                self.tasks = list.into_tasks();
            }
            Change::Settings(settings) => self.settings = Some(*settings),
            Change::BusinessMode(on) => self.business_mode = *on,
            Change::ReplaceBusiness {
                projects,
                clients,
                business_mode,
            } => {
                self.projects = projects.clone();
                self.clients = clients.clone();
                self.business_mode = *business_mode;
            }
            Change::ReplaceTasks(tasks) => self.tasks = tasks.clone(),
            Change::MarkDemoSeeded => self.demo_seeded = true,
        }
    }
}

/// Storage behind a workspace.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn load(&self) -> Result<Snapshot, GatewayError>;

    async fn apply(&self, change: &Change) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Box<G> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn load(&self) -> Result<Snapshot, GatewayError> {
        (**self).load().await
    }

    async fn apply(&self, change: &Change) -> Result<(), GatewayError> {
        (**self).apply(change).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::draft;
    use trackforge_common::{Density, Stage};

    #[test]
    fn test_snapshot_apply_mirrors_board_moves() {
        let mut board = ProjectBoard::new();
        let mut snapshot = Snapshot::default();
        let a = board.add(draft("A", Stage::All));
        let b = board.add(draft("B", Stage::All));
        snapshot.apply(&Change::Project(ProjectChange::Insert(a.clone())));
        snapshot.apply(&Change::Project(ProjectChange::Insert(b.clone())));

        board.move_to_stage(&b.id, Stage::Done, None);
        let change = ProjectChange::reposition_of(&board, &b.id).unwrap();
        snapshot.apply(&Change::Project(change));

        assert_eq!(snapshot.projects, board.projects());
    }

    #[test]
    fn test_snapshot_apply_flags_and_settings() {
        let mut snapshot = Snapshot::default();
        snapshot.apply(&Change::BusinessMode(true));
        snapshot.apply(&Change::MarkDemoSeeded);
        snapshot.apply(&Change::Settings(Settings {
            density: Density::Compact,
            animations: false,
        }));

        assert!(snapshot.business_mode);
        assert!(snapshot.demo_seeded);
        assert_eq!(snapshot.settings.unwrap().density, Density::Compact);
    }

    #[test]
    fn test_change_json_shape() {
        let json = serde_json::to_value(Change::BusinessMode(true)).unwrap();
        assert_eq!(json["type"], "business_mode");
        assert_eq!(json["change"], true);
        assert_eq!(Change::MarkDemoSeeded.kind(), "mark_demo_seeded");
    }
}
