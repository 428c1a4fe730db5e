//! Business workspace: project board, client book and the business-mode flag.

pub mod clients;
pub mod demo;

use tracing::info;
use trackforge_common::{Client, Project};

use crate::board::ProjectBoard;

pub use clients::{ClientBook, ClientChange};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessStore {
    pub board: ProjectBoard,
    pub clients: ClientBook,
    pub business_mode: bool,
}

impl BusinessStore {
    pub fn new(projects: Vec<Project>, clients: Vec<Client>, business_mode: bool) -> Self {
        Self {
            board: ProjectBoard::from_projects(projects),
            clients: ClientBook::from_clients(clients),
            business_mode,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.board.is_empty() || !self.clients.is_empty()
    }

    pub fn toggle_business_mode(&mut self) -> bool {
        self.business_mode = !self.business_mode;
        self.business_mode
    }

    /// Replace clients and projects with the sample set and enable business mode.
    pub fn load_demo_data(&mut self) {
        info!("loading demo business data");
        *self = Self::new(demo::demo_projects(), demo::demo_clients(), true);
    }

    /// Drop all clients and projects and leave business mode.
    pub fn clear_data(&mut self) {
        *self = Self::default();
    }

    pub fn reset(&mut self) {
        self.clear_data();
    }
}
