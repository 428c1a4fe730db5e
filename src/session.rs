//! Who the workspace belongs to and where its data lives.

use std::fmt;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{StorageBackend, TrackforgeConfig};
use crate::gateway::{Gateway, LocalGateway, SqliteGateway};
use crate::workspace::Workspace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Demo session on local documents, seeded with sample data once.
    Guest,
    User { id: String },
}

impl Session {
    pub fn is_guest(&self) -> bool {
        matches!(self, Session::Guest)
    }

    /// Build the gateway this session persists through.
    pub fn gateway(&self, config: &TrackforgeConfig) -> Result<Box<dyn Gateway>> {
        let gateway: Box<dyn Gateway> = match self {
            Session::Guest => Box::new(LocalGateway::new(config.guest_dir())),
            Session::User { id } => match config.backend {
                StorageBackend::Local => Box::new(LocalGateway::new(config.user_dir(id))),
                StorageBackend::Sqlite => Box::new(
                    SqliteGateway::open(&config.db_path, id.clone())
                        .context("Failed to open user database")?,
                ),
            },
        };
        Ok(gateway)
    }

    /// Open the workspace for this session, seeding guest data on first use.
    pub async fn open_workspace(
        &self,
        config: &TrackforgeConfig,
    ) -> Result<Workspace<Box<dyn Gateway>>> {
        let gateway = self.gateway(config)?;
        let mut workspace =
            Workspace::open(gateway, config.policy(), config.default_settings())
                .await
                .with_context(|| format!("Failed to load {} session", self))?;

        if self.is_guest() {
            let report = workspace.seed_demo().await;
            if report.value {
                info!(status = ?report.status, "guest workspace seeded with demo data");
            }
        }
        Ok(workspace)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Guest => write!(f, "guest"),
            Session::User { id } => write!(f, "user '{}'", id),
        }
    }
}
