use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use super::{Change, Gateway, Snapshot};
use crate::db::{DbHandle, TrackerDb};
use crate::errors::GatewayError;

/// Gateway over the SQLite database, scoped to one user's rows.
#[derive(Clone)]
pub struct SqliteGateway {
    db: DbHandle,
    user_id: String,
}

impl SqliteGateway {
    pub fn open(path: &Path, user_id: impl Into<String>) -> Result<Self, GatewayError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GatewayError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let db = TrackerDb::new(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))
            .map_err(GatewayError::Database)?;
        Ok(Self::with_db(DbHandle::new(db), user_id))
    }

    pub fn with_db(db: DbHandle, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn load(&self) -> Result<Snapshot, GatewayError> {
        let user_id = self.user_id.clone();
        self.db
            .call(move |db| db.load_snapshot(&user_id))
            .await
            .map_err(GatewayError::Database)
    }

    async fn apply(&self, change: &Change) -> Result<(), GatewayError> {
        let user_id = self.user_id.clone();
        let kind = change.kind();
        let change = change.clone();
        self.db
            .call(move |db| db.apply_change(&user_id, &change))
            .await
            .map_err(GatewayError::Database)?;
        debug!(user_id = %self.user_id, kind, "change written to sqlite");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::draft;
    use crate::board::{ProjectBoard, ProjectChange};
    use tempfile::TempDir;
    use trackforge_common::Stage;

    fn memory_gateway(user: &str) -> SqliteGateway {
        SqliteGateway::with_db(DbHandle::new(TrackerDb::new_in_memory().unwrap()), user)
    }

    #[tokio::test]
    async fn test_sqlite_gateway_mirrors_board() {
        let gateway = memory_gateway("u1");
        let mut board = ProjectBoard::new();
        let a = board.add(draft("A", Stage::All));
        let b = board.add(draft("B", Stage::All));
        for p in [&a, &b] {
            gateway
                .apply(&Change::Project(ProjectChange::Insert(p.clone())))
                .await
                .unwrap();
        }

        board.move_to_stage(&a.id, Stage::Review, None);
        let change = ProjectChange::reposition_of(&board, &a.id).unwrap();
        gateway.apply(&Change::Project(change)).await.unwrap();

        let snapshot = gateway.load().await.unwrap();
        assert_eq!(snapshot.projects, board.projects());
    }

    #[tokio::test]
    async fn test_sqlite_gateway_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("trackforge.db");

        {
            let gateway = SqliteGateway::open(&path, "u1").unwrap();
            gateway.apply(&Change::BusinessMode(true)).await.unwrap();
        }

        let gateway = SqliteGateway::open(&path, "u1").unwrap();
        assert!(gateway.load().await.unwrap().business_mode);

        let other = SqliteGateway::open(&path, "u2").unwrap();
        assert!(!other.load().await.unwrap().business_mode);
    }
}
