//! Guest storage: one JSON document per key in a directory.
//!
//! | Key                    | Content                                        |
//! |------------------------|------------------------------------------------|
//! | `trackforge-business`  | `{state: {clients, projects, businessMode}}`   |
//! | `trackforge-settings`  | `{state: {density, animations}}`               |
//! | `tasks`                | bare task array, newest first                  |
//! | `demo-seeded`          | marker, content `1`                            |

use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use trackforge_common::{Client, Project, Settings, Task};

use super::{Change, Gateway, Snapshot};
use crate::errors::GatewayError;

pub const BUSINESS_KEY: &str = "trackforge-business";
pub const SETTINGS_KEY: &str = "trackforge-settings";
pub const TASKS_KEY: &str = "tasks";
pub const DEMO_SEEDED_KEY: &str = "demo-seeded";

/// Envelope shared by the persisted store documents.
#[derive(Debug, Serialize, Deserialize)]
struct Persisted<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusinessDoc {
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    business_mode: bool,
}

pub struct LocalGateway {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        if key == DEMO_SEEDED_KEY {
            self.dir.join(key)
        } else {
            self.dir.join(format!("{}.json", key))
        }
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, GatewayError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(GatewayError::Read { path, source }),
        }
    }

    async fn read_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, GatewayError> {
        match self.read_raw(key).await? {
            Some(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|source| GatewayError::Corrupt {
                    path: self.path_for(key),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Write through a temp file so a crash never leaves half a document.
    async fn write_raw(&self, key: &str, content: String) -> Result<(), GatewayError> {
        let path = self.path_for(key);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| GatewayError::Write {
                path: self.dir.clone(),
                source,
            })?;
        let tmp = self.dir.join(format!(".{}.tmp", key));
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|source| GatewayError::Write {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| GatewayError::Write { path, source })?;
        debug!(key, "local document written");
        Ok(())
    }

    async fn write_doc<T: Serialize>(&self, key: &str, value: &T) -> Result<(), GatewayError> {
        let content = serde_json::to_string_pretty(value).map_err(|source| GatewayError::Corrupt {
            path: self.path_for(key),
            source,
        })?;
        self.write_raw(key, content).await
    }

    async fn read_snapshot(&self) -> Result<Snapshot, GatewayError> {
        let business = self
            .read_doc::<Persisted<BusinessDoc>>(BUSINESS_KEY)
            .await?
            .map(|p| p.state)
            .unwrap_or_default();
        let settings = self
            .read_doc::<Persisted<Settings>>(SETTINGS_KEY)
            .await?
            .map(|p| p.state);
        let tasks = self
            .read_doc::<Vec<Task>>(TASKS_KEY)
            .await?
            .unwrap_or_default();
        let demo_seeded = self.read_raw(DEMO_SEEDED_KEY).await?.is_some();

        Ok(Snapshot {
            projects: business.projects,
            clients: business.clients,
            business_mode: business.business_mode,
            tasks,
            settings,
            demo_seeded,
        })
    }

    async fn write_business(&self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        let doc = Persisted {
            state: BusinessDoc {
                clients: snapshot.clients.clone(),
                projects: snapshot.projects.clone(),
                business_mode: snapshot.business_mode,
            },
            version: 0,
        };
        self.write_doc(BUSINESS_KEY, &doc).await
    }
}

#[async_trait]
impl Gateway for LocalGateway {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load(&self) -> Result<Snapshot, GatewayError> {
        self.read_snapshot().await
    }

    async fn apply(&self, change: &Change) -> Result<(), GatewayError> {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read_snapshot().await?;
        snapshot.apply(change);

        match change {
            Change::Project(_)
            | Change::Client(_)
            | Change::BusinessMode(_)
            | Change::ReplaceBusiness { .. } => self.write_business(&snapshot).await,
            Change::Task(_) | Change::ReplaceTasks(_) => {
                self.write_doc(TASKS_KEY, &snapshot.tasks).await
            }
            Change::Settings(settings) => {
                let doc = Persisted {
                    state: *settings,
                    version: 0,
                };
                self.write_doc(SETTINGS_KEY, &doc).await
            }
            Change::MarkDemoSeeded => self.write_raw(DEMO_SEEDED_KEY, "1".to_string()).await,
        }
    }
}
