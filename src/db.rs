use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use trackforge_common::{Client, Density, Priority, Project, Settings, Stage, Task};

use crate::board::ProjectChange;
use crate::business::ClientChange;
use crate::gateway::{Change, Snapshot};
use crate::tasks::TaskChange;

const SETTING_DENSITY: &str = "density";
const SETTING_ANIMATIONS: &str = "animations";
const SETTING_BUSINESS_MODE: &str = "business_mode";
const SETTING_DEMO_SEEDED: &str = "demo_seeded";

/// Async-safe handle to the tracker database.
///
/// Wraps `TrackerDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, keeping synchronous SQLite I/O
/// off the async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<TrackerDb>>,
}

impl DbHandle {
    pub fn new(db: TrackerDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&TrackerDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }
}

pub struct TrackerDb {
    conn: Connection,
}

impl TrackerDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS projects (
                    user_id TEXT NOT NULL,
                    id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    client_id TEXT NOT NULL DEFAULT '',
                    value REAL NOT NULL DEFAULT 0,
                    stage TEXT NOT NULL DEFAULT 'all',
                    position INTEGER NOT NULL DEFAULT 0,
                    priority TEXT NOT NULL DEFAULT 'medium',
                    due_date TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, id)
                );

                CREATE TABLE IF NOT EXISTS clients (
                    user_id TEXT NOT NULL,
                    id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL DEFAULT '',
                    company TEXT NOT NULL DEFAULT '',
                    notes TEXT,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, id)
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    user_id TEXT NOT NULL,
                    id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT,
                    priority TEXT NOT NULL DEFAULT 'medium',
                    completed INTEGER NOT NULL DEFAULT 0,
                    project_id TEXT,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, id)
                );

                CREATE TABLE IF NOT EXISTS settings (
                    user_id TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                    PRIMARY KEY (user_id, key)
                );

                CREATE INDEX IF NOT EXISTS idx_projects_stage ON projects(user_id, stage, position);
                CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(user_id, created_at);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── Snapshot ──────────────────────────────────────────────────────

    pub fn load_snapshot(&self, user_id: &str) -> Result<Snapshot> {
        let density = self.get_setting(user_id, SETTING_DENSITY)?;
        let animations = self.get_setting(user_id, SETTING_ANIMATIONS)?;
        let settings = match (density, animations) {
            (None, None) => None,
            (density, animations) => Some(Settings {
                density: density
                    .map(|d| Density::from_str(&d).map_err(|e| anyhow::anyhow!(e)))
                    .transpose()
                    .context("Failed to parse stored density")?
                    .unwrap_or_default(),
                animations: animations.map(|a| a == "true").unwrap_or(true),
            }),
        };

        Ok(Snapshot {
            projects: self.list_projects(user_id)?,
            clients: self.list_clients(user_id)?,
            business_mode: self.get_flag(user_id, SETTING_BUSINESS_MODE)?,
            tasks: self.list_tasks(user_id)?,
            settings,
            demo_seeded: self.get_flag(user_id, SETTING_DEMO_SEEDED)?,
        })
    }

    pub fn apply_change(&self, user_id: &str, change: &Change) -> Result<()> {
        match change {
            Change::Project(ProjectChange::Insert(project)) => self.insert_project(user_id, project),
            Change::Project(ProjectChange::Update(project)) => self.update_project(user_id, project),
            Change::Project(ProjectChange::Delete { id }) => self.delete_project(user_id, id),
            Change::Project(ProjectChange::Reposition { id, stage, column }) => {
                self.reposition_project(user_id, id, *stage, column)
            }
            Change::Client(ClientChange::Insert(client)) => self.upsert_client(user_id, client),
            Change::Client(ClientChange::Update(client)) => self.update_client(user_id, client),
            Change::Client(ClientChange::Delete { id }) => self.delete_client(user_id, id),
            Change::Task(TaskChange::Insert(task)) => self.upsert_task(user_id, task),
            Change::Task(TaskChange::Update(task)) => self.update_task(user_id, task),
            Change::Task(TaskChange::Delete { id }) => self.delete_task(user_id, id),
            Change::Settings(settings) => {
                self.set_setting(user_id, SETTING_DENSITY, settings.density.as_str())?;
                self.set_setting(
                    user_id,
                    SETTING_ANIMATIONS,
                    if settings.animations { "true" } else { "false" },
                )
            }
            Change::BusinessMode(on) => self.set_flag(user_id, SETTING_BUSINESS_MODE, *on),
            Change::ReplaceBusiness {
                projects,
                clients,
                business_mode,
            } => self.replace_business(user_id, projects, clients, *business_mode),
            Change::ReplaceTasks(tasks) => self.replace_tasks(user_id, tasks),
            Change::MarkDemoSeeded => self.set_flag(user_id, SETTING_DEMO_SEEDED, true),
        }
    }

    // ── Projects ──────────────────────────────────────────────────────

    /// Projects grouped by stage in board order, each column by position.
    pub fn list_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, client_id, value, stage, priority, due_date, created_at
                 FROM projects WHERE user_id = ?1 ORDER BY position, rowid",
            )
            .context("Failed to prepare list_projects")?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(ProjectRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    client_id: row.get(2)?,
                    value: row.get(3)?,
                    stage: row.get(4)?,
                    priority: row.get(5)?,
                    due_date: row.get(6)?,
                    created_at: row.get(7)?,
                })
            })
            .context("Failed to query projects")?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row.context("Failed to read project row")?.into_project()?);
        }
        projects.sort_by_key(|p| p.stage.rank());
        Ok(projects)
    }

    /// Insert at the end of the project's column. Re-inserting an existing id
    /// rewrites the row in place.
    pub fn insert_project(&self, user_id: &str, project: &Project) -> Result<()> {
        let max_pos: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(position), -1) FROM projects WHERE user_id = ?1 AND stage = ?2",
                params![user_id, project.stage.as_str()],
                |row| row.get(0),
            )
            .context("Failed to get max position")?;

        self.conn
            .execute(
                "INSERT INTO projects (user_id, id, title, client_id, value, stage, position, priority, due_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(user_id, id) DO UPDATE SET
                    title = excluded.title,
                    client_id = excluded.client_id,
                    value = excluded.value,
                    priority = excluded.priority,
                    due_date = excluded.due_date",
                params![
                    user_id,
                    project.id,
                    project.title,
                    project.client_id,
                    project.value,
                    project.stage.as_str(),
                    max_pos + 1,
                    project.priority.as_str(),
                    project.due_date,
                    project.created_at,
                ],
            )
            .context("Failed to insert project")?;
        Ok(())
    }

    /// Rewrite the mutable fields. Stage, position and creation time stay.
    pub fn update_project(&self, user_id: &str, project: &Project) -> Result<()> {
        self.conn
            .execute(
                "UPDATE projects SET title = ?1, client_id = ?2, value = ?3, priority = ?4, due_date = ?5
                 WHERE user_id = ?6 AND id = ?7",
                params![
                    project.title,
                    project.client_id,
                    project.value,
                    project.priority.as_str(),
                    project.due_date,
                    user_id,
                    project.id,
                ],
            )
            .context("Failed to update project")?;
        Ok(())
    }

    pub fn delete_project(&self, user_id: &str, id: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM projects WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
            )
            .context("Failed to delete project")?;
        Ok(())
    }

    /// Put `id` into `stage` and renumber that column to match `column`.
    pub fn reposition_project(
        &self,
        user_id: &str,
        id: &str,
        stage: Stage,
        column: &[String],
    ) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin reposition transaction")?;
        tx.execute(
            "UPDATE projects SET stage = ?1 WHERE user_id = ?2 AND id = ?3",
            params![stage.as_str(), user_id, id],
        )
        .context("Failed to update project stage")?;
        for (position, member) in column.iter().enumerate() {
            tx.execute(
                "UPDATE projects SET position = ?1 WHERE user_id = ?2 AND id = ?3 AND stage = ?4",
                params![position as i64, user_id, member, stage.as_str()],
            )
            .context("Failed to update project position")?;
        }
        tx.commit().context("Failed to commit reposition")?;
        Ok(())
    }

    // ── Clients ───────────────────────────────────────────────────────

    pub fn list_clients(&self, user_id: &str) -> Result<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, email, company, notes, created_at
                 FROM clients WHERE user_id = ?1 ORDER BY rowid",
            )
            .context("Failed to prepare list_clients")?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(Client {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    company: row.get(3)?,
                    notes: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .context("Failed to query clients")?;
        let mut clients = Vec::new();
        for row in rows {
            clients.push(row.context("Failed to read client row")?);
        }
        Ok(clients)
    }

    pub fn upsert_client(&self, user_id: &str, client: &Client) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO clients (user_id, id, name, email, company, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id, id) DO UPDATE SET
                    name = excluded.name,
                    email = excluded.email,
                    company = excluded.company,
                    notes = excluded.notes",
                params![
                    user_id,
                    client.id,
                    client.name,
                    client.email,
                    client.company,
                    client.notes,
                    client.created_at,
                ],
            )
            .context("Failed to upsert client")?;
        Ok(())
    }

    pub fn update_client(&self, user_id: &str, client: &Client) -> Result<()> {
        self.conn
            .execute(
                "UPDATE clients SET name = ?1, email = ?2, company = ?3, notes = ?4
                 WHERE user_id = ?5 AND id = ?6",
                params![
                    client.name,
                    client.email,
                    client.company,
                    client.notes,
                    user_id,
                    client.id,
                ],
            )
            .context("Failed to update client")?;
        Ok(())
    }

    pub fn delete_client(&self, user_id: &str, id: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM clients WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
            )
            .context("Failed to delete client")?;
        Ok(())
    }

    // ── Tasks ─────────────────────────────────────────────────────────

    /// Tasks newest first.
    pub fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, description, priority, completed, project_id, created_at
                 FROM tasks WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            )
            .context("Failed to prepare list_tasks")?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(TaskRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    priority: row.get(3)?,
                    completed: row.get(4)?,
                    project_id: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .context("Failed to query tasks")?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row.context("Failed to read task row")?.into_task()?);
        }
        Ok(tasks)
    }

    pub fn upsert_task(&self, user_id: &str, task: &Task) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO tasks (user_id, id, title, description, priority, completed, project_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(user_id, id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    priority = excluded.priority,
                    completed = excluded.completed,
                    project_id = excluded.project_id",
                params![
                    user_id,
                    task.id,
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.completed,
                    task.project_id,
                    task.created_at,
                ],
            )
            .context("Failed to upsert task")?;
        Ok(())
    }

    pub fn update_task(&self, user_id: &str, task: &Task) -> Result<()> {
        self.conn
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, completed = ?4, project_id = ?5
                 WHERE user_id = ?6 AND id = ?7",
                params![
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.completed,
                    task.project_id,
                    user_id,
                    task.id,
                ],
            )
            .context("Failed to update task")?;
        Ok(())
    }

    pub fn delete_task(&self, user_id: &str, id: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM tasks WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
            )
            .context("Failed to delete task")?;
        Ok(())
    }

    // ── Bulk replacement ──────────────────────────────────────────────

    pub fn replace_business(
        &self,
        user_id: &str,
        projects: &[Project],
        clients: &[Client],
        business_mode: bool,
    ) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin replace transaction")?;
        tx.execute("DELETE FROM projects WHERE user_id = ?1", params![user_id])
            .context("Failed to clear projects")?;
        tx.execute("DELETE FROM clients WHERE user_id = ?1", params![user_id])
            .context("Failed to clear clients")?;
        for client in clients {
            self.upsert_client(user_id, client)?;
        }
        for project in projects {
            self.insert_project(user_id, project)?;
        }
        self.set_flag(user_id, SETTING_BUSINESS_MODE, business_mode)?;
        tx.commit().context("Failed to commit business replacement")?;
        Ok(())
    }

    pub fn replace_tasks(&self, user_id: &str, tasks: &[Task]) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin replace transaction")?;
        tx.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])
            .context("Failed to clear tasks")?;
        // Oldest first so rowid order matches the newest-first list.
        for task in tasks.iter().rev() {
            self.upsert_task(user_id, task)?;
        }
        tx.commit().context("Failed to commit task replacement")?;
        Ok(())
    }

    // ── Settings ──────────────────────────────────────────────────────

    pub fn get_setting(&self, user_id: &str, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("Failed to query setting")
    }

    pub fn set_setting(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings (user_id, key, value, updated_at) VALUES (?1, ?2, ?3, datetime('now'))
                 ON CONFLICT(user_id, key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                params![user_id, key, value],
            )
            .context("Failed to upsert setting")?;
        Ok(())
    }

    fn get_flag(&self, user_id: &str, key: &str) -> Result<bool> {
        Ok(self.get_setting(user_id, key)?.as_deref() == Some("true"))
    }

    fn set_flag(&self, user_id: &str, key: &str, on: bool) -> Result<()> {
        self.set_setting(user_id, key, if on { "true" } else { "false" })
    }
}

// ── Internal row helpers ──────────────────────────────────────────────

/// Intermediate row struct for reading projects before converting the stage
/// and priority strings into typed values.
struct ProjectRow {
    id: String,
    title: String,
    client_id: String,
    value: f64,
    stage: String,
    priority: String,
    due_date: String,
    created_at: String,
}

impl ProjectRow {
    fn into_project(self) -> Result<Project> {
        let stage = Stage::from_str(&self.stage)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse project stage")?;
        let priority = Priority::from_str(&self.priority)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse project priority")?;
        Ok(Project {
            id: self.id,
            title: self.title,
            client_id: self.client_id,
            value: self.value,
            stage,
            priority,
            due_date: self.due_date,
            created_at: self.created_at,
        })
    }
}

struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    priority: String,
    completed: bool,
    project_id: Option<String>,
    created_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let priority = Priority::from_str(&self.priority)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse task priority")?;
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            priority,
            completed: self.completed,
            created_at: self.created_at,
            project_id: self.project_id,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
