use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh opaque record id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Format an instant the way every persisted timestamp is stored.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as a stored timestamp string.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parse a stored timestamp. Returns `None` for anything that is not RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Enumerations ──────────────────────────────────────────────────────

/// Kanban column a project sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    All,
    InProgress,
    Review,
    Done,
}

impl Stage {
    /// Every stage in board order.
    pub const ALL: [Stage; 4] = [Stage::All, Stage::InProgress, Stage::Review, Stage::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Column index on the board, used to sort rows loaded from storage.
    pub fn rank(&self) -> usize {
        match self {
            Self::All => 0,
            Self::InProgress => 1,
            Self::Review => 2,
            Self::Done => 3,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "in-progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(format!(
                "Invalid stage: {} (expected all, in-progress, review or done)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Layout density preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Comfortable,
    Compact,
}

impl Density {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comfortable => "comfortable",
            Self::Compact => "compact",
        }
    }
}

impl std::fmt::Display for Density {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Density {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comfortable" => Ok(Self::Comfortable),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Invalid density: {}", s)),
        }
    }
}

// ── Projects ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    /// Empty when the project is not assigned to a client.
    #[serde(default)]
    pub client_id: String,
    pub value: f64,
    pub stage: Stage,
    pub priority: Priority,
    pub due_date: String,
    pub created_at: String,
}

/// Everything a caller supplies when creating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub title: String,
    #[serde(default)]
    pub client_id: String,
    pub value: f64,
    pub stage: Stage,
    pub priority: Priority,
    pub due_date: String,
}

impl ProjectDraft {
    pub fn into_project(self, id: String, created_at: String) -> Project {
        Project {
            id,
            title: self.title,
            client_id: self.client_id,
            value: self.value,
            stage: self.stage,
            priority: self.priority,
            due_date: self.due_date,
            created_at,
        }
    }
}

/// Field patch for a project. Stage only changes through a move or reorder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub client_id: Option<String>,
    pub value: Option<f64>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.client_id.is_none()
            && self.value.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }

    pub fn apply_to(&self, project: &mut Project) {
        if let Some(title) = &self.title {
            project.title = title.clone();
        }
        if let Some(client_id) = &self.client_id {
            project.client_id = client_id.clone();
        }
        if let Some(value) = self.value {
            project.value = value;
        }
        if let Some(priority) = self.priority {
            project.priority = priority;
        }
        if let Some(due_date) = &self.due_date {
            project.due_date = due_date.clone();
        }
    }
}

// ── Clients ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub company: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClientDraft {
    pub fn into_client(self, id: String, created_at: String) -> Client {
        Client {
            id,
            name: self.name,
            email: self.email,
            company: self.company,
            notes: self.notes,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.company.is_none() && self.notes.is_none()
    }

    pub fn apply_to(&self, client: &mut Client) {
        if let Some(name) = &self.name {
            client.name = name.clone();
        }
        if let Some(email) = &self.email {
            client.email = email.clone();
        }
        if let Some(company) = &self.company {
            client.company = company.clone();
        }
        if let Some(notes) = &self.notes {
            client.notes = Some(notes.clone());
        }
    }
}

// ── Tasks ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl TaskDraft {
    pub fn into_task(self, id: String, created_at: String) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            completed: self.completed.unwrap_or(false),
            created_at,
            project_id: self.project_id,
        }
    }
}

/// Field patch for a task; `createdAt` can never be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
    pub project_id: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.project_id.is_none()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(project_id) = &self.project_id {
            task.project_id = Some(project_id.clone());
        }
    }
}

// ── Settings ──────────────────────────────────────────────────────────

/// Display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub density: Density,
    #[serde(default = "default_animations")]
    pub animations: bool,
}

fn default_animations() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            density: Density::default(),
            animations: default_animations(),
        }
    }
}
