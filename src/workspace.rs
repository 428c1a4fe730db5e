//! Optimistic workspace over one gateway.
//!
//! Every mutation lands on the in-memory stores first. Applied mutations are
//! then forwarded to the gateway as a [`Change`]; when the gateway refuses,
//! the workspace reconciles according to its [`ReconcilePolicy`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trackforge_common::{
    Client, ClientDraft, ClientPatch, Density, Project, ProjectDraft, ProjectPatch, Settings,
    Stage, Task, TaskDraft, TaskPatch,
};

use crate::board::{NoOp, Outcome, ProjectBoard, ProjectChange};
use crate::business::{BusinessStore, ClientBook, ClientChange, demo};
use crate::dnd::DropAction;
use crate::errors::GatewayError;
use crate::gateway::{Change, Gateway, Snapshot};
use crate::settings::SettingsStore;
use crate::stats::Dashboard;
use crate::tasks::{TaskChange, TaskList};

/// What to do with local state after the gateway rejects a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcilePolicy {
    /// Reload the gateway's snapshot.
    #[default]
    Refetch,
    /// Restore the state from before the mutation.
    Revert,
    /// Leave the optimistic state in place.
    Keep,
}

impl ReconcilePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refetch => "refetch",
            Self::Revert => "revert",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "refetch" => Ok(Self::Refetch),
            "revert" => Ok(Self::Revert),
            "keep" => Ok(Self::Keep),
            other => Err(format!(
                "Unknown sync policy '{}' (expected refetch, revert or keep)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Persisted,
    /// The mutation was a no-op; nothing was sent.
    Skipped(NoOp),
    Failed {
        error: String,
        policy: ReconcilePolicy,
    },
}

impl SyncStatus {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted)
    }
}

/// Result of one workspace call.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport<T = ()> {
    pub value: T,
    pub status: SyncStatus,
}

impl<T> SyncReport<T> {
    fn new(value: T, status: SyncStatus) -> Self {
        Self { value, status }
    }
}

/// All in-memory stores of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceState {
    pub business: BusinessStore,
    pub tasks: TaskList,
    pub settings: SettingsStore,
    pub demo_seeded: bool,
}

impl WorkspaceState {
    pub fn from_snapshot(snapshot: Snapshot, default_settings: Settings) -> Self {
        Self {
            business: BusinessStore::new(
                snapshot.projects,
                snapshot.clients,
                snapshot.business_mode,
            ),
            tasks: TaskList::from_tasks(snapshot.tasks),
            settings: SettingsStore::new(snapshot.settings.unwrap_or(default_settings)),
            demo_seeded: snapshot.demo_seeded,
        }
    }
}

pub struct Workspace<G: Gateway> {
    state: WorkspaceState,
    gateway: G,
    policy: ReconcilePolicy,
    default_settings: Settings,
}

impl<G: Gateway> Workspace<G> {
    /// Load the gateway's snapshot into fresh stores.
    pub async fn open(
        gateway: G,
        policy: ReconcilePolicy,
        default_settings: Settings,
    ) -> Result<Self, GatewayError> {
        let snapshot = gateway.load().await?;
        debug!(
            gateway = gateway.name(),
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            "workspace opened"
        );
        Ok(Self {
            state: WorkspaceState::from_snapshot(snapshot, default_settings),
            gateway,
            policy,
            default_settings,
        })
    }

    /// Replace local state with the gateway's snapshot.
    pub async fn refresh(&mut self) -> Result<(), GatewayError> {
        let snapshot = self.gateway.load().await?;
        self.state = WorkspaceState::from_snapshot(snapshot, self.default_settings);
        Ok(())
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn business(&self) -> &BusinessStore {
        &self.state.business
    }

    pub fn board(&self) -> &ProjectBoard {
        &self.state.business.board
    }

    pub fn clients(&self) -> &ClientBook {
        &self.state.business.clients
    }

    pub fn tasks(&self) -> &TaskList {
        &self.state.tasks
    }

    pub fn settings(&self) -> Settings {
        self.state.settings.get()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> Dashboard {
        Dashboard::compute(self.state.tasks.tasks(), &self.state.business, now)
    }

    // ── Projects ──────────────────────────────────────────────────────

    pub async fn add_project(&mut self, draft: ProjectDraft) -> SyncReport<Project> {
        let before = self.state.clone();
        let project = self.state.business.board.add(draft);
        let change = Change::Project(ProjectChange::Insert(project.clone()));
        let status = self.sync(before, vec![change]).await;
        SyncReport::new(project, status)
    }

    pub async fn update_project(&mut self, id: &str, patch: &ProjectPatch) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.business.board.update(id, patch);
        let change = self
            .state
            .business
            .board
            .get(id)
            .map(|p| Change::Project(ProjectChange::Update(p.clone())));
        self.finish(before, outcome, change).await
    }

    pub async fn delete_project(&mut self, id: &str) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.business.board.delete(id);
        let change = Change::Project(ProjectChange::Delete { id: id.to_string() });
        self.finish(before, outcome, Some(change)).await
    }

    pub async fn move_project(
        &mut self,
        id: &str,
        stage: Stage,
        index: Option<isize>,
    ) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.business.board.move_to_stage(id, stage, index);
        let change = self.reposition(id);
        self.finish(before, outcome, change).await
    }

    /// Move using a stage name; unknown names are a no-op.
    pub async fn move_project_named(
        &mut self,
        id: &str,
        stage: &str,
        index: Option<isize>,
    ) -> SyncReport {
        let before = self.state.clone();
        let outcome = self
            .state
            .business
            .board
            .move_to_named_stage(id, stage, index);
        let change = self.reposition(id);
        self.finish(before, outcome, change).await
    }

    pub async fn reorder_projects(&mut self, stage: Stage, from: usize, to: usize) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.business.board.reorder_in_stage(stage, from, to);
        let change = self
            .state
            .business
            .board
            .column_ids(stage)
            .get(to)
            .and_then(|id| self.reposition(id));
        self.finish(before, outcome, change).await
    }

    pub async fn apply_drop(&mut self, action: &DropAction) -> SyncReport {
        match action {
            DropAction::Reorder { stage, from, to } => {
                self.reorder_projects(*stage, *from, *to).await
            }
            DropAction::Move { id, stage, index } => self.move_project(id, *stage, *index).await,
        }
    }

    fn reposition(&self, id: &str) -> Option<Change> {
        ProjectChange::reposition_of(&self.state.business.board, id).map(Change::Project)
    }

    // ── Clients ───────────────────────────────────────────────────────

    pub async fn add_client(&mut self, draft: ClientDraft) -> SyncReport<Client> {
        let before = self.state.clone();
        let client = self.state.business.clients.add(draft);
        let change = Change::Client(ClientChange::Insert(client.clone()));
        let status = self.sync(before, vec![change]).await;
        SyncReport::new(client, status)
    }

    pub async fn update_client(&mut self, id: &str, patch: &ClientPatch) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.business.clients.update(id, patch);
        let change = self
            .state
            .business
            .clients
            .get(id)
            .map(|c| Change::Client(ClientChange::Update(c.clone())));
        self.finish(before, outcome, change).await
    }

    pub async fn delete_client(&mut self, id: &str) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.business.clients.delete(id);
        let change = Change::Client(ClientChange::Delete { id: id.to_string() });
        self.finish(before, outcome, Some(change)).await
    }

    // ── Tasks ─────────────────────────────────────────────────────────

    pub async fn add_task(&mut self, draft: TaskDraft) -> SyncReport<Task> {
        let before = self.state.clone();
        let task = self.state.tasks.add(draft);
        let change = Change::Task(TaskChange::Insert(task.clone()));
        let status = self.sync(before, vec![change]).await;
        SyncReport::new(task, status)
    }

    pub async fn toggle_task(&mut self, id: &str) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.tasks.toggle(id);
        let change = self.task_update(id);
        self.finish(before, outcome, change).await
    }

    pub async fn update_task(&mut self, id: &str, patch: &TaskPatch) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.tasks.update(id, patch);
        let change = self.task_update(id);
        self.finish(before, outcome, change).await
    }

    pub async fn delete_task(&mut self, id: &str) -> SyncReport {
        let before = self.state.clone();
        let outcome = self.state.tasks.delete(id);
        let change = Change::Task(TaskChange::Delete { id: id.to_string() });
        self.finish(before, outcome, Some(change)).await
    }

    fn task_update(&self, id: &str) -> Option<Change> {
        self.state
            .tasks
            .get(id)
            .map(|t| Change::Task(TaskChange::Update(t.clone())))
    }

    // ── Settings ──────────────────────────────────────────────────────

    pub async fn set_density(&mut self, density: Density) -> SyncReport<Settings> {
        let before = self.state.clone();
        self.state.settings.set_density(density);
        let settings = self.state.settings.get();
        let status = self.sync(before, vec![Change::Settings(settings)]).await;
        SyncReport::new(settings, status)
    }

    /// Returns the new animations flag.
    pub async fn toggle_animations(&mut self) -> SyncReport<bool> {
        let before = self.state.clone();
        let on = self.state.settings.toggle_animations();
        let change = Change::Settings(self.state.settings.get());
        let status = self.sync(before, vec![change]).await;
        SyncReport::new(on, status)
    }

    // ── Business ──────────────────────────────────────────────────────

    /// Returns the new business-mode flag.
    pub async fn toggle_business_mode(&mut self) -> SyncReport<bool> {
        let before = self.state.clone();
        let on = self.state.business.toggle_business_mode();
        let status = self.sync(before, vec![Change::BusinessMode(on)]).await;
        SyncReport::new(on, status)
    }

    pub async fn load_demo_data(&mut self) -> SyncReport {
        let before = self.state.clone();
        self.state.business.load_demo_data();
        let change = self.replace_business();
        SyncReport::new((), self.sync(before, vec![change]).await)
    }

    pub async fn clear_data(&mut self) -> SyncReport {
        let before = self.state.clone();
        self.state.business.clear_data();
        let change = self.replace_business();
        SyncReport::new((), self.sync(before, vec![change]).await)
    }

    pub async fn reset(&mut self) -> SyncReport {
        let before = self.state.clone();
        self.state.business.reset();
        let change = self.replace_business();
        SyncReport::new((), self.sync(before, vec![change]).await)
    }

    fn replace_business(&self) -> Change {
        let business = &self.state.business;
        Change::ReplaceBusiness {
            projects: business.board.projects().to_vec(),
            clients: business.clients.clients().to_vec(),
            business_mode: business.business_mode,
        }
    }

    /// Fill an untouched store with sample data, once.
    ///
    /// Returns `false` when the store was already seeded.
    pub async fn seed_demo(&mut self) -> SyncReport<bool> {
        if self.state.demo_seeded {
            return SyncReport::new(false, SyncStatus::Skipped(NoOp::AlreadySeeded));
        }

        let before = self.state.clone();
        let mut changes = Vec::new();

        if self.state.tasks.is_empty() {
            let tasks = demo::demo_tasks();
            self.state.tasks = TaskList::from_tasks(tasks.clone());
            changes.push(Change::ReplaceTasks(tasks));
        }
        if !self.state.business.has_data() {
            self.state.business.load_demo_data();
            changes.push(self.replace_business());
        }
        if !self.state.business.business_mode {
            self.state.business.business_mode = true;
            changes.push(Change::BusinessMode(true));
        }
        self.state.demo_seeded = true;
        changes.push(Change::MarkDemoSeeded);

        let status = self.sync(before, changes).await;
        SyncReport::new(true, status)
    }

    // ── Sync ──────────────────────────────────────────────────────────

    async fn finish(
        &mut self,
        before: WorkspaceState,
        outcome: Outcome,
        change: Option<Change>,
    ) -> SyncReport {
        let status = match (outcome, change) {
            (Outcome::Unchanged(reason), _) => SyncStatus::Skipped(reason),
            (Outcome::Applied, Some(change)) => self.sync(before, vec![change]).await,
            (Outcome::Applied, None) => SyncStatus::Persisted,
        };
        SyncReport::new((), status)
    }

    /// Forward changes in order, stopping at the first failure.
    async fn sync(&mut self, before: WorkspaceState, changes: Vec<Change>) -> SyncStatus {
        for change in &changes {
            if let Err(e) = self.gateway.apply(change).await {
                warn!(
                    gateway = self.gateway.name(),
                    change = change.kind(),
                    policy = %self.policy,
                    error = %e,
                    "failed to persist change"
                );
                self.reconcile(before).await;
                return SyncStatus::Failed {
                    error: e.to_string(),
                    policy: self.policy,
                };
            }
            debug!(gateway = self.gateway.name(), change = change.kind(), "change persisted");
        }
        SyncStatus::Persisted
    }

    async fn reconcile(&mut self, before: WorkspaceState) {
        match self.policy {
            ReconcilePolicy::Keep => {}
            ReconcilePolicy::Revert => self.state = before,
            ReconcilePolicy::Refetch => {
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "refetch failed, reverting local state");
                    self.state = before;
                }
            }
        }
    }
}
