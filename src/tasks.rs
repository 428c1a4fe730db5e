//! Personal task list, newest first.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trackforge_common::{Task, TaskDraft, TaskPatch, new_id, now_timestamp};

use crate::board::{NoOp, Outcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskChange {
    Insert(Task),
    Update(Task),
    Delete { id: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a task at the top of the list.
    pub fn add(&mut self, draft: TaskDraft) -> Task {
        let task = draft.into_task(new_id(), now_timestamp());
        debug!(id = %task.id, "task added");
        self.tasks.insert(0, task.clone());
        task
    }

    pub fn toggle(&mut self, id: &str) -> Outcome {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                Outcome::Applied
            }
            None => {
                debug!(id, "task toggle ignored: unknown id");
                Outcome::Unchanged(NoOp::UnknownId)
            }
        }
    }

    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Outcome {
        if patch.is_empty() {
            return Outcome::Unchanged(NoOp::EmptyPatch);
        }
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                patch.apply_to(task);
                Outcome::Applied
            }
            None => {
                debug!(id, "task update ignored: unknown id");
                Outcome::Unchanged(NoOp::UnknownId)
            }
        }
    }

    pub fn delete(&mut self, id: &str) -> Outcome {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            Outcome::Unchanged(NoOp::UnknownId)
        } else {
            Outcome::Applied
        }
    }

    pub fn replay(&mut self, change: &TaskChange) {
        match change {
            TaskChange::Insert(task) => match self.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => self.tasks.insert(0, task.clone()),
            },
            TaskChange::Update(task) => {
                if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *existing = task.clone();
                }
            }
            TaskChange::Delete { id } => self.tasks.retain(|t| &t.id != id),
        }
    }
}
