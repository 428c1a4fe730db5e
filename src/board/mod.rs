//! Ordered project board.
//!
//! ## Overview
//!
//! [`ProjectBoard`] keeps every project in one flat sequence. A project's
//! column is its `stage`; its position inside the column is its position
//! relative to the other projects of that stage in the sequence. There is no
//! separate order field, so moves and reorders rebuild the sequence:
//!
//! ```text
//!   sequence:  A(review) C(done) B(review)
//!   columns:   review = [A, B]   done = [C]
//!
//!   move B -> done @0
//!     remove B           A(review) C(done)
//!     split              rest = [A]   done = [C]
//!     splice @0          done = [B, C]
//!     rebuild            A(review) B(done) C(done)
//! ```
//!
//! Every mutation is total. Unknown ids, stages or indices leave the sequence
//! untouched and are reported through [`Outcome::Unchanged`].
//!
//! Applied mutations also produce a [`ProjectChange`] describing what a
//! persistence backend has to write (see `change`).

pub mod change;
pub mod view;

use std::str::FromStr;

use tracing::debug;
use trackforge_common::{Project, ProjectDraft, ProjectPatch, Stage, new_id, now_timestamp};

pub use change::ProjectChange;
pub use view::{BoardView, ColumnView};

/// Why a mutation left the board untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOp {
    /// No project carries the given id.
    UnknownId,
    /// The stage tag is not one of the four board columns.
    UnknownStage,
    /// A column index fell outside the column.
    IndexOutOfRange,
    /// Source and destination index are equal.
    SameIndex,
    /// The patch carried no fields.
    EmptyPatch,
    /// Demo data was already loaded into this store.
    AlreadySeeded,
}

impl NoOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownId => "unknown id",
            Self::UnknownStage => "unknown stage",
            Self::IndexOutOfRange => "index out of range",
            Self::SameIndex => "same index",
            Self::EmptyPatch => "empty patch",
            Self::AlreadySeeded => "already seeded",
        }
    }
}

impl std::fmt::Display for NoOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a board mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged(NoOp),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectBoard {
    projects: Vec<Project>,
}

impl ProjectBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from a loaded sequence. Order is taken as-is.
    pub fn from_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// The full ordered sequence.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn into_projects(self) -> Vec<Project> {
        self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }

    /// Projects of one stage in display order.
    pub fn column(&self, stage: Stage) -> Vec<&Project> {
        self.projects.iter().filter(|p| p.stage == stage).collect()
    }

    /// All four columns in board order.
    pub fn columns(&self) -> Vec<(Stage, Vec<&Project>)> {
        Stage::ALL
            .iter()
            .map(|stage| (*stage, self.column(*stage)))
            .collect()
    }

    /// Position of a project inside its own column.
    pub fn index_in_stage(&self, id: &str) -> Option<(Stage, usize)> {
        let project = self.get(id)?;
        let stage = project.stage;
        self.projects
            .iter()
            .filter(|p| p.stage == stage)
            .position(|p| p.id == id)
            .map(|index| (stage, index))
    }

    /// Ids of one stage in display order.
    pub fn column_ids(&self, stage: Stage) -> Vec<String> {
        self.projects
            .iter()
            .filter(|p| p.stage == stage)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Append a new project; id and creation time are assigned here.
    pub fn add(&mut self, draft: ProjectDraft) -> Project {
        let project = draft.into_project(new_id(), now_timestamp());
        debug!(id = %project.id, stage = %project.stage, "project added");
        self.projects.push(project.clone());
        project
    }

    /// Patch the mutable fields of a project in place.
    pub fn update(&mut self, id: &str, patch: &ProjectPatch) -> Outcome {
        if patch.is_empty() {
            return self.unchanged("update", id, NoOp::EmptyPatch);
        }
        match self.projects.iter_mut().find(|p| p.id == id) {
            Some(project) => {
                patch.apply_to(project);
                Outcome::Applied
            }
            None => self.unchanged("update", id, NoOp::UnknownId),
        }
    }

    pub fn delete(&mut self, id: &str) -> Outcome {
        match self.position_of(id) {
            Some(index) => {
                self.projects.remove(index);
                Outcome::Applied
            }
            None => self.unchanged("delete", id, NoOp::UnknownId),
        }
    }

    /// Move a project into `target` at `index` within that column.
    ///
    /// `index` counts positions in the target column after the project has
    /// been taken out of its old place. It is clamped to the column, so a
    /// negative index lands first and an oversized one lands last. `None`
    /// appends.
    pub fn move_to_stage(&mut self, id: &str, target: Stage, index: Option<isize>) -> Outcome {
        let Some(from) = self.position_of(id) else {
            return self.unchanged("move", id, NoOp::UnknownId);
        };

        let mut item = self.projects.remove(from);
        item.stage = target;

        let (mut column, mut rebuilt): (Vec<Project>, Vec<Project>) =
            std::mem::take(&mut self.projects)
                .into_iter()
                .partition(|p| p.stage == target);

        let insert_at = match index {
            Some(i) => usize::try_from(i).unwrap_or(0).min(column.len()),
            None => column.len(),
        };
        debug!(id, stage = %target, insert_at, "project moved");
        column.insert(insert_at, item);

        rebuilt.extend(column);
        self.projects = rebuilt;
        Outcome::Applied
    }

    /// Same as [`move_to_stage`](Self::move_to_stage) with the stage given as
    /// its tag. An unknown tag leaves the board untouched.
    pub fn move_to_named_stage(&mut self, id: &str, stage: &str, index: Option<isize>) -> Outcome {
        match Stage::from_str(stage) {
            Ok(target) => self.move_to_stage(id, target, index),
            Err(_) => self.unchanged("move", id, NoOp::UnknownStage),
        }
    }

    /// Move the project at column position `from` to column position `to`.
    /// Projects of other stages keep their relative order.
    pub fn reorder_in_stage(&mut self, stage: Stage, from: usize, to: usize) -> Outcome {
        let count = self.projects.iter().filter(|p| p.stage == stage).count();
        if from >= count || to >= count {
            debug!(stage = %stage, from, to, count, "reorder ignored: index out of range");
            return Outcome::Unchanged(NoOp::IndexOutOfRange);
        }
        if from == to {
            return Outcome::Unchanged(NoOp::SameIndex);
        }

        let (mut column, mut rebuilt): (Vec<Project>, Vec<Project>) =
            std::mem::take(&mut self.projects)
                .into_iter()
                .partition(|p| p.stage == stage);

        let moved = column.remove(from);
        column.insert(to, moved);

        rebuilt.extend(column);
        self.projects = rebuilt;
        Outcome::Applied
    }

    /// Partition the sequence into the four board columns.
    pub fn view(&self) -> BoardView {
        BoardView::from_projects(&self.projects)
    }

    fn unchanged(&self, op: &str, id: &str, reason: NoOp) -> Outcome {
        debug!(op, id, %reason, "project mutation ignored");
        Outcome::Unchanged(reason)
    }
}
