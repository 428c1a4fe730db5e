use serde::{Deserialize, Serialize};
use trackforge_common::{Project, Stage};

use super::ProjectBoard;

/// One applied board mutation in the form a storage backend writes it.
///
/// Moves and reorders both become `Reposition`: the moved project now lives
/// in `stage`, and `column` is the complete id order of that stage. The source
/// column of a move keeps its relative order, so nothing else needs writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectChange {
    Insert(Project),
    Update(Project),
    Delete { id: String },
    Reposition {
        id: String,
        stage: Stage,
        column: Vec<String>,
    },
}

impl ProjectChange {
    /// Describe the current position of `id` as a reposition.
    pub fn reposition_of(board: &ProjectBoard, id: &str) -> Option<Self> {
        let project = board.get(id)?;
        Some(Self::Reposition {
            id: id.to_string(),
            stage: project.stage,
            column: board.column_ids(project.stage),
        })
    }

    pub fn project_id(&self) -> &str {
        match self {
            Self::Insert(p) | Self::Update(p) => &p.id,
            Self::Delete { id } | Self::Reposition { id, .. } => id,
        }
    }
}

impl ProjectBoard {
    /// Apply a change produced by another board.
    ///
    /// Inserting an id that already exists replaces the record in place.
    /// A reposition rebuilds the sequence the same way a move does: the other
    /// stages first, then the target column in the order listed. Column
    /// members missing from the list keep their relative order after the
    /// listed ones.
    pub fn replay(&mut self, change: &ProjectChange) {
        match change {
            ProjectChange::Insert(project) => match self.projects.iter_mut().find(|p| p.id == project.id) {
                Some(existing) => *existing = project.clone(),
                None => self.projects.push(project.clone()),
            },
            ProjectChange::Update(project) => {
                if let Some(existing) = self.projects.iter_mut().find(|p| p.id == project.id) {
                    let stage = existing.stage;
                    *existing = project.clone();
                    existing.stage = stage;
                }
            }
            ProjectChange::Delete { id } => {
                self.projects.retain(|p| &p.id != id);
            }
            ProjectChange::Reposition { id, stage, column } => {
                if let Some(project) = self.projects.iter_mut().find(|p| &p.id == id) {
                    project.stage = *stage;
                }
                let (mut members, mut rebuilt): (Vec<Project>, Vec<Project>) =
                    std::mem::take(&mut self.projects)
                        .into_iter()
                        .partition(|p| p.stage == *stage);
                members.sort_by_key(|p| column.iter().position(|c| *c == p.id).unwrap_or(usize::MAX));
                rebuilt.extend(members);
                self.projects = rebuilt;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::draft;
    use trackforge_common::ProjectPatch;

    fn stage_titles(board: &ProjectBoard) -> Vec<Vec<String>> {
        Stage::ALL
            .iter()
            .map(|s| board.column(*s).iter().map(|p| p.title.clone()).collect())
            .collect()
    }

    #[test]
    fn test_replayed_changes_reproduce_column_order() {
        let mut source = ProjectBoard::new();
        let mut mirror = ProjectBoard::new();

        let mut ids = Vec::new();
        for (title, stage) in [
            ("A", Stage::All),
            ("B", Stage::Review),
            ("C", Stage::Review),
            ("D", Stage::Done),
            ("E", Stage::InProgress),
        ] {
            let project = source.add(draft(title, stage));
            mirror.replay(&ProjectChange::Insert(project.clone()));
            ids.push(project.id);
        }

        source.move_to_stage(&ids[0], Stage::Review, Some(1));
        mirror.replay(&ProjectChange::reposition_of(&source, &ids[0]).unwrap());

        source.reorder_in_stage(Stage::Review, 2, 0);
        let moved = source.column(Stage::Review)[0].id.clone();
        mirror.replay(&ProjectChange::reposition_of(&source, &moved).unwrap());

        source.move_to_stage(&ids[3], Stage::InProgress, Some(0));
        mirror.replay(&ProjectChange::reposition_of(&source, &ids[3]).unwrap());

        source.delete(&ids[4]);
        mirror.replay(&ProjectChange::Delete { id: ids[4].clone() });

        assert_eq!(stage_titles(&source), stage_titles(&mirror));
        assert_eq!(stage_titles(&source)[2], vec!["C", "B", "A"]);
    }

    #[test]
    fn test_replay_update_never_changes_stage() {
        let mut board = ProjectBoard::new();
        let project = board.add(draft("A", Stage::Review));
        board.update(
            &project.id,
            &ProjectPatch {
                title: Some("Renamed".into()),
                ..Default::default()
            },
        );

        let mut stale = board.get(&project.id).unwrap().clone();
        stale.stage = Stage::Done;
        let mut mirror = ProjectBoard::from_projects(vec![project]);
        mirror.replay(&ProjectChange::Update(stale));

        let replayed = &mirror.projects()[0];
        assert_eq!(replayed.title, "Renamed");
        assert_eq!(replayed.stage, Stage::Review);
    }

    #[test]
    fn test_reposition_keeps_unlisted_members_last() {
        let mut board = ProjectBoard::new();
        let a = board.add(draft("A", Stage::Done)).id;
        let b = board.add(draft("B", Stage::Done)).id;
        let c = board.add(draft("C", Stage::Done)).id;

        board.replay(&ProjectChange::Reposition {
            id: c.clone(),
            stage: Stage::Done,
            column: vec![c, a],
        });

        let order: Vec<&str> = board.column(Stage::Done).iter().map(|p| p.title.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert!(board.get(&b).is_some());
    }

    #[test]
    fn test_change_serializes_with_kind_tag() {
        let change = ProjectChange::Delete { id: "p1".into() };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "delete");
        assert_eq!(json["id"], "p1");
        assert_eq!(change.project_id(), "p1");
    }
}
