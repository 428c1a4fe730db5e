//! Drag-and-drop gestures on the board.
//!
//! A gesture starts with the dragged card's id, stage and column index and
//! ends with a drop on a column, optionally at a slot. Dropping back into the
//! source column at a slot is a reorder; anything else is a move.

use trackforge_common::Stage;

use crate::board::{Outcome, ProjectBoard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSource {
    pub id: String,
    pub stage: Stage,
    pub index: usize,
}

/// The board call a drop resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    Reorder { stage: Stage, from: usize, to: usize },
    Move { id: String, stage: Stage, index: Option<isize> },
}

impl DropAction {
    pub fn apply(&self, board: &mut ProjectBoard) -> Outcome {
        match self {
            Self::Reorder { stage, from, to } => board.reorder_in_stage(*stage, *from, *to),
            Self::Move { id, stage, index } => board.move_to_stage(id, *stage, *index),
        }
    }
}

#[derive(Debug, Default)]
pub struct DragController {
    dragging: Option<DragSource>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_start(&mut self, id: impl Into<String>, stage: Stage, index: usize) {
        self.dragging = Some(DragSource {
            id: id.into(),
            stage,
            index,
        });
    }

    /// Start dragging a card by id, looking up its column position.
    pub fn drag_project(&mut self, board: &ProjectBoard, id: &str) -> bool {
        match board.index_in_stage(id) {
            Some((stage, index)) => {
                self.drag_start(id, stage, index);
                true
            }
            None => false,
        }
    }

    pub fn drag_end(&mut self) {
        self.dragging = None;
    }

    pub fn dragging(&self) -> Option<&DragSource> {
        self.dragging.as_ref()
    }

    /// Finish the gesture. Returns `None` when nothing was being dragged.
    pub fn drop(&mut self, stage: Stage, index: Option<usize>) -> Option<DropAction> {
        let source = self.dragging.take()?;
        let action = match index {
            Some(to) if source.stage == stage => DropAction::Reorder {
                stage,
                from: source.index,
                to,
            },
            _ => DropAction::Move {
                id: source.id,
                stage,
                index: index.map(|i| isize::try_from(i).unwrap_or(isize::MAX)),
            },
        };
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::draft;

    fn board() -> (ProjectBoard, Vec<String>) {
        let mut board = ProjectBoard::new();
        let ids = [("A", Stage::Review), ("B", Stage::Review), ("C", Stage::Done)]
            .into_iter()
            .map(|(t, s)| board.add(draft(t, s)).id)
            .collect();
        (board, ids)
    }

    fn titles(board: &ProjectBoard, stage: Stage) -> Vec<String> {
        board.column(stage).iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn test_drop_in_same_column_at_slot_reorders() {
        let (mut board, ids) = board();
        let mut dnd = DragController::new();
        assert!(dnd.drag_project(&board, &ids[0]));

        let action = dnd.drop(Stage::Review, Some(1)).unwrap();
        assert_eq!(
            action,
            DropAction::Reorder {
                stage: Stage::Review,
                from: 0,
                to: 1
            }
        );
        assert!(action.apply(&mut board).is_applied());
        assert_eq!(titles(&board, Stage::Review), vec!["B", "A"]);
        assert!(dnd.dragging().is_none());
    }

    #[test]
    fn test_drop_on_other_column_moves() {
        let (mut board, ids) = board();
        let mut dnd = DragController::new();
        dnd.drag_project(&board, &ids[1]);

        let action = dnd.drop(Stage::Done, Some(0)).unwrap();
        action.apply(&mut board);

        assert_eq!(titles(&board, Stage::Done), vec!["B", "C"]);
    }

    #[test]
    fn test_drop_on_same_column_without_slot_moves_to_end() {
        let (mut board, ids) = board();
        let mut dnd = DragController::new();
        dnd.drag_project(&board, &ids[0]);

        let action = dnd.drop(Stage::Review, None).unwrap();
        assert!(matches!(action, DropAction::Move { index: None, .. }));
        action.apply(&mut board);

        assert_eq!(titles(&board, Stage::Review), vec!["B", "A"]);
    }

    #[test]
    fn test_drop_without_drag_and_after_drag_end() {
        let (board, ids) = board();
        let mut dnd = DragController::new();
        assert!(dnd.drop(Stage::Done, None).is_none());

        dnd.drag_project(&board, &ids[2]);
        dnd.drag_end();
        assert!(dnd.drop(Stage::Done, None).is_none());
        assert!(!dnd.drag_project(&board, "missing"));
    }
}
