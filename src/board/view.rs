use serde::Serialize;
use trackforge_common::{Project, Stage};

/// Read-only projection of the board, one entry per stage in board order.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnView {
    pub stage: Stage,
    pub projects: Vec<Project>,
}

impl ColumnView {
    pub fn total_value(&self) -> f64 {
        self.projects.iter().map(|p| p.value).sum()
    }
}

impl BoardView {
    pub fn from_projects(projects: &[Project]) -> Self {
        let columns = Stage::ALL
            .iter()
            .map(|stage| ColumnView {
                stage: *stage,
                projects: projects.iter().filter(|p| p.stage == *stage).cloned().collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, stage: Stage) -> &ColumnView {
        &self.columns[stage.rank()]
    }
}

#[cfg(test)]
mod tests {
    use crate::board::ProjectBoard;
    use crate::board::tests::draft;
    use trackforge_common::Stage;

    #[test]
    fn test_view_has_every_stage_in_board_order() {
        let mut board = ProjectBoard::new();
        board.add(draft("Done one", Stage::Done));
        board.add(draft("Fresh", Stage::All));
        board.add(draft("Done two", Stage::Done));

        let view = board.view();
        let stages: Vec<Stage> = view.columns.iter().map(|c| c.stage).collect();
        assert_eq!(stages, Stage::ALL.to_vec());

        let done = view.column(Stage::Done);
        assert_eq!(done.projects.len(), 2);
        assert_eq!(done.projects[0].title, "Done one");
        assert_eq!(done.total_value(), 200.0);
        assert!(view.column(Stage::Review).projects.is_empty());
    }
}
