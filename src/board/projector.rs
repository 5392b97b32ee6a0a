use serde::Serialize;
use tracing::warn;

use crate::workflow::{StageId, Workflow, WorkflowItem};

/// One board column: the items currently in `stage`, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub stage: StageId,
    pub items: Vec<WorkflowItem>,
}

/// Column layout for a whole collection.
///
/// Items whose status is not in the registry land in `unclassified` rather
/// than being dropped, so stale records stay visible and fixable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub columns: Vec<Column>,
    pub unclassified: Vec<WorkflowItem>,
}

impl Board {
    pub fn column(&self, stage: StageId) -> Option<&Column> {
        self.columns.iter().find(|c| c.stage == stage)
    }

    /// Stage whose column holds `item_id`, or `None` if it is unclassified or absent.
    pub fn stage_of_item(&self, item_id: &str) -> Option<StageId> {
        self.columns
            .iter()
            .find(|c| c.items.iter().any(|i| i.id.as_str() == item_id))
            .map(|c| c.stage)
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.items.len()).sum::<usize>() + self.unclassified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups `items` into one column per stage of `workflow`.
pub fn project(workflow: &Workflow, items: &[WorkflowItem]) -> Board {
    let mut columns: Vec<Column> = workflow
        .stages()
        .iter()
        .map(|&stage| Column {
            stage,
            items: Vec::new(),
        })
        .collect();
    let mut unclassified = Vec::new();

    for item in items {
        let slot = workflow
            .stage_of(&item.status)
            .and_then(|stage| columns.iter_mut().find(|c| c.stage == stage));
        match slot {
            Some(column) => column.items.push(item.clone()),
            None => unclassified.push(item.clone()),
        }
    }

    if !unclassified.is_empty() {
        warn!(
            workflow = workflow.name(),
            count = unclassified.len(),
            "items with unrecognized status placed in the unclassified column"
        );
    }

    Board {
        columns,
        unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{actions, findings};
    use std::collections::HashSet;

    fn sample() -> Vec<WorkflowItem> {
        vec![
            WorkflowItem::new("1", "d1_iniciado"),
            WorkflowItem::new("2", "t3_plan_de_accion_definido"),
            WorkflowItem::new("3", "abierto"),
            WorkflowItem::new("4", "d2_en_revision"),
            WorkflowItem::new("5", "c4_ejecutada_la_verificacion"),
            WorkflowItem::new("6", "z3_anulado"),
            WorkflowItem::new("7", "t1_en_analisis"),
        ]
    }

    fn ids(items: &[WorkflowItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn one_column_per_stage_in_order() {
        let board = project(findings(), &sample());
        let stages: Vec<StageId> = board.columns.iter().map(|c| c.stage).collect();
        assert_eq!(stages, StageId::ALL);
    }

    #[test]
    fn items_keep_source_order_within_columns() {
        let board = project(findings(), &sample());
        assert_eq!(ids(&board.column(StageId::Detection).unwrap().items), ["1", "4"]);
        assert_eq!(ids(&board.column(StageId::Treatment).unwrap().items), ["2", "7"]);
        assert_eq!(ids(&board.column(StageId::Verification).unwrap().items), ["5"]);
        assert_eq!(ids(&board.column(StageId::Closure).unwrap().items), ["6"]);
    }

    #[test]
    fn unknown_status_goes_to_unclassified() {
        let board = project(findings(), &sample());
        assert_eq!(ids(&board.unclassified), ["3"]);
        assert_eq!(board.stage_of_item("3"), None);
    }

    #[test]
    fn projection_is_complete_without_duplicates() {
        let items = sample();
        let board = project(findings(), &items);
        assert_eq!(board.len(), items.len());

        let mut seen = HashSet::new();
        for item in board.columns.iter().flat_map(|c| &c.items).chain(&board.unclassified) {
            assert!(seen.insert(item.id.clone()), "duplicate {}", item.id);
        }
        let input: HashSet<_> = items.iter().map(|i| i.id.clone()).collect();
        assert_eq!(seen, input);
    }

    #[test]
    fn projection_is_idempotent() {
        let items = sample();
        assert_eq!(project(findings(), &items), project(findings(), &items));
    }

    #[test]
    fn finding_statuses_are_unclassified_on_action_board() {
        let board = project(actions(), &sample());
        assert_eq!(board.columns.len(), 3);
        assert!(board.column(StageId::Detection).is_none());
        assert_eq!(board.unclassified.len(), 7);
    }

    #[test]
    fn empty_collection_gives_empty_columns() {
        let board = project(findings(), &[]);
        assert!(board.is_empty());
        assert!(board.columns.iter().all(|c| c.items.is_empty()));
    }
}
