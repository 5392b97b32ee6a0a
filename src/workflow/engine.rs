use tracing::debug;

use super::registry::StatusRegistry;
use super::stage::{StageId, StageOrder};
use crate::error::{MoveRejection, RegistryError};

/// A status registry bound to a stage order.
///
/// Findings and actions each get one `Workflow`; the move rules below are the
/// same for both and only the tables differ.
#[derive(Debug, Clone)]
pub struct Workflow {
    name: &'static str,
    registry: StatusRegistry,
    order: StageOrder,
}

impl Workflow {
    /// Binds `registry` to `order`. Every registered status must belong to a
    /// stage present in the order.
    pub fn new(
        name: &'static str,
        registry: StatusRegistry,
        order: StageOrder,
    ) -> Result<Self, RegistryError> {
        if let Some(stray) = registry.statuses().iter().find(|d| !order.contains(d.stage)) {
            return Err(RegistryError::StageNotInOrder {
                status: stray.id.clone(),
                stage: stray.stage,
            });
        }
        Ok(Self {
            name,
            registry,
            order,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    pub fn order(&self) -> &StageOrder {
        &self.order
    }

    pub fn stages(&self) -> &[StageId] {
        self.order.stages()
    }

    pub fn stage_of(&self, status: &str) -> Option<StageId> {
        self.registry.stage_of(status)
    }

    pub fn entry_status_for(&self, stage: StageId) -> Option<&str> {
        self.registry.entry_status(stage)
    }

    pub fn next_stage(&self, stage: StageId) -> Option<StageId> {
        self.order.next(stage)
    }

    /// Whether an item currently in `from_status` may be moved to `to_stage`.
    ///
    /// Unknown statuses and same-stage moves are never legal. Otherwise the
    /// pair must be in the transition table: the next stage forward, or a
    /// whitelisted backward edge.
    pub fn can_move(&self, from_status: &str, to_stage: StageId) -> bool {
        match self.stage_of(from_status) {
            Some(from) => from != to_stage && self.order.allows(from, to_stage),
            None => false,
        }
    }

    /// Validates a move and resolves the status the item should adopt.
    pub fn plan_move(&self, from_status: &str, to_stage: StageId) -> Result<&str, MoveRejection> {
        let Some(from) = self.stage_of(from_status) else {
            debug!(workflow = self.name, status = from_status, "status not in registry");
            return Err(MoveRejection::UnresolvedStatus {
                status: from_status.to_string(),
            });
        };

        if !self.can_move(from_status, to_stage) {
            debug!(workflow = self.name, %from, to = %to_stage, "transition not allowed");
            return Err(MoveRejection::IllegalTransition { from, to: to_stage });
        }

        self.entry_status_for(to_stage)
            .ok_or(MoveRejection::NoEntryStatus(to_stage))
    }
}
