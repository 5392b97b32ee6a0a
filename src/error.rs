use thiserror::Error;

use crate::sync::SyncError;
use crate::workflow::{ItemId, StageId};

#[derive(Debug, Error)]
pub enum QualboardError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid workflow table: {0}")]
    Registry(#[from] RegistryError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Inconsistencies detected while building a status registry or stage order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("status `{0}` is registered twice")]
    DuplicateStatus(String),

    #[error("stage {0} appears twice in the stage order")]
    DuplicateStage(StageId),

    #[error("status `{status}` belongs to stage {stage}, which is not in the stage order")]
    StageNotInOrder { status: String, stage: StageId },

    #[error("entry status `{status}` is not a registered status of stage {stage}")]
    EntryStatusMismatch { stage: StageId, status: String },

    #[error("stage {0} has more than one entry status")]
    DuplicateEntryStatus(StageId),

    #[error("{from} -> {to} is not a backward edge between ordered stages")]
    InvalidBackwardEdge { from: StageId, to: StageId },
}

/// A stage name that matches no known stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stage: {0}")]
pub struct UnknownStage(pub String);

/// Why a board move was refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    /// The item's status is not in the registry; the data needs fixing.
    #[error("status `{status}` is not recognized, update the record before moving it")]
    UnresolvedStatus { status: String },

    #[error("moving from {} to {} is not permitted", StageId::label(.from), StageId::label(.to))]
    IllegalTransition { from: StageId, to: StageId },

    #[error("{} cannot be used as a drop target", StageId::label(.0))]
    NoEntryStatus(StageId),

    #[error("item {0} is still being saved, please wait")]
    ConcurrentMove(ItemId),

    #[error("item {0} is not on the board")]
    ItemNotFound(ItemId),
}
