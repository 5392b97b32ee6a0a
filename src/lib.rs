//! Lifecycle engine for quality findings and corrective actions.
//!
//! - [`workflow`]: status registry, stage order and the move rules.
//! - [`board`]: column projection and the drag-and-drop controller.
//! - [`sync`]: the persistence boundary and its HTTP and in-memory stores.

pub mod board;
pub mod config;
pub mod error;
pub mod sync;
pub mod workflow;

pub use error::{MoveRejection, QualboardError, RegistryError, UnknownStage};
