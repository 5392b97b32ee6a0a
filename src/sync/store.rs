use std::future::Future;

use super::error::SyncError;
use crate::workflow::{ItemId, WorkflowItem};

/// Persistence boundary consumed by the board controller.
///
/// Implementations own the records; the controller only asks for a single
/// status change and for a fresh copy of the collection afterwards.
pub trait StatusStore: Send + Sync {
    /// Persists `new_status` on the item and returns the updated record.
    fn update_status(
        &self,
        item_id: &ItemId,
        new_status: &str,
    ) -> impl Future<Output = Result<WorkflowItem, SyncError>> + Send;

    /// Current authoritative collection.
    fn fetch_items(&self) -> impl Future<Output = Result<Vec<WorkflowItem>, SyncError>> + Send;
}
