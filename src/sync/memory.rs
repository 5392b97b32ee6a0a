use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;

use super::error::SyncError;
use super::store::StatusStore;
use crate::workflow::{ItemId, WorkflowItem};

/// In-process [`StatusStore`] used by the demo board and tests.
///
/// Failures can be queued to simulate server rejections. Updates can be
/// held behind a gate or a fixed latency, and listings behind their own gate,
/// to simulate a slow backend.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<Vec<WorkflowItem>>,
    failures: Mutex<VecDeque<(u16, String)>>,
    fail_fetches: Mutex<bool>,
    gate: Mutex<Option<Arc<Notify>>>,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
    latency: Mutex<Option<Duration>>,
    update_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new(items: Vec<WorkflowItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Default::default()
        }
    }

    /// The next update is answered with an API error instead of being applied.
    pub fn fail_next_update(&self, status: u16, message: &str) {
        lock(&self.failures).push_back((status, message.to_string()));
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        *lock(&self.fail_fetches) = fail;
    }

    /// Updates wait on the returned gate until `notify_one` is called.
    pub fn hold_updates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.gate) = Some(gate.clone());
        gate
    }

    /// Lets updates through again; a waiter already parked on the gate keeps waiting.
    pub fn clear_hold(&self) {
        *lock(&self.gate) = None;
    }

    /// Listings are read when requested but delivered only after
    /// `notify_one` is called on the returned gate.
    pub fn hold_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.fetch_gate) = Some(gate.clone());
        gate
    }

    pub fn clear_fetch_hold(&self) {
        *lock(&self.fetch_gate) = None;
    }

    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<WorkflowItem> {
        lock(&self.items).clone()
    }

    /// Simulates an edit made elsewhere, e.g. the verification form.
    pub fn set_status(&self, item_id: &ItemId, status: &str) -> bool {
        match lock(&self.items).iter_mut().find(|i| &i.id == item_id) {
            Some(item) => {
                item.status = status.to_string();
                true
            }
            None => false,
        }
    }
}

impl StatusStore for MemoryStore {
    async fn update_status(
        &self,
        item_id: &ItemId,
        new_status: &str,
    ) -> Result<WorkflowItem, SyncError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        let gate = lock(&self.gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some((status, message)) = lock(&self.failures).pop_front() {
            return Err(SyncError::Api { status, message });
        }

        let mut items = lock(&self.items);
        let item = items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| SyncError::NotFound(item_id.clone()))?;
        item.status = new_status.to_string();
        Ok(item.clone())
    }

    async fn fetch_items(&self) -> Result<Vec<WorkflowItem>, SyncError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if *lock(&self.fail_fetches) {
            return Err(SyncError::Api {
                status: 503,
                message: "listing unavailable".into(),
            });
        }
        let listing = self.snapshot();

        let gate = lock(&self.fetch_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            WorkflowItem::new("1", "d1_iniciado"),
            WorkflowItem::new("2", "t1_en_analisis"),
        ])
    }

    #[tokio::test]
    async fn update_applies_status() {
        let store = store();
        let updated = store
            .update_status(&ItemId::from("1"), "t1_en_analisis")
            .await
            .unwrap();
        assert_eq!(updated.status, "t1_en_analisis");
        assert_eq!(store.snapshot()[0].status, "t1_en_analisis");
        assert_eq!(store.update_calls(), 1);
    }

    #[tokio::test]
    async fn queued_failure_is_returned_once() {
        let store = store();
        store.fail_next_update(409, "conflicto");

        let err = store
            .update_status(&ItemId::from("1"), "t1_en_analisis")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Api { status: 409, .. }));
        assert_eq!(store.snapshot()[0].status, "d1_iniciado");

        assert!(store.update_status(&ItemId::from("1"), "t1_en_analisis").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let err = store()
            .update_status(&ItemId::from("404"), "t1_en_analisis")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn fetch_can_be_made_to_fail() {
        let store = store();
        assert_eq!(store.fetch_items().await.unwrap().len(), 2);
        store.set_fail_fetches(true);
        assert!(store.fetch_items().await.is_err());
        assert_eq!(store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn held_fetch_returns_listing_read_at_request_time() {
        let store = Arc::new(store());
        let gate = store.hold_fetches();

        let task = {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_items().await })
        };
        while store.fetch_calls() == 0 {
            tokio::task::yield_now().await;
        }
        store.set_status(&ItemId::from("1"), "t1_en_analisis");

        gate.notify_one();
        let listing = task.await.unwrap().unwrap();
        assert_eq!(listing[0].status, "d1_iniciado");
    }
}
