use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::notice::{Notice, NoticeLevel};
use super::projector::{Board, project};
use crate::error::MoveRejection;
use crate::sync::{StatusStore, SyncError};
use crate::workflow::{ItemId, StageId, Workflow, WorkflowItem};

/// Lives from a drag start until the matching drop or cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub id: Uuid,
    pub active_item_id: ItemId,
    /// `None` when the item's status is not in the registry.
    pub source_stage: Option<StageId>,
    /// Column currently under the pointer.
    pub over: Option<StageId>,
}

/// Where a single item sits in the controller's state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemState {
    Idle,
    Dragging(DragSession),
    /// Optimistically shown in the target stage while the backend answers.
    Pending(StageId),
}

/// Result of a drop, as reported to the UI host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The backend accepted the change; carries the updated record.
    Applied(WorkflowItem),
    /// Dropped back on its own column.
    Unchanged,
    /// Refused locally; nothing was sent.
    Rejected(MoveRejection),
    /// The backend refused or timed out; the local change was rolled back.
    Failed(String),
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOutcome::Applied(item) => write!(f, "applied: {} is now {}", item.id, item.status),
            MoveOutcome::Unchanged => write!(f, "unchanged"),
            MoveOutcome::Rejected(reason) => write!(f, "rejected: {reason}"),
            MoveOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug)]
struct InFlight {
    target: StageId,
    previous_status: String,
    optimistic_status: String,
}

#[derive(Debug)]
struct BoardState {
    items: Vec<WorkflowItem>,
    drag: Option<DragSession>,
    in_flight: HashMap<ItemId, InFlight>,
    attached: bool,
    /// Last ticket handed to a listing request.
    issued_ticket: u64,
    /// Ticket of the listing currently shown.
    applied_ticket: u64,
}

impl BoardState {
    fn item_mut(&mut self, item_id: &ItemId) -> Option<&mut WorkflowItem> {
        self.items.iter_mut().find(|i| &i.id == item_id)
    }

    /// Taken right before a listing is requested. Tickets grow with request
    /// order, so a higher ticket always carries newer server state.
    fn next_ticket(&mut self) -> u64 {
        self.issued_ticket += 1;
        self.issued_ticket
    }

    /// Applies a listing unless one requested later has already been applied.
    fn apply_listing(&mut self, ticket: u64, fresh: Vec<WorkflowItem>) -> bool {
        if ticket <= self.applied_ticket {
            debug!(ticket, applied = self.applied_ticket, "discarding stale listing");
            return false;
        }
        self.applied_ticket = ticket;
        self.replace_items(fresh);
        true
    }

    /// Replaces local items with `fresh` and re-applies the optimistic
    /// status of every move still waiting on the backend. The status the
    /// server reported underneath becomes the rollback target.
    fn replace_items(&mut self, fresh: Vec<WorkflowItem>) {
        self.items = fresh;
        for (id, flight) in self.in_flight.iter_mut() {
            if let Some(item) = self.items.iter_mut().find(|i| &i.id == id) {
                flight.previous_status =
                    std::mem::replace(&mut item.status, flight.optimistic_status.clone());
            }
        }
    }
}

/// Drives a drag-and-drop board for one workflow.
///
/// Every move is optimistic: the item is shown in the target column at once,
/// the backend is asked to persist the target stage's entry status, and on
/// success the whole collection is refetched. On failure or timeout the item
/// goes back to its previous status. While a move is pending its item cannot
/// be dragged or dropped again; other items can.
///
/// Cloning is cheap and shares state, so drops of different items can be
/// awaited concurrently.
pub struct BoardController<S> {
    workflow: &'static Workflow,
    store: Arc<S>,
    state: Arc<Mutex<BoardState>>,
    notices: mpsc::UnboundedSender<Notice>,
    sync_timeout: Duration,
}

impl<S> Clone for BoardController<S> {
    fn clone(&self) -> Self {
        Self {
            workflow: self.workflow,
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            notices: self.notices.clone(),
            sync_timeout: self.sync_timeout,
        }
    }
}

impl<S: StatusStore> BoardController<S> {
    /// Creates an empty board. Notices are delivered on the returned receiver.
    pub fn new(
        workflow: &'static Workflow,
        store: Arc<S>,
        sync_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            workflow,
            store,
            state: Arc::new(Mutex::new(BoardState {
                items: Vec::new(),
                drag: None,
                in_flight: HashMap::new(),
                attached: true,
                issued_ticket: 0,
                applied_ticket: 0,
            })),
            notices: tx,
            sync_timeout,
        };
        (controller, rx)
    }

    pub fn workflow(&self) -> &'static Workflow {
        self.workflow
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, level: NoticeLevel, item_id: &ItemId, message: impl Into<String>) {
        let notice = Notice::new(level, item_id, message);
        debug!(%notice, "notice");
        // A closed receiver only means nobody is listening anymore.
        let _ = self.notices.send(notice);
    }

    /// Replaces the local collection, keeping pending moves visible.
    pub fn load(&self, items: Vec<WorkflowItem>) {
        let mut state = self.state();
        let ticket = state.next_ticket();
        state.apply_listing(ticket, items);
    }

    /// Reloads the collection from the store. A listing that arrives after
    /// a newer one was applied is dropped.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let ticket = self.state().next_ticket();
        let fresh = tokio::time::timeout(self.sync_timeout, self.store.fetch_items())
            .await
            .map_err(|_| SyncError::Timeout(self.sync_timeout))??;
        let mut state = self.state();
        if state.attached {
            state.apply_listing(ticket, fresh);
        }
        Ok(())
    }

    /// Current column layout, recomputed from local state.
    pub fn columns(&self) -> Board {
        project(self.workflow, &self.state().items)
    }

    pub fn items(&self) -> Vec<WorkflowItem> {
        self.state().items.clone()
    }

    pub fn drag_session(&self) -> Option<DragSession> {
        self.state().drag.clone()
    }

    pub fn is_pending(&self, item_id: &ItemId) -> bool {
        self.state().in_flight.contains_key(item_id)
    }

    pub fn item_state(&self, item_id: &ItemId) -> ItemState {
        let state = self.state();
        if let Some(flight) = state.in_flight.get(item_id) {
            return ItemState::Pending(flight.target);
        }
        match &state.drag {
            Some(session) if &session.active_item_id == item_id => {
                ItemState::Dragging(session.clone())
            }
            _ => ItemState::Idle,
        }
    }

    /// The consuming view is gone. Moves already sent still complete, but
    /// their results no longer touch local state or emit notices.
    pub fn detach(&self) {
        let mut state = self.state();
        state.attached = false;
        state.drag = None;
    }

    pub fn on_drag_start(&self, item_id: &ItemId) -> Result<DragSession, MoveRejection> {
        let mut state = self.state();

        if state.in_flight.contains_key(item_id) {
            drop(state);
            let reason = MoveRejection::ConcurrentMove(item_id.clone());
            self.notify(NoticeLevel::Warning, item_id, reason.to_string());
            return Err(reason);
        }

        let Some(item) = state.items.iter().find(|i| &i.id == item_id) else {
            return Err(MoveRejection::ItemNotFound(item_id.clone()));
        };

        let session = DragSession {
            id: Uuid::new_v4(),
            active_item_id: item_id.clone(),
            source_stage: self.workflow.stage_of(&item.status),
            over: None,
        };
        debug!(%item_id, session = %session.id, source = ?session.source_stage, "drag started");
        state.drag = Some(session.clone());
        Ok(session)
    }

    /// Records the hovered column and reports whether dropping there would
    /// be accepted, so the UI can highlight valid targets.
    pub fn on_drag_over(&self, stage: Option<StageId>) -> bool {
        let mut state = self.state();
        let Some(session) = state.drag.as_mut() else {
            return false;
        };
        session.over = stage;
        let active = session.active_item_id.clone();

        match (stage, state.items.iter().find(|i| i.id == active)) {
            (Some(stage), Some(item)) => self.workflow.plan_move(&item.status, stage).is_ok(),
            _ => false,
        }
    }

    /// Pointer released outside any column.
    pub fn on_drag_cancel(&self) {
        if let Some(session) = self.state().drag.take() {
            debug!(item_id = %session.active_item_id, "drag cancelled");
        }
    }

    /// Handles a drop of `item_id` on the `target` column.
    pub async fn on_drop(&self, item_id: &ItemId, target: StageId) -> MoveOutcome {
        let entry_status = match self.begin_move(item_id, target) {
            Ok(Some(entry)) => entry,
            Ok(None) => return MoveOutcome::Unchanged,
            Err(reason) => {
                let level = match reason {
                    MoveRejection::ConcurrentMove(_) | MoveRejection::UnresolvedStatus { .. } => {
                        NoticeLevel::Warning
                    }
                    _ => NoticeLevel::Info,
                };
                self.notify(level, item_id, reason.to_string());
                return MoveOutcome::Rejected(reason);
            }
        };

        let result = tokio::time::timeout(
            self.sync_timeout,
            self.store.update_status(item_id, entry_status),
        )
        .await
        .unwrap_or(Err(SyncError::Timeout(self.sync_timeout)));

        match result {
            Ok(updated) => self.settle_success(item_id, target, updated).await,
            Err(err @ SyncError::Timeout(_)) => {
                let outcome = self.settle_failure(item_id, target, err);
                // The write may still have landed after the deadline.
                let attached = self.state().attached;
                if attached && let Err(err) = self.refresh().await {
                    warn!(%item_id, error = %err, "refetch after timeout failed");
                }
                outcome
            }
            Err(err) => self.settle_failure(item_id, target, err),
        }
    }

    /// Validates the drop and applies the optimistic status.
    ///
    /// Returns `Ok(None)` for a same-column drop.
    fn begin_move(
        &self,
        item_id: &ItemId,
        target: StageId,
    ) -> Result<Option<&'static str>, MoveRejection> {
        let mut state = self.state();
        if state
            .drag
            .as_ref()
            .is_some_and(|session| &session.active_item_id == item_id)
        {
            state.drag = None;
        }

        if state.in_flight.contains_key(item_id) {
            return Err(MoveRejection::ConcurrentMove(item_id.clone()));
        }

        let workflow = self.workflow;
        let item = state
            .item_mut(item_id)
            .ok_or_else(|| MoveRejection::ItemNotFound(item_id.clone()))?;

        if workflow.stage_of(&item.status) == Some(target) {
            return Ok(None);
        }

        let entry_status = workflow.plan_move(&item.status, target)?;
        let previous_status = std::mem::replace(&mut item.status, entry_status.to_string());

        debug!(%item_id, from = %previous_status, to = entry_status, "optimistic move");
        state.in_flight.insert(
            item_id.clone(),
            InFlight {
                target,
                previous_status,
                optimistic_status: entry_status.to_string(),
            },
        );
        Ok(Some(entry_status))
    }

    async fn settle_success(
        &self,
        item_id: &ItemId,
        target: StageId,
        updated: WorkflowItem,
    ) -> MoveOutcome {
        let ticket = {
            let mut state = self.state();
            if !state.attached {
                state.in_flight.remove(item_id);
                return MoveOutcome::Applied(updated);
            }
            state.next_ticket()
        };

        let fresh = tokio::time::timeout(self.sync_timeout, self.store.fetch_items())
            .await
            .unwrap_or(Err(SyncError::Timeout(self.sync_timeout)));

        let mut state = self.state();
        state.in_flight.remove(item_id);
        if !state.attached {
            return MoveOutcome::Applied(updated);
        }

        let applied = match fresh {
            Ok(items) => state.apply_listing(ticket, items),
            Err(err) => {
                warn!(%item_id, error = %err, "refetch after move failed, keeping updated record");
                false
            }
        };
        if !applied && let Some(item) = state.item_mut(item_id) {
            *item = updated.clone();
        }

        info!(%item_id, stage = %target, status = %updated.status, "move applied");
        MoveOutcome::Applied(updated)
    }

    fn settle_failure(&self, item_id: &ItemId, target: StageId, err: SyncError) -> MoveOutcome {
        let reason = err.to_string();
        warn!(%item_id, stage = %target, error = %reason, "move failed, rolling back");

        let mut state = self.state();
        let flight = state.in_flight.remove(item_id);
        if !state.attached {
            return MoveOutcome::Failed(reason);
        }

        if let Some(flight) = flight
            && let Some(item) = state.item_mut(item_id)
            && item.status == flight.optimistic_status
        {
            item.status = flight.previous_status;
        }
        drop(state);

        self.notify(
            NoticeLevel::Error,
            item_id,
            format!("could not move to {}: {reason}", target.label()),
        );
        MoveOutcome::Failed(reason)
    }
}
