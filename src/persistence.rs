//! Debounced write-through of view state to an external store.
//!
//! Interaction mutates the in-memory window many times per second; the store
//! only sees the last state once the debounce deadline passes, on an explicit
//! flush, or when the owning view goes away.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use eyre::{bail, Result, WrapErr};
use parking_lot::Mutex;

use crate::data_types::{ViewId, ViewRecord, ViewState};
use crate::debounce::Debouncer;

/// Storage backend for persisted views.
///
/// Calls are synchronous: a write returns only once the store has applied
/// it, so writes issued through one [`ViewPersistence`] never overtake each
/// other.
pub trait ViewStore {
    fn get_view(&mut self, chart_id: &str) -> Result<Option<ViewRecord>>;
    fn create_view(&mut self, chart_id: &str, state: &ViewState) -> Result<ViewRecord>;
    fn update_view(&mut self, id: &ViewId, state: &ViewState) -> Result<ViewRecord>;
    fn delete_view(&mut self, id: &ViewId) -> Result<()>;
}

/// A store shared between several views and the code that owns it.
impl<S: ViewStore + ?Sized> ViewStore for Arc<Mutex<S>> {
    fn get_view(&mut self, chart_id: &str) -> Result<Option<ViewRecord>> {
        self.lock().get_view(chart_id)
    }

    fn create_view(&mut self, chart_id: &str, state: &ViewState) -> Result<ViewRecord> {
        self.lock().create_view(chart_id, state)
    }

    fn update_view(&mut self, id: &ViewId, state: &ViewState) -> Result<ViewRecord> {
        self.lock().update_view(id, state)
    }

    fn delete_view(&mut self, id: &ViewId) -> Result<()> {
        self.lock().delete_view(id)
    }
}

/// In-memory [`ViewStore`] with a write log, used by tests and demos.
#[derive(Debug, Default)]
pub struct MemoryViewStore {
    views: HashMap<ViewId, ViewRecord>,
    next_id: u64,
    writes: Vec<(ViewId, ViewState)>,
    deletes: Vec<ViewId>,
    failing: bool,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Makes every subsequent call fail, to exercise error paths.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Inserts a view directly, bypassing the write log.
    pub fn seed(&mut self, chart_id: &str, state: ViewState) -> ViewId {
        let id = self.allocate_id();
        self.views.insert(
            id.clone(),
            ViewRecord {
                id: id.clone(),
                chart_id: chart_id.to_string(),
                state,
                updated_at: Utc::now(),
            },
        );
        id
    }

    /// Every create/update in call order.
    pub fn writes(&self) -> &[(ViewId, ViewState)] {
        &self.writes
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    pub fn deletes(&self) -> &[ViewId] {
        &self.deletes
    }

    pub fn view_for(&self, chart_id: &str) -> Option<&ViewRecord> {
        self.views.values().find(|v| v.chart_id == chart_id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    fn allocate_id(&mut self) -> ViewId {
        self.next_id += 1;
        ViewId(format!("view-{}", self.next_id))
    }

    fn check(&self, op: &str) -> Result<()> {
        if self.failing {
            bail!("store unavailable during {}", op);
        }
        Ok(())
    }
}

impl ViewStore for MemoryViewStore {
    fn get_view(&mut self, chart_id: &str) -> Result<Option<ViewRecord>> {
        self.check("get")?;
        Ok(self.view_for(chart_id).cloned())
    }

    fn create_view(&mut self, chart_id: &str, state: &ViewState) -> Result<ViewRecord> {
        self.check("create")?;
        let id = self.allocate_id();
        let record = ViewRecord {
            id: id.clone(),
            chart_id: chart_id.to_string(),
            state: state.clone(),
            updated_at: Utc::now(),
        };
        self.views.insert(id.clone(), record.clone());
        self.writes.push((id, state.clone()));
        Ok(record)
    }

    fn update_view(&mut self, id: &ViewId, state: &ViewState) -> Result<ViewRecord> {
        self.check("update")?;
        let Some(record) = self.views.get_mut(id) else {
            bail!("view {} not found", id);
        };
        record.state = state.clone();
        record.updated_at = Utc::now();
        let record = record.clone();
        self.writes.push((id.clone(), state.clone()));
        Ok(record)
    }

    fn delete_view(&mut self, id: &ViewId) -> Result<()> {
        self.check("delete")?;
        if self.views.remove(id).is_none() {
            bail!("view {} not found", id);
        }
        self.deletes.push(id.clone());
        Ok(())
    }
}

/// Debounced, cancellable persistence of one chart's view.
pub struct ViewPersistence<S: ViewStore> {
    store: S,
    chart_id: String,
    view_id: Option<ViewId>,
    pending: Debouncer<ViewState>,
    loaded: bool,
}

impl<S: ViewStore> ViewPersistence<S> {
    pub fn new(store: S, chart_id: impl Into<String>, delay: Duration) -> Self {
        Self {
            store,
            chart_id: chart_id.into(),
            view_id: None,
            pending: Debouncer::new(delay),
            loaded: false,
        }
    }

    pub fn chart_id(&self) -> &str {
        &self.chart_id
    }

    pub fn view_id(&self) -> Option<&ViewId> {
        self.view_id.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads the stored view. Only the first call reaches the store; later
    /// calls return `Ok(None)`. A missing view is not an error.
    pub fn load(&mut self) -> Result<Option<ViewState>> {
        if self.loaded {
            return Ok(None);
        }
        self.loaded = true;
        let record = self
            .store
            .get_view(&self.chart_id)
            .wrap_err_with(|| format!("failed to load view for chart {}", self.chart_id))?;
        match record {
            Some(record) => {
                tracing::info!(chart = %self.chart_id, view = %record.id, "view loaded");
                self.view_id = Some(record.id);
                Ok(Some(record.state))
            }
            None => {
                tracing::debug!(chart = %self.chart_id, "no stored view, using defaults");
                Ok(None)
            }
        }
    }

    /// Schedules `state` for writing, replacing any state still pending.
    pub fn persist(&mut self, state: ViewState, now: Instant) {
        let delay = self.pending.delay();
        self.persist_after(state, now, delay);
    }

    /// Like [`persist`](Self::persist) with a one-off debounce delay.
    pub fn persist_after(&mut self, state: ViewState, now: Instant, delay: Duration) {
        if self.pending.cancel() {
            tracing::trace!(chart = %self.chart_id, "pending view write superseded");
        }
        self.pending.schedule_after(state, now, delay);
    }

    /// Drops the pending write, if any.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.pending.cancel();
        if cancelled {
            tracing::debug!(chart = %self.chart_id, "pending view write cancelled");
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn pending_state(&self) -> Option<&ViewState> {
        self.pending.peek()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.deadline()
    }

    /// Writes the pending state if its deadline has passed. Returns whether
    /// a write happened.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        match self.pending.poll(now) {
            Some(state) => self.write(&state).map(|_| true),
            None => Ok(false),
        }
    }

    /// Writes the pending state immediately.
    pub fn flush(&mut self) -> Result<bool> {
        match self.pending.flush_now() {
            Some(state) => {
                tracing::debug!(chart = %self.chart_id, "flushing pending view write");
                self.write(&state).map(|_| true)
            }
            None => Ok(false),
        }
    }

    /// Cancels any pending write and deletes the stored view.
    pub fn delete(&mut self) -> Result<()> {
        self.pending.cancel();
        let Some(id) = self.view_id.clone() else {
            return Ok(());
        };
        // The id is kept on failure so later writes still update the same view.
        match self.store.delete_view(&id) {
            Ok(()) => {
                self.view_id = None;
                tracing::info!(chart = %self.chart_id, view = %id, "view deleted");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(chart = %self.chart_id, view = %id, "view delete failed: {:#}", err);
                Err(err.wrap_err(format!("failed to delete view {}", id)))
            }
        }
    }

    fn write(&mut self, state: &ViewState) -> Result<()> {
        let result = match &self.view_id {
            Some(id) => self
                .store
                .update_view(id, state)
                .wrap_err_with(|| format!("failed to update view {}", id)),
            None => self
                .store
                .create_view(&self.chart_id, state)
                .wrap_err_with(|| format!("failed to create view for chart {}", self.chart_id)),
        };
        match result {
            Ok(record) => {
                if self.view_id.is_none() {
                    tracing::info!(chart = %self.chart_id, view = %record.id, "view created");
                }
                self.view_id = Some(record.id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(chart = %self.chart_id, "view write failed: {:#}", err);
                Err(err)
            }
        }
    }
}

impl<S: ViewStore> Drop for ViewPersistence<S> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!(chart = %self.chart_id, "pending view write lost on drop: {:#}", err);
        }
    }
}
