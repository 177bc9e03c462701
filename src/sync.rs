use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::error::SyncError;
use crate::grouping::{ItemGroup, project};
use crate::loader::decode;
use crate::merge::reconcile;
use crate::record::{Record, Submission};
use crate::remote::SheetBackend;

/// Mutable session state, only touched under the controller's lock
#[derive(Debug, Default)]
struct SyncState {
    records: Vec<Record>,
    form: Submission,
    loading: bool,
    refreshing: bool,
    /// Writes in flight; submissions may overlap when several skins share a controller
    submitting: usize,
    error: Option<String>,
}

/// Read-only copy of the session handed to the views
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub groups: Vec<ItemGroup>,
    pub form: Submission,
    pub loading: bool,
    pub refreshing: bool,
    pub submitting: bool,
    pub error: Option<String>,
}

/// Owns the list and decides when it is reconciled with the sheet
///
/// The list only changes by whole replacement after a refresh or by an
/// optimistic prepend after a successful write. Overlapping refreshes are
/// not serialized: whichever completes last wins. No background refresh
/// starts while any write is in flight.
pub struct SyncController {
    backend: Arc<dyn SheetBackend>,
    state: Mutex<SyncState>,
    refresh_interval: Duration,
    resync_delay: Duration,
}

impl SyncController {
    pub fn new(
        backend: Arc<dyn SheetBackend>,
        refresh_interval: Duration,
        resync_delay: Duration,
    ) -> Self {
        SyncController {
            backend,
            state: Mutex::new(SyncState::default()),
            refresh_interval,
            resync_delay,
        }
    }

    pub fn from_config(backend: Arc<dyn SheetBackend>, config: &Config) -> Self {
        Self::new(backend, config.refresh_interval(), config.resync_delay())
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-read the sheet and reconcile it into the list.
    ///
    /// `show_spinner` marks a manual refresh. On failure the list is left as
    /// it was and the message goes to the error slot.
    pub async fn refresh(&self, show_spinner: bool) -> Result<usize, SyncError> {
        {
            let mut state = self.lock();
            state.error = None;
            if show_spinner {
                state.refreshing = true;
            }
            if state.records.is_empty() {
                state.loading = true;
            }
        }

        let fetched = self.backend.fetch_csv().await;

        let mut state = self.lock();
        let result = match fetched {
            Ok(text) => {
                let incoming = decode(&text);
                let merged = reconcile(&state.records, &incoming);
                log::debug!(
                    "reconciled {} incoming rows into {} records",
                    incoming.len(),
                    merged.len()
                );
                state.records = merged;
                Ok(state.records.len())
            }
            Err(err) => {
                log::warn!("refresh failed: {}", err);
                state.error = Some(err.to_string());
                Err(err)
            }
        };

        if show_spinner {
            state.refreshing = false;
        }
        state.loading = false;
        result
    }

    /// Send a new contribution to the sheet.
    ///
    /// The form is stored as given so a failed attempt can be corrected.
    /// On success the row is shown immediately, the form keeps only the
    /// name, and a refresh is scheduled once the sheet has had time to
    /// publish the row.
    pub async fn submit(self: &Arc<Self>, form: Submission) -> Result<(), SyncError> {
        {
            let mut state = self.lock();
            state.error = None;
            state.form = form.clone();
            if let Err(err) = form.validate() {
                state.error = Some(err.to_string());
                return Err(err);
            }
            state.submitting += 1;
        }

        let written = self.backend.append(&form).await;

        let mut state = self.lock();
        state.submitting = state.submitting.saturating_sub(1);
        match written {
            Ok(()) => {
                let record = Record::from_submission(&form, Utc::now());
                log::info!("added {} for {}", record.item, record.name);
                state.records.insert(0, record);
                state.form.clear_keep_name();
                drop(state);
                self.schedule_resync();
                Ok(())
            }
            Err(err) => {
                log::warn!("submission failed: {}", err);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Re-read after the delay, unless another write is still pending; that
    /// write schedules its own re-read, which picks up this row as well.
    fn schedule_resync(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        let delay = self.resync_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if controller.is_submitting() {
                log::debug!("another submission in flight, skipping resync");
                return;
            }
            if let Err(err) = controller.refresh(false).await {
                log::warn!("resync after submission failed: {}", err);
            }
        });
    }

    /// Load once, then refresh on every tick of the interval.
    ///
    /// Ticks that land while a write is in flight are dropped, not delayed.
    pub async fn run_periodic(&self) {
        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.is_submitting() {
                log::debug!("submission in flight, skipping refresh");
                continue;
            }
            if let Err(err) = self.refresh(false).await {
                log::debug!("periodic refresh failed: {}", err);
            }
        }
    }

    pub fn spawn_periodic(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run_periodic().await })
    }

    pub fn set_form(&self, form: Submission) {
        self.lock().form = form;
    }

    pub fn form(&self) -> Submission {
        self.lock().form.clone()
    }

    pub fn records(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    pub fn groups(&self) -> Vec<ItemGroup> {
        project(&self.lock().records)
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submitting > 0
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            groups: project(&state.records),
            records: state.records.clone(),
            form: state.form.clone(),
            loading: state.loading,
            refreshing: state.refreshing,
            submitting: state.submitting > 0,
            error: state.error.clone(),
        }
    }
}
