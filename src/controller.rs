//! View-state orchestration.
//!
//! The controller is the single owner of the tab selection and the export
//! slots. It observes the provider's snapshot, history and settings cells and
//! republishes a derived [`ViewState`] after every change. All mutation goes
//! through `&mut self`, so one task drives it and nothing needs a lock.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::export::{ExportCoordinator, ExportOutcome, ExportState, FileOpener};
use crate::system::provider::{HistoryCell, PerformanceDataProvider, SettingsCell, SnapshotCell};
use crate::system::settings::Settings;
use crate::view::{Tab, ViewState};

/// What caused a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Snapshot,
    History,
    Settings,
    Export,
}

/// Which upstream cells still have a live sender.
#[derive(Debug, Clone, Copy)]
struct Upstream {
    snapshot: bool,
    history: bool,
    settings: bool,
}

enum Signal {
    Snapshot(bool),
    History(bool),
    Settings(bool),
    Export(Option<ExportOutcome>),
}

pub struct ViewStateController {
    provider: Arc<dyn PerformanceDataProvider>,
    snapshot: SnapshotCell,
    history: HistoryCell,
    settings: SettingsCell,
    upstream: Upstream,
    selected_tab: Tab,
    export: ExportCoordinator,
    view_tx: watch::Sender<ViewState>,
    background: Vec<JoinHandle<()>>,
}

impl ViewStateController {
    pub fn new(
        provider: Arc<dyn PerformanceDataProvider>,
        opener: Option<Arc<dyn FileOpener>>,
    ) -> Self {
        Self::with_export(provider, ExportCoordinator::new(opener))
    }

    /// Like [`new`](Self::new), with `home` collapsed to `~` in export paths.
    pub fn with_home_dir(
        provider: Arc<dyn PerformanceDataProvider>,
        opener: Option<Arc<dyn FileOpener>>,
        home: Option<PathBuf>,
    ) -> Self {
        Self::with_export(provider, ExportCoordinator::new(opener).with_home_dir(home))
    }

    fn with_export(provider: Arc<dyn PerformanceDataProvider>, export: ExportCoordinator) -> Self {
        let mut snapshot = provider.current_snapshot();
        let mut history = provider.history();
        let mut settings = provider.settings();
        // whatever is there now is the starting point, not a change
        snapshot.mark_unchanged();
        history.mark_unchanged();
        settings.mark_unchanged();

        let mut controller = ViewStateController {
            provider,
            snapshot,
            history,
            settings,
            upstream: Upstream {
                snapshot: true,
                history: true,
                settings: true,
            },
            selected_tab: Tab::default(),
            export,
            view_tx: watch::Sender::new(ViewState::default()),
            background: Vec::new(),
        };
        controller.recompute();
        controller
    }

    /// Latest derived view-state.
    pub fn view(&self) -> ViewState {
        self.view_tx.borrow().clone()
    }

    /// Receiver woken whenever the view-state actually changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    pub fn selected_tab(&self) -> Tab {
        self.selected_tab
    }

    /// Settings as last observed from the provider.
    pub fn settings(&self) -> Settings {
        *self.settings.borrow()
    }

    pub fn export_state(&self) -> ExportState {
        self.export.state()
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_exporting()
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if tab != self.selected_tab {
            tracing::debug!(tab = tab.label(), "tab selected");
        }
        self.selected_tab = tab;
        self.recompute();
    }

    pub fn request_gc(&self) {
        tracing::debug!("GC requested");
        self.provider.request_gc();
    }

    /// Forward a full settings replacement without waiting for it to land.
    ///
    /// Must be called from within a tokio runtime.
    pub fn update_settings(&mut self, settings: Settings) {
        self.background.retain(|task| !task.is_finished());
        let provider = Arc::clone(&self.provider);
        self.background.push(tokio::spawn(async move {
            provider.update_settings(settings).await;
        }));
    }

    /// Start an export unless one is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn export_metrics(&mut self) {
        if self.export.request(Arc::clone(&self.provider)) {
            self.recompute();
        }
    }

    pub fn dismiss_export_success(&mut self) {
        self.export.dismiss_success();
        self.recompute();
    }

    pub fn dismiss_export_failure(&mut self) {
        self.export.dismiss_failure();
        self.recompute();
    }

    /// Apply everything that is already waiting, without blocking.
    ///
    /// Returns `true` when anything was applied.
    pub fn sync(&mut self) -> bool {
        let mut applied = false;
        applied |= poll_cell(&mut self.snapshot, &mut self.upstream.snapshot);
        applied |= poll_cell(&mut self.history, &mut self.upstream.history);
        applied |= poll_cell(&mut self.settings, &mut self.upstream.settings);
        if let Some(outcome) = self.export.try_completion() {
            self.export.apply(outcome);
            applied = true;
        }
        if applied {
            self.recompute();
        }
        applied
    }

    /// Wait for the next upstream delivery or export completion, apply it
    /// and recompute.
    ///
    /// Returns `None` once every upstream cell is closed and no export is
    /// running. Cancel-safe.
    pub async fn next_update(&mut self) -> Option<Update> {
        loop {
            let open = self.upstream;
            let exporting = self.export.is_exporting();

            let signal = tokio::select! {
                res = self.snapshot.changed(), if open.snapshot => Signal::Snapshot(res.is_ok()),
                res = self.history.changed(), if open.history => Signal::History(res.is_ok()),
                res = self.settings.changed(), if open.settings => Signal::Settings(res.is_ok()),
                outcome = self.export.completion(), if exporting => Signal::Export(outcome),
                else => return None,
            };

            let update = match signal {
                Signal::Snapshot(true) => Update::Snapshot,
                Signal::History(true) => Update::History,
                Signal::Settings(true) => Update::Settings,
                Signal::Export(Some(outcome)) => {
                    self.export.apply(outcome);
                    Update::Export
                }
                Signal::Snapshot(false) => {
                    self.upstream.snapshot = false;
                    continue;
                }
                Signal::History(false) => {
                    self.upstream.history = false;
                    continue;
                }
                Signal::Settings(false) => {
                    self.upstream.settings = false;
                    continue;
                }
                Signal::Export(None) => continue,
            };
            self.recompute();
            return Some(update);
        }
    }

    /// End of life: detach subscriptions and abandon background work.
    ///
    /// An export still running keeps running, but its result is dropped.
    /// Subscribers keep the last published view.
    pub fn dispose(mut self) {
        self.export.abandon();
        let detached = self.background.iter().filter(|t| !t.is_finished()).count();
        if detached > 0 {
            tracing::warn!(tasks = detached, "pending settings updates dropped");
        }
        self.background.clear();
        tracing::debug!("controller disposed");
    }

    fn recompute(&mut self) {
        let next = {
            let snapshot = self.snapshot.borrow();
            let history = self.history.borrow();
            let settings = self.settings.borrow();
            ViewState::compute(
                self.selected_tab,
                snapshot.as_deref(),
                &settings,
                &history,
                self.export.view(),
            )
        };
        self.view_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Mark a pending value as seen. Flips `open` off when the sender is gone.
fn poll_cell<T>(cell: &mut watch::Receiver<T>, open: &mut bool) -> bool {
    if !*open {
        return false;
    }
    match cell.has_changed() {
        Ok(true) => {
            cell.mark_unchanged();
            true
        }
        Ok(false) => false,
        Err(_) => {
            *open = false;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportView;
    use crate::system::memory::{ExportScript, MemoryProvider, synthetic_snapshot};
    use crate::view::Projection;

    fn controller(provider: &Arc<MemoryProvider>) -> ViewStateController {
        ViewStateController::with_home_dir(
            provider.clone(),
            None,
            Some(PathBuf::from("/home/alice")),
        )
    }

    #[tokio::test]
    async fn starts_on_overview_awaiting_data() {
        let provider = Arc::new(MemoryProvider::default());
        let c = controller(&provider);
        let view = c.view();
        assert_eq!(view.selected_tab, Tab::Overview);
        assert!(view.projection.is_awaiting_data());
        assert_eq!(view.export, ExportView::default());
        assert_eq!(c.export_state(), ExportState::Idle);
    }

    #[tokio::test]
    async fn picks_up_snapshot_present_at_construction() {
        let provider = Arc::new(MemoryProvider::default());
        provider.push_snapshot(synthetic_snapshot(1));
        let c = controller(&provider);
        assert!(matches!(c.view().projection, Projection::Overview(_)));
        assert!(c.view().has_data());
    }

    #[tokio::test]
    async fn select_tab_recomputes_before_returning() {
        let provider = Arc::new(MemoryProvider::default());
        provider.push_snapshot(synthetic_snapshot(1));
        let mut c = controller(&provider);

        c.select_tab(Tab::Timings);
        assert_eq!(c.selected_tab(), Tab::Timings);
        assert!(matches!(c.view().projection, Projection::Timings(_)));
    }

    #[tokio::test]
    async fn reselecting_a_tab_does_not_notify() {
        let provider = Arc::new(MemoryProvider::default());
        provider.push_snapshot(synthetic_snapshot(1));
        let mut c = controller(&provider);
        let mut rx = c.subscribe();

        c.select_tab(Tab::Memory);
        assert!(rx.has_changed().unwrap());
        let first = rx.borrow_and_update().clone();

        c.select_tab(Tab::Memory);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(c.view(), first);
    }

    #[tokio::test]
    async fn reselecting_with_nan_metric_does_not_notify() {
        let provider = Arc::new(MemoryProvider::default());
        let mut snapshot = synthetic_snapshot(1);
        snapshot.heap_usage_percent = f32::NAN;
        provider.push_snapshot(snapshot);
        let mut c = controller(&provider);
        let mut rx = c.subscribe();

        c.select_tab(Tab::Memory);
        rx.borrow_and_update();
        c.select_tab(Tab::Memory);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn sync_applies_new_snapshots_and_settings() {
        let provider = Arc::new(MemoryProvider::default());
        let mut c = controller(&provider);
        assert!(!c.sync());

        let mut snapshot = synthetic_snapshot(0);
        snapshot.heap_usage_percent = 60.0;
        provider.push_snapshot(snapshot);
        assert!(c.sync());
        assert_eq!(c.view().health.unwrap().memory, crate::health::HealthStatus::Good);

        provider.set_settings(Settings {
            memory_warning_threshold_percent: 50.0,
            ..Settings::default()
        });
        assert!(c.sync());
        assert_eq!(c.view().health.unwrap().memory, crate::health::HealthStatus::Warning);
    }

    #[tokio::test]
    async fn next_update_reports_the_source() {
        let provider = Arc::new(MemoryProvider::default());
        let mut c = controller(&provider);

        provider.set_settings(Settings::default().shifted(1.0));
        assert_eq!(c.next_update().await, Some(Update::Settings));

        provider.push_snapshot(synthetic_snapshot(3));
        let first = c.next_update().await.unwrap();
        assert!(matches!(first, Update::Snapshot | Update::History));
        assert!(c.view().has_data());
    }

    #[tokio::test]
    async fn request_gc_is_forwarded() {
        let provider = Arc::new(MemoryProvider::default());
        let c = controller(&provider);
        let before = c.view();
        c.request_gc();
        assert_eq!(provider.gc_requests(), 1);
        assert_eq!(c.view(), before);
    }

    #[tokio::test]
    async fn update_settings_lands_through_subscription() {
        let provider = Arc::new(MemoryProvider::default());
        let mut c = controller(&provider);
        let next = Settings::default().shifted(-10.0);

        c.update_settings(next);
        assert_eq!(c.next_update().await, Some(Update::Settings));
        assert_eq!(c.settings(), next);
        assert_eq!(provider.settings_updates(), 1);
    }

    #[tokio::test]
    async fn export_is_single_flight() {
        let provider = Arc::new(MemoryProvider::default());
        provider.hold_exports();
        let mut c = controller(&provider);

        c.export_metrics();
        assert_eq!(c.export_state(), ExportState::InFlight);
        assert!(c.view().export.is_exporting);

        c.export_metrics();
        tokio::task::yield_now().await;
        assert_eq!(c.export_state(), ExportState::InFlight);
        assert_eq!(provider.export_calls(), 1);

        provider.release_exports();
        assert_eq!(c.next_update().await, Some(Update::Export));
        assert!(!c.is_exporting());
        assert_eq!(provider.export_calls(), 1);
    }

    #[tokio::test]
    async fn export_success_and_failure_reach_the_view() {
        let provider = Arc::new(MemoryProvider::default());
        provider.script_export(ExportScript::Succeed(PathBuf::from("/home/alice/export.json")));
        let mut c = controller(&provider);

        c.export_metrics();
        assert_eq!(c.next_update().await, Some(Update::Export));
        assert_eq!(c.view().export.success.as_deref(), Some("~/export.json"));

        provider.script_export(ExportScript::Fail("boom".to_string()));
        c.export_metrics();
        assert_eq!(c.next_update().await, Some(Update::Export));
        assert_eq!(c.export_state(), ExportState::Failed("boom".to_string()));

        c.dismiss_export_failure();
        assert_eq!(c.view().export.failure, None);
        assert_eq!(c.view().export.success.as_deref(), Some("~/export.json"));
        c.dismiss_export_success();
        assert_eq!(c.export_state(), ExportState::Idle);
    }

    #[tokio::test]
    async fn late_export_after_dispose_is_discarded() {
        let provider = Arc::new(MemoryProvider::default());
        provider.hold_exports();
        let mut c = controller(&provider);
        let rx = c.subscribe();

        c.export_metrics();
        assert!(rx.borrow().export.is_exporting);
        c.dispose();

        provider.release_exports();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let last = rx.borrow().clone();
        assert!(last.export.is_exporting);
        assert_eq!(last.export.success, None);
        assert_eq!(last.export.failure, None);
        assert!(rx.has_changed().is_err());
    }
}
