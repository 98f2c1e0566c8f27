use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::collector::Collector;
use super::export_file::write_export_document;
use super::history::SnapshotHistory;
use super::provider::{
    ExportError, HistoryCell, PerformanceDataProvider, SettingsCell, SnapshotCell,
};
use super::settings::Settings;
use super::snapshot::Snapshot;

/// Provider backed by periodic `sysinfo` samples of one process.
pub struct LocalProvider {
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    history_tx: watch::Sender<Vec<Arc<Snapshot>>>,
    settings_tx: watch::Sender<Settings>,
    export_dir: PathBuf,
    gc_requests: AtomicU64,
}

impl LocalProvider {
    pub fn new(settings: Settings, export_dir: PathBuf) -> Self {
        LocalProvider {
            snapshot_tx: watch::Sender::new(None),
            history_tx: watch::Sender::new(Vec::new()),
            settings_tx: watch::Sender::new(settings),
            export_dir,
            gc_requests: AtomicU64::new(0),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn gc_requests(&self) -> u64 {
        self.gc_requests.load(Ordering::Relaxed)
    }

    /// Sample on every `interval` tick until the returned task is aborted.
    pub fn start(
        self: &Arc<Self>,
        mut collector: Collector,
        interval: Duration,
        history_capacity: usize,
    ) -> JoinHandle<()> {
        let provider = Arc::clone(self);
        tokio::spawn(async move {
            let mut history = SnapshotHistory::new(history_capacity);
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match collector.refresh() {
                    Some(snapshot) => provider.publish(&mut history, snapshot),
                    None => {
                        tracing::warn!(pid = %collector.pid(), "sampled process is gone; sampling stopped");
                        break;
                    }
                }
            }
        })
    }

    fn publish(&self, history: &mut SnapshotHistory, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        history.record(Arc::clone(&snapshot));
        self.history_tx.send_replace(history.to_vec());
        self.snapshot_tx.send_replace(Some(snapshot));
    }
}

#[async_trait]
impl PerformanceDataProvider for LocalProvider {
    fn current_snapshot(&self) -> SnapshotCell {
        self.snapshot_tx.subscribe()
    }

    fn history(&self) -> HistoryCell {
        self.history_tx.subscribe()
    }

    fn settings(&self) -> SettingsCell {
        self.settings_tx.subscribe()
    }

    fn request_gc(&self) {
        let n = self.gc_requests.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(requests = n, "GC hint recorded; native process has no collector to signal");
    }

    async fn export_metrics(&self) -> Result<PathBuf, ExportError> {
        let settings = *self.settings_tx.borrow();
        let current = self.snapshot_tx.borrow().clone();
        let history = self.history_tx.borrow().clone();
        write_export_document(self.export_dir.clone(), settings, current, history).await
    }

    async fn update_settings(&self, settings: Settings) {
        self.settings_tx.send_replace(settings);
    }
}
