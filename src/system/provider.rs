//! Capability contract of a snapshot/settings source.
//!
//! A provider owns the live snapshot, the bounded history and the settings.
//! Each is exposed as a `watch` cell: consumers read the latest value and are
//! woken on every write, but only the provider writes.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use super::settings::Settings;
use super::snapshot::Snapshot;

pub type SnapshotCell = watch::Receiver<Option<Arc<Snapshot>>>;
pub type HistoryCell = watch::Receiver<Vec<Arc<Snapshot>>>;
pub type SettingsCell = watch::Receiver<Settings>;

/// Why an export did not produce a file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode metrics: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no metrics collected yet")]
    NoData,

    /// Free-form failure reported by the provider. May be empty.
    #[error("{0}")]
    Provider(String),

    /// The export task stopped before returning an outcome.
    #[error("export interrupted: {0}")]
    Interrupted(String),
}

#[async_trait]
pub trait PerformanceDataProvider: Send + Sync {
    /// Latest snapshot, `None` until the first one is collected.
    fn current_snapshot(&self) -> SnapshotCell;

    /// Past snapshots, oldest first. Bounded by the provider.
    fn history(&self) -> HistoryCell;

    fn settings(&self) -> SettingsCell;

    /// One-shot GC hint. Fire-and-forget.
    fn request_gc(&self);

    /// Write the collected metrics somewhere and return the file path.
    ///
    /// May be called repeatedly; callers are responsible for not running
    /// two at once if they care.
    async fn export_metrics(&self) -> Result<PathBuf, ExportError>;

    /// Replace the settings atomically.
    async fn update_settings(&self, settings: Settings);
}
