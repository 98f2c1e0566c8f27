//! Hand-driven provider.
//!
//! Snapshots are pushed explicitly and export outcomes are scripted, so the
//! controller can be exercised without sampling a real process. Exports can
//! also be held behind a gate to observe the in-flight state.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use super::export_file::write_export_document;
use super::provider::{
    ExportError, HistoryCell, PerformanceDataProvider, SettingsCell, SnapshotCell,
};
use super::settings::Settings;
use super::snapshot::{
    BrowserTab, EditorTab, GcCollector, LastGc, MemoryPool, PanelRecord, PoolKind, Snapshot,
    TerminalSession, ThreadRecord, WindowRecord,
};

/// What the next `export_metrics` call returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportScript {
    Succeed(PathBuf),
    Fail(String),
    /// Write a real export document into the directory.
    WriteInto(PathBuf),
}

pub struct MemoryProvider {
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    history_tx: watch::Sender<Vec<Arc<Snapshot>>>,
    settings_tx: watch::Sender<Settings>,
    script_tx: watch::Sender<ExportScript>,
    gate_tx: watch::Sender<bool>,
    history_capacity: usize,
    gc_requests: AtomicUsize,
    export_calls: AtomicUsize,
    settings_updates: AtomicUsize,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new(Settings::default(), 120)
    }
}

impl MemoryProvider {
    pub fn new(settings: Settings, history_capacity: usize) -> Self {
        MemoryProvider {
            snapshot_tx: watch::Sender::new(None),
            history_tx: watch::Sender::new(Vec::new()),
            settings_tx: watch::Sender::new(settings),
            script_tx: watch::Sender::new(ExportScript::Succeed(
                std::env::temp_dir().join("perf-metrics.json"),
            )),
            gate_tx: watch::Sender::new(true),
            history_capacity: history_capacity.max(1),
            gc_requests: AtomicUsize::new(0),
            export_calls: AtomicUsize::new(0),
            settings_updates: AtomicUsize::new(0),
        }
    }

    /// Publish a new current snapshot and append it to the history.
    pub fn push_snapshot(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        let capacity = self.history_capacity;
        self.history_tx.send_modify(|entries| {
            if entries.len() >= capacity {
                entries.remove(0);
            }
            entries.push(Arc::clone(&snapshot));
        });
        self.snapshot_tx.send_replace(Some(snapshot));
    }

    pub fn set_settings(&self, settings: Settings) {
        self.settings_tx.send_replace(settings);
    }

    pub fn script_export(&self, script: ExportScript) {
        self.script_tx.send_replace(script);
    }

    /// Park every export call until `release_exports` is called.
    pub fn hold_exports(&self) {
        self.gate_tx.send_replace(false);
    }

    pub fn release_exports(&self) {
        self.gate_tx.send_replace(true);
    }

    pub fn gc_requests(&self) -> usize {
        self.gc_requests.load(Ordering::SeqCst)
    }

    pub fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }

    pub fn settings_updates(&self) -> usize {
        self.settings_updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PerformanceDataProvider for MemoryProvider {
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
        self.gc_requests.fetch_add(1, Ordering::SeqCst);
    }

    async fn export_metrics(&self) -> Result<PathBuf, ExportError> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.gate_tx.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(ExportError::Interrupted("provider shut down".to_string()));
        }

        let script = self.script_tx.borrow().clone();
        match script {
            ExportScript::Succeed(path) => Ok(path),
            ExportScript::Fail(message) => Err(ExportError::Provider(message)),
            ExportScript::WriteInto(dir) => {
                let settings = *self.settings_tx.borrow();
                let current = self.snapshot_tx.borrow().clone();
                let history = self.history_tx.borrow().clone();
                write_export_document(dir, settings, current, history).await
            }
        }
    }

    async fn update_settings(&self, settings: Settings) {
        self.settings_updates.fetch_add(1, Ordering::SeqCst);
        self.settings_tx.send_replace(settings);
    }
}

/// Deterministic, slowly varying snapshot for demos and benchmarks.
pub fn synthetic_snapshot(tick: u64) -> Snapshot {
    let phase = tick as f32 / 8.0;
    let heap_max_mb = 2048.0;
    let heap_usage_percent = 55.0 + 35.0 * phase.sin();
    let heap_used_mb = heap_max_mb * heap_usage_percent / 100.0;
    let base_ms = 1_700_000_000_000 + tick * 1000;

    let threads = (0..12u64)
        .map(|i| ThreadRecord {
            id: i + 1,
            name: format!("worker-pool-{}-thread-{}", i / 4, i % 4),
            state: ["RUNNABLE", "WAITING", "TIMED_WAITING", "BLOCKED"][(i as usize + tick as usize) % 4]
                .to_string(),
            cpu_time_ms: (i + 1) * 731 * (tick + 1),
        })
        .collect::<Vec<_>>();

    let young_count = tick * 3;
    let old_count = tick / 10;

    Snapshot {
        timestamp_ms: base_ms,
        heap_usage_percent,
        heap_used_mb,
        heap_committed_mb: heap_used_mb.max(1024.0),
        heap_max_mb,
        non_heap_used_mb: 180.0 + (tick % 20) as f32,
        non_heap_committed_mb: 256.0,
        memory_pools: vec![
            MemoryPool {
                name: "G1 Eden Space".to_string(),
                kind: PoolKind::Heap,
                usage_percent: (heap_usage_percent + 10.0).min(100.0),
            },
            MemoryPool {
                name: "G1 Old Gen".to_string(),
                kind: PoolKind::Heap,
                usage_percent: heap_usage_percent * 0.8,
            },
            MemoryPool {
                name: "Metaspace".to_string(),
                kind: PoolKind::NonHeap,
                usage_percent: 62.0,
            },
            MemoryPool {
                name: "CodeHeap 'non-profiled nmethods'".to_string(),
                kind: PoolKind::NonHeap,
                usage_percent: 18.0,
            },
        ],
        process_cpu_load_percent: 45.0 + 40.0 * (phase * 1.7).cos(),
        system_cpu_load_percent: 30.0 + 20.0 * (phase * 0.6).sin(),
        active_thread_count: threads.len() as u32,
        available_processors: 8,
        threads,
        gc_collection_count: young_count + old_count,
        gc_collection_time_ms: young_count * 4 + old_count * 85,
        gc_collectors: vec![
            GcCollector {
                name: "G1 Young Generation".to_string(),
                collection_count: young_count,
                collection_time_ms: young_count * 4,
                last_gc: (young_count > 0).then(|| LastGc {
                    start_time_ms: base_ms - 1_500,
                    duration_ms: 4,
                    memory_reclaimed_bytes: 48 * 1024 * 1024,
                }),
            },
            GcCollector {
                name: "G1 Old Generation".to_string(),
                collection_count: old_count,
                collection_time_ms: old_count * 85,
                last_gc: (old_count > 0).then(|| LastGc {
                    start_time_ms: base_ms - 95_000,
                    duration_ms: 85,
                    memory_reclaimed_bytes: 0,
                }),
            },
        ],
        browser_tab_count: 2,
        browser_tabs: vec![
            BrowserTab {
                id: "b1".to_string(),
                title: "Dashboard".to_string(),
                url: "https://example.com/dashboard".to_string(),
                is_active: true,
            },
            BrowserTab {
                id: "b2".to_string(),
                title: String::new(),
                url: String::new(),
                is_active: false,
            },
        ],
        terminal_count: 1,
        terminals: vec![TerminalSession {
            id: "t1".to_string(),
            title: "zsh".to_string(),
            working_directory: "~/src/perfpanel".to_string(),
            is_active: true,
        }],
        editor_tab_count: 2,
        editor_tabs: vec![
            EditorTab {
                id: "e1".to_string(),
                file_name: "controller.rs".to_string(),
                file_path: "~/src/perfpanel/src/controller.rs".to_string(),
                is_modified: tick % 2 == 0,
                is_active: true,
            },
            EditorTab {
                id: "e2".to_string(),
                file_name: "Cargo.toml".to_string(),
                file_path: "~/src/perfpanel/Cargo.toml".to_string(),
                is_modified: false,
                is_active: false,
            },
        ],
        panel_count: 1,
        panels: vec![PanelRecord {
            id: "p1".to_string(),
            title: "Performance".to_string(),
            is_active: true,
        }],
        window_count: 1,
        windows: vec![WindowRecord {
            id: "w1".to_string(),
            title: "perfpanel".to_string(),
            is_active: true,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_snapshot_updates_current_and_history() {
        let provider = MemoryProvider::new(Settings::default(), 2);
        let current = provider.current_snapshot();
        let history = provider.history();
        assert!(current.borrow().is_none());

        for tick in 0..3 {
            provider.push_snapshot(synthetic_snapshot(tick));
        }

        let latest = current.borrow().clone().expect("snapshot published");
        assert_eq!(latest.timestamp_ms, synthetic_snapshot(2).timestamp_ms);
        let stamps: Vec<u64> = history.borrow().iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(
            stamps,
            vec![
                synthetic_snapshot(1).timestamp_ms,
                synthetic_snapshot(2).timestamp_ms
            ]
        );
    }

    #[tokio::test]
    async fn scripted_failure_is_returned() {
        let provider = MemoryProvider::default();
        provider.script_export(ExportScript::Fail("disk full".to_string()));
        let err = provider.export_metrics().await.unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(provider.export_calls(), 1);
    }

    #[tokio::test]
    async fn update_settings_replaces_value() {
        let provider = MemoryProvider::default();
        let cell = provider.settings();
        let next = Settings::default().shifted(5.0);
        provider.update_settings(next).await;
        assert_eq!(*cell.borrow(), next);
        assert_eq!(provider.settings_updates(), 1);
    }

    #[test]
    fn synthetic_snapshot_is_consistent() {
        let s = synthetic_snapshot(7);
        assert_eq!(s.active_thread_count as usize, s.threads.len());
        assert_eq!(s.total_resources(), 7);
        assert!(s.heap_usage_percent >= 0.0 && s.heap_usage_percent <= 100.0);
    }
}
