use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use perfpanel::controller::{Update, ViewStateController};
use perfpanel::export::{EXPORT_FAILED_FALLBACK, ExportState, FileOpener};
use perfpanel::health::HealthStatus;
use perfpanel::system::collector::Collector;
use perfpanel::system::local::LocalProvider;
use perfpanel::system::memory::{ExportScript, MemoryProvider, synthetic_snapshot};
use perfpanel::system::settings::Settings;
use perfpanel::system::snapshot::Snapshot;
use perfpanel::view::{Projection, Tab};

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<PathBuf>>,
}

impl FileOpener for RecordingOpener {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("perfpanel_it_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[tokio::test]
async fn health_follows_snapshots_and_settings() {
    let provider = Arc::new(MemoryProvider::default());
    let mut controller = ViewStateController::new(provider.clone(), None);
    assert!(controller.view().health.is_none());

    provider.push_snapshot(Snapshot {
        heap_usage_percent: 80.0,
        process_cpu_load_percent: 95.0,
        ..Snapshot::default()
    });
    controller.sync();
    let health = controller.view().health.unwrap();
    assert_eq!(health.memory, HealthStatus::Warning);
    assert_eq!(health.cpu, HealthStatus::Critical);
    assert_eq!(health.overall, HealthStatus::Critical);

    provider.set_settings(Settings {
        memory_warning_threshold_percent: 85.0,
        cpu_critical_threshold_percent: 99.0,
        ..Settings::default()
    });
    controller.sync();
    let health = controller.view().health.unwrap();
    assert_eq!(health.memory, HealthStatus::Good);
    assert_eq!(health.cpu, HealthStatus::Warning);
    assert_eq!(health.overall, HealthStatus::Warning);
}

#[tokio::test]
async fn every_tab_awaits_data_until_first_snapshot() {
    let provider = Arc::new(MemoryProvider::default());
    let mut controller = ViewStateController::new(provider.clone(), None);

    for tab in Tab::ALL {
        controller.select_tab(tab);
        match controller.view().projection {
            Projection::AwaitingData { tab: t, message } => {
                assert_eq!(t, tab);
                assert_eq!(message, tab.waiting_message());
            }
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    provider.push_snapshot(synthetic_snapshot(0));
    controller.sync();
    assert!(matches!(
        controller.view().projection,
        Projection::Resources(_)
    ));
}

#[tokio::test]
async fn export_writes_document_and_opens_it() {
    let dir = scratch_dir("export");
    let home = dir.parent().map(Path::to_path_buf);
    let provider = Arc::new(MemoryProvider::default());
    provider.push_snapshot(synthetic_snapshot(3));
    provider.script_export(ExportScript::WriteInto(dir.clone()));
    let opener = Arc::new(RecordingOpener::default());
    let mut controller = ViewStateController::with_home_dir(provider.clone(), Some(opener.clone()), home);

    controller.export_metrics();
    assert_eq!(controller.next_update().await, Some(Update::Export));

    let opened = opener.opened.lock().unwrap().clone();
    assert_eq!(opened.len(), 1);
    let path = &opened[0];
    assert!(path.starts_with(&dir));

    let shown = controller.view().export.success.expect("success slot set");
    let dir_name = dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(shown.starts_with(&format!("~/{dir_name}/perf-metrics-")), "{shown}");
    assert!(shown.ends_with(".json"));

    let body = std::fs::read_to_string(path).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(doc["exported_at_ms"].as_u64().is_some());
    assert_eq!(doc["settings"]["memory_warning_threshold_percent"], 75.0);
    assert_eq!(doc["history"].as_array().unwrap().len(), 1);
    assert_eq!(doc["current"]["active_thread_count"], 12);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn export_without_data_fails_and_can_be_retried() {
    let dir = scratch_dir("nodata");
    let provider = Arc::new(MemoryProvider::default());
    provider.script_export(ExportScript::WriteInto(dir.clone()));
    let mut controller = ViewStateController::new(provider.clone(), None);

    controller.export_metrics();
    controller.next_update().await;
    assert_eq!(
        controller.export_state(),
        ExportState::Failed("no metrics collected yet".to_string())
    );

    provider.push_snapshot(synthetic_snapshot(1));
    controller.sync();
    controller.export_metrics();
    assert_eq!(controller.view().export.failure, None);
    controller.next_update().await;
    assert!(matches!(controller.export_state(), ExportState::Succeeded(_)));
    assert_eq!(provider.export_calls(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn blank_failure_message_uses_fallback() {
    let provider = Arc::new(MemoryProvider::default());
    provider.script_export(ExportScript::Fail("   ".to_string()));
    let mut controller = ViewStateController::new(provider, None);

    controller.export_metrics();
    controller.next_update().await;
    assert_eq!(
        controller.view().export.failure.as_deref(),
        Some(EXPORT_FAILED_FALLBACK)
    );
}

#[tokio::test]
async fn late_completion_after_dispose_never_opens() {
    let provider = Arc::new(MemoryProvider::default());
    provider.hold_exports();
    provider.script_export(ExportScript::Succeed(PathBuf::from("/tmp/late.json")));
    let opener = Arc::new(RecordingOpener::default());
    let mut controller = ViewStateController::new(provider.clone(), Some(opener.clone()));
    let view = controller.subscribe();

    controller.export_metrics();
    controller.dispose();
    provider.release_exports();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(opener.opened.lock().unwrap().is_empty());
    assert_eq!(view.borrow().export.success, None);
}

#[tokio::test]
async fn local_provider_feeds_the_controller() {
    let dir = scratch_dir("local");
    let provider = Arc::new(LocalProvider::new(Settings::default(), dir.clone()));
    let collector = Collector::for_current_process().expect("current pid");
    let sampler = provider.start(collector, Duration::from_millis(10), 8);
    let mut controller = ViewStateController::new(provider.clone(), None);

    let wait = async {
        while !controller.view().has_data() {
            controller.next_update().await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("first sample within timeout");

    controller.select_tab(Tab::Cpu);
    match controller.view().projection {
        Projection::Cpu(cpu) => assert!(cpu.thread_header.starts_with("Threads (")),
        other => panic!("expected CPU projection, got {other:?}"),
    }

    controller.export_metrics();
    controller.next_update().await;
    // a snapshot or history update may land first
    while controller.is_exporting() {
        controller.next_update().await;
    }
    assert!(matches!(controller.export_state(), ExportState::Succeeded(_)));

    sampler.abort();
    controller.dispose();
    let _ = std::fs::remove_dir_all(&dir);
}
