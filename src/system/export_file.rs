use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::provider::ExportError;
use super::settings::Settings;
use super::snapshot::Snapshot;
use super::unix_millis;

#[derive(Serialize)]
struct ExportDocument {
    exported_at_ms: u64,
    settings: Settings,
    current: Arc<Snapshot>,
    history: Vec<Arc<Snapshot>>,
}

/// Write `perf-metrics-<unix_ms>.json` into `dir` and return its full path.
pub async fn write_export_document(
    dir: PathBuf,
    settings: Settings,
    current: Option<Arc<Snapshot>>,
    history: Vec<Arc<Snapshot>>,
) -> Result<PathBuf, ExportError> {
    let current = current.ok_or(ExportError::NoData)?;
    let exported_at_ms = unix_millis();
    let document = ExportDocument {
        exported_at_ms,
        settings,
        current,
        history,
    };
    let body = serde_json::to_vec_pretty(&document)?;
    let path = dir.join(format!("perf-metrics-{exported_at_ms}.json"));

    let target = path.clone();
    tokio::task::spawn_blocking(move || -> Result<(), ExportError> {
        std::fs::create_dir_all(&dir)?;
        std::fs::write(&target, body)?;
        Ok(())
    })
    .await
    .map_err(|e| ExportError::Interrupted(e.to_string()))??;

    tracing::info!(path = %path.display(), "metrics exported");
    Ok(path)
}
