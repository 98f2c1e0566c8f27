//! Single-flight export lifecycle.
//!
//! ```text
//! Idle ──request──▶ InFlight ──Ok(path)──▶ Succeeded(display path)
//!   ▲                  │
//!   │                  └──Err(e)───▶ Failed(message)
//!   └──── dismiss ◀────────────────────────┘
//! ```
//!
//! A request while in flight is dropped. Success and failure live in
//! separate slots so each can be dismissed on its own.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::system::provider::{ExportError, PerformanceDataProvider};

pub const EXPORT_FAILED_FALLBACK: &str = "Failed to export metrics";

pub type ExportOutcome = Result<PathBuf, ExportError>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    InFlight,
    Succeeded(String),
    Failed(String),
}

/// Reveal or open a finished export. Failures are never surfaced.
pub trait FileOpener: Send + Sync {
    fn open(&self, path: &Path) -> std::io::Result<()>;
}

/// Opens files with the platform's default handler.
pub struct SystemOpener;

impl FileOpener for SystemOpener {
    fn open(&self, path: &Path) -> std::io::Result<()> {
        open::that(path)
    }
}

/// Observable slots, as the presentation layer sees them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportView {
    pub is_exporting: bool,
    pub success: Option<String>,
    pub failure: Option<String>,
}

pub struct ExportCoordinator {
    task: Option<JoinHandle<ExportOutcome>>,
    success: Option<String>,
    failure: Option<String>,
    home: Option<PathBuf>,
    opener: Option<Arc<dyn FileOpener>>,
}

impl ExportCoordinator {
    pub fn new(opener: Option<Arc<dyn FileOpener>>) -> Self {
        ExportCoordinator {
            task: None,
            success: None,
            failure: None,
            home: dirs::home_dir(),
            opener,
        }
    }

    /// Override the directory collapsed to `~` in display paths.
    pub fn with_home_dir(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn is_exporting(&self) -> bool {
        self.task.is_some()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn state(&self) -> ExportState {
        if self.is_exporting() {
            ExportState::InFlight
        } else if let Some(message) = &self.failure {
            // a newer start would have cleared it, so it is the latest outcome
            ExportState::Failed(message.clone())
        } else if let Some(path) = &self.success {
            ExportState::Succeeded(path.clone())
        } else {
            ExportState::Idle
        }
    }

    pub fn view(&self) -> ExportView {
        ExportView {
            is_exporting: self.is_exporting(),
            success: self.success.clone(),
            failure: self.failure.clone(),
        }
    }

    /// Start an export on the current tokio runtime.
    ///
    /// Returns `false` without side effects when one is already running.
    pub fn request(&mut self, provider: Arc<dyn PerformanceDataProvider>) -> bool {
        if self.is_exporting() {
            tracing::debug!("export already in flight; request ignored");
            return false;
        }
        self.failure = None;
        self.task = Some(tokio::spawn(
            async move { provider.export_metrics().await },
        ));
        tracing::debug!("export started");
        true
    }

    /// Wait for the in-flight export. `None` when nothing is running.
    ///
    /// Cancel-safe: dropping the future leaves the export in flight.
    pub async fn completion(&mut self) -> Option<ExportOutcome> {
        let task = self.task.as_mut()?;
        let joined = task.await;
        self.task = None;
        Some(joined.unwrap_or_else(|e| Err(ExportError::Interrupted(e.to_string()))))
    }

    /// Take a finished export's outcome without waiting.
    pub fn try_completion(&mut self) -> Option<ExportOutcome> {
        if !self.task.as_ref().is_some_and(|t| t.is_finished()) {
            return None;
        }
        self.completion().now_or_never().flatten()
    }

    /// Fold an outcome into the slots and run the open side effect.
    pub fn apply(&mut self, outcome: ExportOutcome) {
        match outcome {
            Ok(path) => {
                let shown = display_path(&path, self.home.as_deref());
                tracing::info!(path = %path.display(), "export succeeded");
                self.success = Some(shown);
                if let Some(opener) = &self.opener
                    && let Err(e) = opener.open(&path)
                {
                    tracing::warn!(path = %path.display(), error = %e, "could not open exported file");
                }
            }
            Err(err) => {
                let message = failure_message(&err);
                tracing::info!(error = %message, "export failed");
                self.failure = Some(message);
            }
        }
    }

    pub fn dismiss_success(&mut self) {
        self.success = None;
    }

    pub fn dismiss_failure(&mut self) {
        self.failure = None;
    }

    /// Drop the in-flight task handle. Its eventual result goes nowhere.
    pub fn abandon(&mut self) {
        if self.task.take().is_some() {
            tracing::debug!("in-flight export abandoned");
        }
    }
}

/// Shorten an export path for display: `~/rest` under `home`, else the file name.
pub fn display_path(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return Path::new("~").join(rest).display().to_string();
    }
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.display().to_string(),
    }
}

pub fn failure_message(err: &ExportError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        EXPORT_FAILED_FALLBACK.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::memory::{ExportScript, MemoryProvider};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    impl FileOpener for RecordingOpener {
        fn open(&self, path: &Path) -> std::io::Result<()> {
            self.opened.lock().unwrap().push(path.to_path_buf());
            if self.fail {
                Err(std::io::Error::other("no handler"))
            } else {
                Ok(())
            }
        }
    }

    fn coordinator(opener: Option<Arc<dyn FileOpener>>) -> ExportCoordinator {
        ExportCoordinator::new(opener).with_home_dir(Some(PathBuf::from("/home/alice")))
    }

    #[test]
    fn display_path_collapses_home() {
        let home = Path::new("/home/alice");
        assert_eq!(
            display_path(Path::new("/home/alice/export.json"), Some(home)),
            "~/export.json"
        );
        assert_eq!(
            display_path(Path::new("/home/alice/perf/m.json"), Some(home)),
            "~/perf/m.json"
        );
        assert_eq!(display_path(Path::new("/home/alice"), Some(home)), "~");
    }

    #[test]
    fn display_path_falls_back_to_file_name() {
        let home = Path::new("/home/alice");
        assert_eq!(display_path(Path::new("/tmp/x.json"), Some(home)), "x.json");
        // component-wise prefix: a sibling directory is not home
        assert_eq!(
            display_path(Path::new("/home/alice2/x.json"), Some(home)),
            "x.json"
        );
        assert_eq!(display_path(Path::new("/tmp/x.json"), None), "x.json");
    }

    #[test]
    fn empty_failure_uses_fallback() {
        assert_eq!(
            failure_message(&ExportError::Provider(String::new())),
            EXPORT_FAILED_FALLBACK
        );
        assert_eq!(
            failure_message(&ExportError::Provider("boom".to_string())),
            "boom"
        );
    }

    #[test]
    fn starts_idle() {
        let c = coordinator(None);
        assert_eq!(c.state(), ExportState::Idle);
        assert_eq!(c.view(), ExportView::default());
    }

    #[tokio::test]
    async fn second_request_while_in_flight_is_ignored() {
        let provider = Arc::new(MemoryProvider::default());
        provider.hold_exports();
        let mut c = coordinator(None);

        assert!(c.request(provider.clone()));
        assert!(!c.request(provider.clone()));
        tokio::task::yield_now().await;

        assert_eq!(c.state(), ExportState::InFlight);
        assert_eq!(provider.export_calls(), 1);

        provider.release_exports();
        let outcome = c.completion().await.expect("export was running");
        c.apply(outcome);
        assert!(!c.is_exporting());
        assert_eq!(provider.export_calls(), 1);
    }

    #[tokio::test]
    async fn success_opens_full_path_and_shows_short_one() {
        let provider = Arc::new(MemoryProvider::default());
        provider.script_export(ExportScript::Succeed(PathBuf::from("/home/alice/export.json")));
        let opener = Arc::new(RecordingOpener::default());
        let mut c = coordinator(Some(opener.clone()));

        c.request(provider);
        let outcome = c.completion().await.unwrap();
        c.apply(outcome);

        assert_eq!(c.state(), ExportState::Succeeded("~/export.json".to_string()));
        assert_eq!(
            *opener.opened.lock().unwrap(),
            vec![PathBuf::from("/home/alice/export.json")]
        );
    }

    #[tokio::test]
    async fn opener_failure_is_swallowed() {
        let provider = Arc::new(MemoryProvider::default());
        provider.script_export(ExportScript::Succeed(PathBuf::from("/tmp/x.json")));
        let opener = Arc::new(RecordingOpener {
            fail: true,
            ..RecordingOpener::default()
        });
        let mut c = coordinator(Some(opener.clone()));

        c.request(provider);
        let outcome = c.completion().await.unwrap();
        c.apply(outcome);

        assert_eq!(c.state(), ExportState::Succeeded("x.json".to_string()));
        assert_eq!(c.failure(), None);
        assert_eq!(opener.opened.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dismissals_are_independent() {
        let provider = Arc::new(MemoryProvider::default());
        provider.script_export(ExportScript::Succeed(PathBuf::from("/tmp/a")));
        let mut c = coordinator(None);
        c.request(provider.clone());
        let outcome = c.completion().await.unwrap();
        c.apply(outcome);
        assert_eq!(c.state(), ExportState::Succeeded("a".to_string()));

        c.dismiss_failure();
        assert_eq!(c.success(), Some("a"));

        provider.script_export(ExportScript::Fail("boom".to_string()));
        c.request(provider);
        let outcome = c.completion().await.unwrap();
        c.apply(outcome);
        // both slots populated; the newer failure wins the derived state
        assert_eq!(c.state(), ExportState::Failed("boom".to_string()));
        assert_eq!(c.success(), Some("a"));

        c.dismiss_success();
        assert_eq!(c.failure(), Some("boom"));
        c.dismiss_failure();
        assert_eq!(c.state(), ExportState::Idle);
    }

    #[tokio::test]
    async fn retry_after_failure_needs_no_dismiss() {
        let provider = Arc::new(MemoryProvider::default());
        provider.script_export(ExportScript::Fail("boom".to_string()));
        let mut c = coordinator(None);
        c.request(provider.clone());
        let outcome = c.completion().await.unwrap();
        c.apply(outcome);
        assert_eq!(c.state(), ExportState::Failed("boom".to_string()));

        provider.hold_exports();
        assert!(c.request(provider.clone()));
        assert_eq!(c.state(), ExportState::InFlight);
        assert_eq!(c.failure(), None);
        provider.release_exports();
    }

    #[tokio::test]
    async fn try_completion_only_takes_finished_tasks() {
        let provider = Arc::new(MemoryProvider::default());
        provider.hold_exports();
        let mut c = coordinator(None);
        c.request(provider.clone());
        assert!(c.try_completion().is_none());
        assert!(c.is_exporting());

        provider.release_exports();
        for _ in 0..50 {
            if let Some(outcome) = c.try_completion() {
                c.apply(outcome);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(matches!(c.state(), ExportState::Succeeded(_)));
    }
}
