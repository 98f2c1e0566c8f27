use crate::system::settings::Settings;
use crate::system::snapshot::Snapshot;

/// Three-level severity, ordered `Good < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HealthStatus {
    #[default]
    Good,
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Good => "GOOD",
            HealthStatus::Warning => "WARNING",
            HealthStatus::Critical => "CRITICAL",
        }
    }
}

/// Classify `value` against a warning and a critical threshold.
///
/// The critical comparison runs first, so when `warning >= critical` the
/// result is still deterministic: critical wins ties.
pub fn classify(value: f32, warning: f32, critical: f32) -> HealthStatus {
    if value >= critical {
        HealthStatus::Critical
    } else if value >= warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Good
    }
}

/// Worst of two statuses.
pub fn combine(a: HealthStatus, b: HealthStatus) -> HealthStatus {
    a.max(b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSummary {
    pub memory: HealthStatus,
    pub cpu: HealthStatus,
    pub overall: HealthStatus,
}

impl HealthSummary {
    pub fn evaluate(snapshot: &Snapshot, settings: &Settings) -> Self {
        let memory = classify(
            snapshot.heap_usage_percent,
            settings.memory_warning_threshold_percent,
            settings.memory_critical_threshold_percent,
        );
        let cpu = classify(
            snapshot.process_cpu_load_percent,
            settings.cpu_warning_threshold_percent,
            settings.cpu_critical_threshold_percent,
        );
        HealthSummary {
            memory,
            cpu,
            overall: combine(memory, cpu),
        }
    }
}
