use serde::{Deserialize, Serialize};

/// Health thresholds, replaced as a whole by the provider.
///
/// `warning < critical` is expected for both metrics but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub memory_warning_threshold_percent: f32,
    pub memory_critical_threshold_percent: f32,
    pub cpu_warning_threshold_percent: f32,
    pub cpu_critical_threshold_percent: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            memory_warning_threshold_percent: 75.0,
            memory_critical_threshold_percent: 90.0,
            cpu_warning_threshold_percent: 70.0,
            cpu_critical_threshold_percent: 90.0,
        }
    }
}

impl Settings {
    /// Shift every threshold by `delta` points, clamped to `0..=100`.
    pub fn shifted(self, delta: f32) -> Self {
        let shift = |v: f32| (v + delta).clamp(0.0, 100.0);
        Settings {
            memory_warning_threshold_percent: shift(self.memory_warning_threshold_percent),
            memory_critical_threshold_percent: shift(self.memory_critical_threshold_percent),
            cpu_warning_threshold_percent: shift(self.cpu_warning_threshold_percent),
            cpu_critical_threshold_percent: shift(self.cpu_critical_threshold_percent),
        }
    }
}
