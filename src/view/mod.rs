pub mod projection;
pub mod tab;

use std::sync::Arc;

use crate::export::ExportView;
use crate::health::HealthSummary;
use crate::system::settings::Settings;
use crate::system::snapshot::Snapshot;

pub use projection::Projection;
pub use tab::Tab;

/// Heap and process-CPU percentages over the history, scaled by 100 for
/// integer sparklines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trend {
    pub heap: Vec<u64>,
    pub cpu: Vec<u64>,
}

impl Trend {
    pub fn from_history(history: &[Arc<Snapshot>]) -> Self {
        let scaled = |v: f32| (v.clamp(0.0, 100.0) * 100.0) as u64;
        Trend {
            heap: history.iter().map(|s| scaled(s.heap_usage_percent)).collect(),
            cpu: history
                .iter()
                .map(|s| scaled(s.process_cpu_load_percent))
                .collect(),
        }
    }
}

/// Everything the presentation layer renders. Never mutated by it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub selected_tab: Tab,
    /// `None` until the first snapshot arrives.
    pub health: Option<HealthSummary>,
    pub projection: Projection,
    pub export: ExportView,
    pub trend: Trend,
}

impl ViewState {
    pub fn compute(
        selected_tab: Tab,
        snapshot: Option<&Snapshot>,
        settings: &Settings,
        history: &[Arc<Snapshot>],
        export: ExportView,
    ) -> Self {
        ViewState {
            selected_tab,
            health: snapshot.map(|s| HealthSummary::evaluate(s, settings)),
            projection: Projection::build(selected_tab, snapshot, settings),
            export,
            trend: Trend::from_history(history),
        }
    }

    pub fn has_data(&self) -> bool {
        self.health.is_some()
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::compute(
            Tab::default(),
            None,
            &Settings::default(),
            &[],
            ExportView::default(),
        )
    }
}
