//! Tab-scoped projections: pure functions of a snapshot and the settings.

use crate::format::{format_cpu_time, format_mb, format_percent, format_time_ago, truncate_unicode};
use crate::health::{HealthStatus, HealthSummary, classify};
use crate::system::settings::Settings;
use crate::system::snapshot::{GcCollector, MemoryPool, PoolKind, Snapshot, ThreadRecord};

use super::tab::Tab;

const POOL_NAME_WIDTH: usize = 20;
const THREAD_NAME_WIDTH: usize = 30;
const POOL_WARNING_PERCENT: f32 = 75.0;
const POOL_CRITICAL_PERCENT: f32 = 90.0;
const THREAD_GAUGE_SCALE: f64 = 100.0;
const GC_GAUGE_SCALE: f64 = 50.0;
const MIN_RESOURCE_SCALE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// No snapshot observed yet. Distinct from a snapshot full of zeros.
    AwaitingData { tab: Tab, message: &'static str },
    Overview(OverviewView),
    Memory(MemoryView),
    Cpu(CpuView),
    Timings(TimingsView),
    Resources(ResourcesView),
}

impl Projection {
    pub fn build(tab: Tab, snapshot: Option<&Snapshot>, settings: &Settings) -> Projection {
        let Some(snapshot) = snapshot else {
            return Projection::AwaitingData {
                tab,
                message: tab.waiting_message(),
            };
        };
        match tab {
            Tab::Overview => Projection::Overview(OverviewView::build(snapshot, settings)),
            Tab::Memory => Projection::Memory(MemoryView::build(snapshot)),
            Tab::Cpu => Projection::Cpu(CpuView::build(snapshot, settings)),
            Tab::Timings => Projection::Timings(TimingsView::build(snapshot)),
            Tab::Resources => Projection::Resources(ResourcesView::build(snapshot)),
        }
    }

    pub fn is_awaiting_data(&self) -> bool {
        matches!(self, Projection::AwaitingData { .. })
    }
}

/// Fraction of `scale` in `0.0..=1.0`. Non-finite input reads as empty.
fn ratio(value: f64, scale: f64) -> f64 {
    if scale > 0.0 && value.is_finite() {
        (value / scale).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeView {
    pub label: &'static str,
    pub ratio: f64,
    pub value_text: String,
    pub status: HealthStatus,
    /// Tab that shows the details behind this gauge.
    pub target: Tab,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCount {
    pub label: &'static str,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewView {
    pub health: HealthSummary,
    pub gauges: Vec<GaugeView>,
    pub resources: Vec<ResourceCount>,
}

impl OverviewView {
    fn build(snapshot: &Snapshot, settings: &Settings) -> Self {
        let health = HealthSummary::evaluate(snapshot, settings);
        let gauges = vec![
            GaugeView {
                label: "Heap",
                ratio: ratio(snapshot.heap_usage_percent as f64, 100.0),
                value_text: format_percent(snapshot.heap_usage_percent),
                status: health.memory,
                target: Tab::Memory,
            },
            GaugeView {
                label: "CPU",
                ratio: ratio(snapshot.process_cpu_load_percent as f64, 100.0),
                value_text: format_percent(snapshot.process_cpu_load_percent),
                status: health.cpu,
                target: Tab::Cpu,
            },
            GaugeView {
                label: "Threads",
                ratio: ratio(snapshot.active_thread_count as f64, THREAD_GAUGE_SCALE),
                value_text: snapshot.active_thread_count.to_string(),
                status: HealthStatus::Good,
                target: Tab::Cpu,
            },
            GaugeView {
                label: "GC",
                ratio: ratio(snapshot.gc_collection_count as f64, GC_GAUGE_SCALE),
                value_text: snapshot.gc_collection_count.to_string(),
                status: HealthStatus::Good,
                target: Tab::Timings,
            },
        ];
        let resources = vec![
            ResourceCount { label: "Browser", count: snapshot.browser_tab_count },
            ResourceCount { label: "Terminal", count: snapshot.terminal_count },
            ResourceCount { label: "Editor", count: snapshot.editor_tab_count },
            ResourceCount { label: "Panels", count: snapshot.panel_count },
            ResourceCount { label: "Windows", count: snapshot.window_count },
        ];
        OverviewView {
            health,
            gauges,
            resources,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolRow {
    pub name: String,
    pub kind: PoolKind,
    pub usage_label: String,
    pub ratio: f64,
    pub status: HealthStatus,
}

impl PoolRow {
    fn build(pool: &MemoryPool) -> Self {
        PoolRow {
            name: truncate_unicode(&pool.name, POOL_NAME_WIDTH),
            kind: pool.kind,
            usage_label: format_percent(pool.usage_percent),
            ratio: ratio(pool.usage_percent as f64, 100.0),
            status: classify(pool.usage_percent, POOL_WARNING_PERCENT, POOL_CRITICAL_PERCENT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryView {
    pub heap_ratio: f64,
    pub heap_label: String,
    pub committed_label: String,
    pub pools: Vec<PoolRow>,
    pub non_heap_used: String,
    pub non_heap_committed: String,
}

impl MemoryView {
    fn build(snapshot: &Snapshot) -> Self {
        MemoryView {
            heap_ratio: ratio(snapshot.heap_usage_percent as f64, 100.0),
            heap_label: format!(
                "{} / {}",
                format_mb(snapshot.heap_used_mb),
                format_mb(snapshot.heap_max_mb)
            ),
            committed_label: format!("Committed: {}", format_mb(snapshot.heap_committed_mb)),
            pools: snapshot.memory_pools.iter().map(PoolRow::build).collect(),
            non_heap_used: format_mb(snapshot.non_heap_used_mb),
            non_heap_committed: format_mb(snapshot.non_heap_committed_mb),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadTone {
    Running,
    Blocked,
    Waiting,
    Other,
}

impl ThreadTone {
    pub fn of(state: &str) -> Self {
        match state {
            "RUNNABLE" => ThreadTone::Running,
            "BLOCKED" => ThreadTone::Blocked,
            "WAITING" | "TIMED_WAITING" => ThreadTone::Waiting,
            _ => ThreadTone::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRow {
    pub id: u64,
    pub name: String,
    pub state: String,
    pub tone: ThreadTone,
    pub cpu_time: String,
}

impl ThreadRow {
    fn build(thread: &ThreadRecord) -> Self {
        ThreadRow {
            id: thread.id,
            name: truncate_unicode(&thread.name, THREAD_NAME_WIDTH),
            state: thread.state.clone(),
            tone: ThreadTone::of(&thread.state),
            cpu_time: format_cpu_time(thread.cpu_time_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CpuView {
    pub process_ratio: f64,
    pub process_label: String,
    pub process_status: HealthStatus,
    pub system_ratio: f64,
    pub system_label: String,
    pub thread_header: String,
    pub threads: Vec<ThreadRow>,
}

impl CpuView {
    fn build(snapshot: &Snapshot, settings: &Settings) -> Self {
        CpuView {
            process_ratio: ratio(snapshot.process_cpu_load_percent as f64, 100.0),
            process_label: format_percent(snapshot.process_cpu_load_percent),
            process_status: classify(
                snapshot.process_cpu_load_percent,
                settings.cpu_warning_threshold_percent,
                settings.cpu_critical_threshold_percent,
            ),
            system_ratio: ratio(snapshot.system_cpu_load_percent as f64, 100.0),
            system_label: format_percent(snapshot.system_cpu_load_percent),
            thread_header: format!(
                "Threads ({} active, {} processors)",
                snapshot.active_thread_count, snapshot.available_processors
            ),
            threads: snapshot.threads.iter().map(ThreadRow::build).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastGcRow {
    pub ago: String,
    pub duration: String,
    pub reclaimed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorRow {
    pub name: String,
    pub summary: String,
    pub last_gc: Option<LastGcRow>,
}

impl CollectorRow {
    fn build(collector: &GcCollector, now_ms: u64) -> Self {
        let last_gc = collector.last_gc.map(|last| LastGcRow {
            ago: format_time_ago(now_ms.saturating_sub(last.start_time_ms)),
            duration: format!("{}ms", last.duration_ms),
            reclaimed: (last.memory_reclaimed_bytes > 0)
                .then(|| format!("reclaimed {}MB", last.memory_reclaimed_mb() as u64)),
        });
        CollectorRow {
            name: collector.name.clone(),
            summary: format!(
                "{} collections, {}ms",
                collector.collection_count, collector.collection_time_ms
            ),
            last_gc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingsView {
    pub total_collections: u64,
    pub total_time: String,
    pub collectors: Vec<CollectorRow>,
}

impl TimingsView {
    fn build(snapshot: &Snapshot) -> Self {
        // "ago" is measured against the snapshot's own capture time
        let now_ms = snapshot.timestamp_ms;
        TimingsView {
            total_collections: snapshot.gc_collection_count,
            total_time: format!("{}ms", snapshot.gc_collection_time_ms),
            collectors: snapshot
                .gc_collectors
                .iter()
                .map(|c| CollectorRow::build(c, now_ms))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBar {
    pub label: &'static str,
    pub count: u32,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRow {
    pub id: String,
    pub title: String,
    pub detail: Option<String>,
    pub is_active: bool,
    pub is_modified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourcesView {
    pub total: u32,
    pub breakdown: Vec<ResourceBar>,
    pub browser_tabs: Vec<ResourceRow>,
    pub terminals: Vec<ResourceRow>,
    pub editor_tabs: Vec<ResourceRow>,
    pub panels: Vec<ResourceRow>,
    pub windows: Vec<ResourceRow>,
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl ResourcesView {
    fn build(snapshot: &Snapshot) -> Self {
        let total = snapshot.total_resources();
        let scale = total.max(MIN_RESOURCE_SCALE) as f64;
        let bar = |label, count: u32| ResourceBar {
            label,
            count,
            ratio: ratio(count as f64, scale),
        };

        ResourcesView {
            total,
            breakdown: vec![
                bar("Browser Tabs", snapshot.browser_tab_count),
                bar("Terminal Sessions", snapshot.terminal_count),
                bar("Editor Tabs", snapshot.editor_tab_count),
                bar("Open Panels", snapshot.panel_count),
                bar("Windows", snapshot.window_count),
            ],
            browser_tabs: snapshot
                .browser_tabs
                .iter()
                .map(|t| ResourceRow {
                    id: t.id.clone(),
                    title: or_default(&t.title, "Untitled"),
                    detail: Some(or_default(&t.url, "about:blank")),
                    is_active: t.is_active,
                    is_modified: false,
                })
                .collect(),
            terminals: snapshot
                .terminals
                .iter()
                .map(|t| ResourceRow {
                    id: t.id.clone(),
                    title: or_default(&t.title, "Terminal"),
                    detail: non_empty(&t.working_directory),
                    is_active: t.is_active,
                    is_modified: false,
                })
                .collect(),
            editor_tabs: snapshot
                .editor_tabs
                .iter()
                .map(|e| ResourceRow {
                    id: e.id.clone(),
                    title: or_default(&e.file_name, "Untitled"),
                    detail: non_empty(&e.file_path),
                    is_active: e.is_active,
                    is_modified: e.is_modified,
                })
                .collect(),
            panels: snapshot
                .panels
                .iter()
                .map(|p| ResourceRow {
                    id: p.id.clone(),
                    title: or_default(&p.title, "Panel"),
                    detail: None,
                    is_active: p.is_active,
                    is_modified: false,
                })
                .collect(),
            windows: snapshot
                .windows
                .iter()
                .map(|w| ResourceRow {
                    id: w.id.clone(),
                    title: or_default(&w.title, "Window"),
                    detail: None,
                    is_active: w.is_active,
                    is_modified: false,
                })
                .collect(),
        }
    }
}
