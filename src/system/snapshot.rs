use serde::{Deserialize, Serialize};

/// One immutable point-in-time measurement of a monitored process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Capture time, unix milliseconds.
    pub timestamp_ms: u64,

    pub heap_usage_percent: f32,
    pub heap_used_mb: f32,
    pub heap_committed_mb: f32,
    pub heap_max_mb: f32,
    pub non_heap_used_mb: f32,
    pub non_heap_committed_mb: f32,
    pub memory_pools: Vec<MemoryPool>,

    pub process_cpu_load_percent: f32,
    pub system_cpu_load_percent: f32,
    pub active_thread_count: u32,
    pub available_processors: u32,
    pub threads: Vec<ThreadRecord>,

    pub gc_collection_count: u64,
    pub gc_collection_time_ms: u64,
    pub gc_collectors: Vec<GcCollector>,

    pub browser_tab_count: u32,
    pub browser_tabs: Vec<BrowserTab>,
    pub terminal_count: u32,
    pub terminals: Vec<TerminalSession>,
    pub editor_tab_count: u32,
    pub editor_tabs: Vec<EditorTab>,
    pub panel_count: u32,
    pub panels: Vec<PanelRecord>,
    pub window_count: u32,
    pub windows: Vec<WindowRecord>,
}

impl Snapshot {
    pub fn total_resources(&self) -> u32 {
        self.browser_tab_count
            + self.terminal_count
            + self.editor_tab_count
            + self.panel_count
            + self.window_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolKind {
    Heap,
    NonHeap,
}

impl PoolKind {
    pub fn label(self) -> &'static str {
        match self {
            PoolKind::Heap => "HEAP",
            PoolKind::NonHeap => "NON_HEAP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPool {
    pub name: String,
    pub kind: PoolKind,
    pub usage_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub id: u64,
    pub name: String,
    /// Scheduler state as reported by the source, e.g. `RUNNABLE` or `BLOCKED`.
    pub state: String,
    pub cpu_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcCollector {
    pub name: String,
    pub collection_count: u64,
    pub collection_time_ms: u64,
    pub last_gc: Option<LastGc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastGc {
    pub start_time_ms: u64,
    pub duration_ms: u64,
    pub memory_reclaimed_bytes: u64,
}

impl LastGc {
    pub fn memory_reclaimed_mb(&self) -> f64 {
        self.memory_reclaimed_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserTab {
    pub id: String,
    pub title: String,
    pub url: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSession {
    pub id: String,
    pub title: String,
    pub working_directory: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorTab {
    pub id: String,
    pub file_name: String,
    pub file_path: String,
    pub is_modified: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelRecord {
    pub id: String,
    pub title: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowRecord {
    pub id: String,
    pub title: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_resources_sums_every_count() {
        let snapshot = Snapshot {
            browser_tab_count: 3,
            terminal_count: 2,
            editor_tab_count: 4,
            panel_count: 1,
            window_count: 1,
            ..Snapshot::default()
        };
        assert_eq!(snapshot.total_resources(), 11);
    }

    #[test]
    fn pool_kind_uses_upper_snake_case_on_the_wire() {
        let json = serde_json::to_string(&PoolKind::NonHeap).unwrap();
        assert_eq!(json, "\"NON_HEAP\"");
        let kind: PoolKind = serde_json::from_str("\"HEAP\"").unwrap();
        assert_eq!(kind, PoolKind::Heap);
    }

    #[test]
    fn partial_snapshot_json_fills_defaults() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"heap_usage_percent": 42.5, "active_thread_count": 7}"#)
                .unwrap();
        assert!((snapshot.heap_usage_percent - 42.5).abs() < f32::EPSILON);
        assert_eq!(snapshot.active_thread_count, 7);
        assert!(snapshot.threads.is_empty());
    }
}
