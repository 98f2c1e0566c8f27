use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

use super::snapshot::{MemoryPool, PoolKind, Snapshot, ThreadRecord};
use super::unix_millis;

const MB: f32 = 1024.0 * 1024.0;

/// Samples one native process with `sysinfo`.
///
/// Resident memory against total memory stands in for the heap, swap for the
/// non-heap area. Native processes have no garbage collector, so GC fields
/// stay empty.
pub struct Collector {
    sys: System,
    pid: Pid,
}

impl Collector {
    pub fn new(pid: Pid) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
        Collector { sys, pid }
    }

    pub fn for_current_process() -> Option<Self> {
        sysinfo::get_current_pid().ok().map(Self::new)
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Refresh and build a snapshot. `None` once the process is gone.
    pub fn refresh(&mut self) -> Option<Snapshot> {
        self.sys.refresh_memory();
        self.sys.refresh_cpu_all();
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_memory()
                .with_cpu()
                .with_tasks(),
        );
        self.build_snapshot()
    }

    fn build_snapshot(&self) -> Option<Snapshot> {
        let process = self.sys.process(self.pid)?;

        let total_memory = self.sys.total_memory() as f32;
        let used_memory = self.sys.used_memory() as f32;
        let total_swap = self.sys.total_swap() as f32;
        let used_swap = self.sys.used_swap() as f32;
        let processors = self.sys.cpus().len().max(1) as u32;

        let threads = self.threads_of(process);
        let active_thread_count = if threads.is_empty() {
            1
        } else {
            threads.len() as u32
        };

        Some(Snapshot {
            timestamp_ms: unix_millis(),
            heap_usage_percent: percent(process.memory() as f32, total_memory),
            heap_used_mb: process.memory() as f32 / MB,
            heap_committed_mb: process.virtual_memory() as f32 / MB,
            heap_max_mb: total_memory / MB,
            non_heap_used_mb: used_swap / MB,
            non_heap_committed_mb: total_swap / MB,
            memory_pools: vec![
                MemoryPool {
                    name: "Physical memory".to_string(),
                    kind: PoolKind::Heap,
                    usage_percent: percent(used_memory, total_memory),
                },
                MemoryPool {
                    name: "Swap".to_string(),
                    kind: PoolKind::NonHeap,
                    usage_percent: percent(used_swap, total_swap),
                },
            ],
            // sysinfo reports per-core percentages summed over cores
            process_cpu_load_percent: (process.cpu_usage() / processors as f32).min(100.0),
            system_cpu_load_percent: self.sys.global_cpu_usage(),
            active_thread_count,
            available_processors: processors,
            threads,
            ..Snapshot::default()
        })
    }

    fn threads_of(&self, process: &Process) -> Vec<ThreadRecord> {
        let Some(tasks) = process.tasks() else {
            return Vec::new();
        };
        let mut threads: Vec<ThreadRecord> = tasks
            .iter()
            .map(|tid| match self.sys.process(*tid) {
                Some(task) => ThreadRecord {
                    id: tid.as_u32() as u64,
                    name: task.name().to_string_lossy().to_string(),
                    state: thread_state(task.status()).to_string(),
                    cpu_time_ms: task.accumulated_cpu_time(),
                },
                None => ThreadRecord {
                    id: tid.as_u32() as u64,
                    name: format!("thread-{}", tid.as_u32()),
                    state: "UNKNOWN".to_string(),
                    cpu_time_ms: 0,
                },
            })
            .collect();
        threads.sort_by(|a, b| b.cpu_time_ms.cmp(&a.cpu_time_ms).then(a.id.cmp(&b.id)));
        threads
    }
}

fn percent(part: f32, whole: f32) -> f32 {
    if whole > 0.0 {
        (part / whole * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Map an OS scheduler state onto the thread-state vocabulary the views use.
pub fn thread_state(status: ProcessStatus) -> &'static str {
    match status {
        ProcessStatus::Run | ProcessStatus::Waking => "RUNNABLE",
        ProcessStatus::Sleep => "TIMED_WAITING",
        ProcessStatus::Idle | ProcessStatus::Parked | ProcessStatus::Stop => "WAITING",
        ProcessStatus::UninterruptibleDiskSleep | ProcessStatus::LockBlocked => "BLOCKED",
        ProcessStatus::Zombie | ProcessStatus::Dead => "TERMINATED",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_guards_empty_totals() {
        assert_eq!(percent(10.0, 0.0), 0.0);
        assert_eq!(percent(50.0, 200.0), 25.0);
        assert_eq!(percent(300.0, 200.0), 100.0);
    }

    #[test]
    fn scheduler_states_map_to_thread_states() {
        assert_eq!(thread_state(ProcessStatus::Run), "RUNNABLE");
        assert_eq!(thread_state(ProcessStatus::Sleep), "TIMED_WAITING");
        assert_eq!(thread_state(ProcessStatus::UninterruptibleDiskSleep), "BLOCKED");
        assert_eq!(thread_state(ProcessStatus::Zombie), "TERMINATED");
        assert_eq!(thread_state(ProcessStatus::Unknown(99)), "UNKNOWN");
    }

    #[test]
    fn samples_the_current_process() {
        let mut collector = Collector::for_current_process().expect("current pid");
        let snapshot = collector.refresh().expect("own process is alive");
        assert!(snapshot.timestamp_ms > 0);
        assert!(snapshot.heap_used_mb > 0.0);
        assert!(snapshot.available_processors >= 1);
        assert!(snapshot.active_thread_count >= 1);
        assert!(snapshot.gc_collectors.is_empty());
    }
}
