#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Tab {
    #[default]
    Overview,
    Memory,
    Cpu,
    Timings,
    Resources,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Memory,
        Tab::Cpu,
        Tab::Timings,
        Tab::Resources,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Memory => "Heap & Pools",
            Tab::Cpu => "CPU & Threads",
            Tab::Timings => "GC Timings",
            Tab::Resources => "Resources",
        }
    }

    /// Placeholder shown until the first snapshot arrives.
    pub fn waiting_message(self) -> &'static str {
        match self {
            Tab::Overview => "Waiting for metrics...",
            Tab::Memory => "Waiting for memory metrics...",
            Tab::Cpu => "Waiting for CPU metrics...",
            Tab::Timings => "Waiting for GC metrics...",
            Tab::Resources => "Waiting for resource metrics...",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(Tab::Overview.next(), Tab::Memory);
        assert_eq!(Tab::Resources.next(), Tab::Overview);
        assert_eq!(Tab::Overview.prev(), Tab::Resources);
        assert_eq!(Tab::Cpu.prev(), Tab::Memory);
    }

    #[test]
    fn index_round_trips_through_all() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_index(tab.index()), Some(tab));
        }
        assert_eq!(Tab::from_index(5), None);
        assert!(Tab::Overview < Tab::Resources);
    }
}
