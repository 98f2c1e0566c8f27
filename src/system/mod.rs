pub mod collector;
pub mod export_file;
pub mod history;
pub mod local;
pub mod memory;
pub mod provider;
pub mod settings;
pub mod snapshot;

use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
