use std::time::{Duration, Instant};

use sysinfo::{ProcessExt, System, SystemExt};
use tracing::debug;

/// Resident memory of the current process in KB, or 0 if it can't be read.
pub fn get_rss_memory() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };
    let mut system = System::new();
    if !system.refresh_process(pid) {
        return 0;
    }
    system
        .process(pid)
        .map(|process| process.memory() / 1024)
        .unwrap_or(0)
}

/// Measures wall time and RSS growth of one step.
pub struct Profiler {
    start: Instant,
    initial_memory: u64,
}

impl Profiler {
    pub fn start() -> Self {
        Profiler {
            start: Instant::now(),
            initial_memory: get_rss_memory(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn report(&self, step: &str) {
        let final_memory = get_rss_memory();
        debug!(
            step,
            elapsed = ?self.elapsed(),
            memory_kb = final_memory.saturating_sub(self.initial_memory),
            "Step finished"
        );
    }
}
