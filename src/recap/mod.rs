/// Ansible output parsing: `PLAY RECAP` counters and failed-task extraction.
mod parse;

pub use parse::{parse_failures, parse_recap};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-host counters from a `PLAY RECAP` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecap {
    pub host: String,
    pub ok: u32,
    pub changed: u32,
    pub unreachable: u32,
    pub failed: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
}

impl HostRecap {
    /// A host passed when nothing failed and it stayed reachable.
    pub fn passed(&self) -> bool {
        self.failed == 0 && self.unreachable == 0
    }
}

impl fmt::Display for HostRecap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ok={} changed={} unreachable={} failed={} skipped={}",
            self.host, self.ok, self.changed, self.unreachable, self.failed, self.skipped
        )
    }
}

/// A task ansible reported as fatal or failed, with the task header it ran
/// under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub task: String,
    pub host: String,
    pub detail: String,
}
