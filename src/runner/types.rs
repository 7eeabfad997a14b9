use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::recap::HostRecap;

/// One playbook to execute, plus its optional trimmings.
///
/// Paths are relative to the project directory, which is what the container
/// sees as its workdir.
#[derive(Debug, Clone, Default)]
pub struct PlaybookRequest {
    pub playbook: String,
    /// Inventory path. `None` (or empty) means ansible's own default.
    pub inventory: Option<String>,
    /// `key=value` pairs, passed through in order, one flag per entry.
    pub extra_vars: Vec<String>,
    /// Task tags to run. An empty list behaves exactly like no list.
    pub tags: Vec<String>,
    /// Host path of an SSH private key to stage into the container.
    pub ssh_key: Option<PathBuf>,
    /// Galaxy requirements manifest to install before the run.
    pub requirements: Option<String>,
}

/// Input to an orchestrated playbook run.
pub struct RunInput {
    pub config: Config,
    pub request: PlaybookRequest,
    /// Absolute host path mounted into the container.
    pub project_dir: PathBuf,
}

/// Input to a standalone Galaxy install.
pub struct InstallInput {
    pub config: Config,
    pub requirements: String,
    pub project_dir: PathBuf,
}

/// Identifies which kind of container run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    GalaxyInstall,
    Playbook,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GalaxyInstall => "galaxy-install",
            Self::Playbook => "playbook",
        }
    }
}

/// Events emitted by the run orchestrator. The final event is always either
/// `Completed` or `Aborted`.
#[derive(Debug)]
pub enum RunEvent {
    PhaseStarted(Phase),
    Log { phase: Phase, line: String },
    PhaseFinished { phase: Phase, success: bool },
    Completed(RunReport),
    Aborted(String),
}

/// Serializable record of a finished run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// The playbook path, or the requirements manifest for a bare install.
    pub target: String,
    pub phases: Phases,
    /// Per-host counters parsed from the `PLAY RECAP` block, if any.
    pub recap: Vec<HostRecap>,
    pub summary: Summary,
}

impl RunReport {
    /// True when every phase passed and no recap host failed.
    pub fn passed(&self) -> bool {
        self.summary.failed == 0 && self.recap.iter().all(HostRecap::passed)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Phases {
    pub install: Option<PhaseResult>,
    pub playbook: Option<PhaseResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseResult {
    pub status: String,
    /// The captured container transcript for this phase.
    pub log: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_with_no_phases_passes_vacuously() {
        let report = RunReport::default();
        assert!(report.passed());
    }

    #[test]
    fn report_with_failed_phase_does_not_pass() {
        let report = RunReport {
            target: "playbooks/site.yml".into(),
            summary: Summary {
                total: 1,
                passed: 0,
                failed: 1,
            },
            ..Default::default()
        };
        assert!(!report.passed());
    }

    #[test]
    fn report_with_unreachable_host_does_not_pass() {
        let report = RunReport {
            target: "playbooks/site.yml".into(),
            recap: vec![HostRecap {
                host: "web1".into(),
                ok: 3,
                unreachable: 1,
                ..Default::default()
            }],
            summary: Summary {
                total: 1,
                passed: 1,
                failed: 0,
            },
            ..Default::default()
        };
        assert!(!report.passed());
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(Phase::GalaxyInstall.as_str(), "galaxy-install");
        assert_eq!(Phase::Playbook.as_str(), "playbook");
    }
}
