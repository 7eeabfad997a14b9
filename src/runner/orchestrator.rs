use std::sync::mpsc::{self, Receiver, Sender};

use crate::docker::{self, CancelToken, DockerInvocation, StreamEvent};
use crate::recap;

use super::commands::{install_invocation, playbook_invocation};
use super::types::{
    InstallInput, Phase, PhaseResult, Phases, RunEvent, RunInput, RunReport, Summary,
};

/// Launch a playbook run on a background thread.
///
/// Returns a receiver that streams [`RunEvent`] values. The final event is
/// always either `Completed` or `Aborted`.
pub fn run_playbook(input: RunInput, cancel: CancelToken) -> Receiver<RunEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let invocation = playbook_invocation(&input.config, &input.project_dir, &input.request);
        let target = input.request.playbook.clone();
        run_single_phase(invocation, Phase::Playbook, target, cancel, tx);
    });
    rx
}

/// Launch a standalone Galaxy install on a background thread.
pub fn run_install(input: InstallInput, cancel: CancelToken) -> Receiver<RunEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let invocation = install_invocation(&input.config, &input.project_dir, &input.requirements);
        run_single_phase(invocation, Phase::GalaxyInstall, input.requirements, cancel, tx);
    });
    rx
}

fn run_single_phase(
    invocation: DockerInvocation,
    phase: Phase,
    target: String,
    cancel: CancelToken,
    tx: Sender<RunEvent>,
) {
    let _ = tx.send(RunEvent::PhaseStarted(phase.clone()));

    let outcome = run_container(invocation, &cancel, &phase, &tx);
    let success = outcome.success;

    let _ = tx.send(RunEvent::PhaseFinished {
        phase: phase.clone(),
        success,
    });

    if cancel.is_cancelled() {
        let _ = tx.send(RunEvent::Aborted("Cancelled by user".into()));
        return;
    }

    let result = PhaseResult {
        status: if success { "pass" } else { "fail" }.to_string(),
        log: outcome.log,
    };

    let phases = match phase {
        Phase::Playbook => Phases {
            install: None,
            playbook: Some(result.clone()),
        },
        Phase::GalaxyInstall => Phases {
            install: Some(result.clone()),
            playbook: None,
        },
    };

    // The recap block only shows up in playbook output; parsing install
    // logs just yields nothing.
    let recap = recap::parse_recap(&result.log);

    let report = RunReport {
        target,
        phases,
        recap,
        summary: Summary {
            total: 1,
            passed: usize::from(success),
            failed: usize::from(!success),
        },
    };

    let _ = tx.send(RunEvent::Completed(report));
}

struct ContainerOutcome {
    success: bool,
    log: String,
}

/// Run a single container, draining its output channel and forwarding
/// lines as `RunEvent::Log`.
fn run_container(
    invocation: DockerInvocation,
    cancel: &CancelToken,
    phase: &Phase,
    tx: &Sender<RunEvent>,
) -> ContainerOutcome {
    let container_rx = match docker::spawn(invocation, cancel.clone()) {
        Ok(rx) => rx,
        Err(e) => {
            return ContainerOutcome {
                success: false,
                log: format!("Failed to spawn container: {e}"),
            };
        }
    };

    let mut log = String::new();
    let mut success = false;

    for event in container_rx {
        match event {
            StreamEvent::Stdout(s) | StreamEvent::Stderr(s) => {
                let _ = tx.send(RunEvent::Log {
                    phase: phase.clone(),
                    line: s.clone(),
                });
                log.push_str(&s);
                log.push('\n');
            }
            StreamEvent::Done(outcome) => {
                success = outcome.success();
                // Prefer the container's accumulated transcript if our
                // line-by-line accumulation missed anything.
                if log.is_empty() {
                    log = outcome.transcript;
                }
                break;
            }
        }
    }

    ContainerOutcome { success, log }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_assembly_for_a_passing_playbook() {
        let report = RunReport {
            target: "playbooks/simple.yml".into(),
            phases: Phases {
                install: None,
                playbook: Some(PhaseResult {
                    status: "pass".into(),
                    log: "PLAY RECAP\nlocalhost : ok=1 changed=0 unreachable=0 failed=0".into(),
                }),
            },
            recap: recap::parse_recap(
                "PLAY RECAP *****\nlocalhost : ok=1 changed=0 unreachable=0 failed=0\n",
            ),
            summary: Summary {
                total: 1,
                passed: 1,
                failed: 0,
            },
        };
        assert!(report.passed());
        assert_eq!(report.recap.len(), 1);
        assert_eq!(report.recap[0].host, "localhost");
    }

    #[test]
    fn install_phase_lands_in_the_install_slot() {
        let phases = Phases {
            install: Some(PhaseResult {
                status: "pass".into(),
                log: String::new(),
            }),
            playbook: None,
        };
        assert!(phases.install.is_some());
        assert!(phases.playbook.is_none());
    }

    #[test]
    fn summary_counts_are_consistent() {
        let summary = Summary {
            total: 1,
            passed: 0,
            failed: 1,
        };
        assert_eq!(summary.passed + summary.failed, summary.total);
    }
}
