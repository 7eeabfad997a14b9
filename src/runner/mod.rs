// Playbook runs: ansible command assembly and container orchestration.

pub mod commands;
pub mod orchestrator;
mod types;

pub use commands::{
    CONTAINER_WORK_DIR, DEFAULT_REQUIREMENTS, SSH_KEY_DEST, SSH_KEY_MOUNT, docker_run_args,
    galaxy_args, install_invocation, key_staging_steps, playbook_args, playbook_invocation,
    shell_invocation,
};
pub use orchestrator::{run_install, run_playbook};
pub use types::{
    InstallInput, Phase, PhaseResult, Phases, PlaybookRequest, RunEvent, RunInput, RunReport,
    Summary,
};
