use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::docker::DockerInvocation;

use super::types::PlaybookRequest;

/// Where the project directory is mounted inside the container.
pub const CONTAINER_WORK_DIR: &str = "/work";
/// Where a read-only SSH key mount lands inside the container.
pub const SSH_KEY_MOUNT: &str = "/run/secrets/ansible_ssh_key";
/// Where ansible expects the staged key.
pub const SSH_KEY_DEST: &str = "/root/.ssh/ansible_id_ecdsa";
/// Default Galaxy requirements manifest name.
pub const DEFAULT_REQUIREMENTS: &str = "requirements.yml";

/// Build the `ansible-playbook` argument list for a request.
///
/// An absent or empty inventory emits no `-i`; an empty tag list emits no
/// `--tags`; extra-vars keep their input order, one flag per entry; the
/// playbook path is always last.
pub fn playbook_args(request: &PlaybookRequest) -> Vec<String> {
    let mut args = vec!["ansible-playbook".to_string()];

    if let Some(inventory) = request.inventory.as_deref()
        && !inventory.is_empty()
    {
        args.push("-i".into());
        args.push(inventory.into());
    }

    for var in &request.extra_vars {
        args.push("--extra-vars".into());
        args.push(var.clone());
    }

    if !request.tags.is_empty() {
        args.push("--tags".into());
        args.push(request.tags.join(","));
    }

    args.push(request.playbook.clone());
    args
}

/// Build the `ansible-galaxy` argument list for a requirements manifest.
pub fn galaxy_args(requirements: &str) -> Vec<String> {
    vec![
        "ansible-galaxy".into(),
        "collection".into(),
        "install".into(),
        "-r".into(),
        requirements.into(),
    ]
}

/// Steps that stage a mounted key where ansible looks for it.
///
/// The secret mount is read-only, so the key has to be copied out before it
/// can be re-permissioned to 600.
pub fn key_staging_steps() -> Vec<Vec<String>> {
    let step = |argv: &[&str]| argv.iter().map(|s| (*s).to_string()).collect();
    vec![
        step(&["mkdir", "-p", "/root/.ssh"]),
        step(&["cp", SSH_KEY_MOUNT, SSH_KEY_DEST]),
        step(&["chmod", "600", SSH_KEY_DEST]),
    ]
}

/// Assemble a `docker run` invocation executing `steps` inside the container.
///
/// A single step execs its argv directly. Several steps are shell-quoted and
/// chained with `&&` under `sh -c`, so the whole sequence still runs as one
/// container process and the first failing step aborts the rest.
pub fn docker_run_args(
    cfg: &Config,
    project_dir: &Path,
    ssh_key: Option<&Path>,
    steps: &[Vec<String>],
) -> DockerInvocation {
    let mut args = base_run_args(cfg, project_dir, ssh_key, false);

    match steps {
        [single] => args.extend(single.iter().cloned()),
        many => {
            args.push("sh".into());
            args.push("-c".into());
            args.push(join_steps(many));
        }
    }

    DockerInvocation {
        args,
        timeout: Duration::from_secs(cfg.docker_timeout),
    }
}

/// Full container invocation for a playbook run: optional Galaxy install,
/// optional key staging, then `ansible-playbook`.
///
/// The install step runs in the same container as the playbook so the
/// collections it fetches are still present when the playbook starts.
pub fn playbook_invocation(
    cfg: &Config,
    project_dir: &Path,
    request: &PlaybookRequest,
) -> DockerInvocation {
    let mut steps = Vec::new();
    if let Some(requirements) = request.requirements.as_deref() {
        steps.push(galaxy_args(requirements));
    }
    if request.ssh_key.is_some() {
        steps.extend(key_staging_steps());
    }
    steps.push(playbook_args(request));

    docker_run_args(cfg, project_dir, request.ssh_key.as_deref(), &steps)
}

/// Container invocation for a standalone Galaxy install.
pub fn install_invocation(cfg: &Config, project_dir: &Path, requirements: &str) -> DockerInvocation {
    docker_run_args(cfg, project_dir, None, &[galaxy_args(requirements)])
}

/// Interactive debug container with the same mounts and key staging as a
/// playbook run, dropping into `sh`.
pub fn shell_invocation(cfg: &Config, project_dir: &Path, ssh_key: Option<&Path>) -> DockerInvocation {
    let mut args = base_run_args(cfg, project_dir, ssh_key, true);

    if ssh_key.is_some() {
        let mut steps = key_staging_steps();
        steps.push(vec!["exec".into(), "sh".into()]);
        args.push("sh".into());
        args.push("-c".into());
        args.push(join_steps(&steps));
    } else {
        args.push("sh".into());
    }

    DockerInvocation {
        args,
        timeout: Duration::from_secs(cfg.docker_timeout),
    }
}

/// Shared `docker run` prefix: ephemeral container, project mount, fixed
/// workdir, optional read-only key mount, then the image.
fn base_run_args(
    cfg: &Config,
    project_dir: &Path,
    ssh_key: Option<&Path>,
    interactive: bool,
) -> Vec<String> {
    let mut args = vec!["run".to_string(), "--rm".to_string()];
    if interactive {
        args.push("-it".into());
    }
    args.push("-v".into());
    args.push(format!("{}:{}", project_dir.display(), CONTAINER_WORK_DIR));
    args.push("-w".into());
    args.push(CONTAINER_WORK_DIR.to_string());
    if let Some(key) = ssh_key {
        args.push("-v".into());
        args.push(format!("{}:{}:ro", key.display(), SSH_KEY_MOUNT));
    }
    args.push(cfg.image.clone());
    args
}

fn join_steps(steps: &[Vec<String>]) -> String {
    steps
        .iter()
        .map(|argv| shell_words::join(argv))
        .collect::<Vec<_>>()
        .join(" && ")
}
