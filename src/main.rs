use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::Receiver;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use ansidock::config::{self, Config};
use ansidock::docker::{self, CancelToken};
use ansidock::playbook;
use ansidock::recap;
use ansidock::runner::{
    self, InstallInput, PlaybookRequest, RunEvent, RunInput, RunReport, run_install, run_playbook,
};
use ansidock::scaffold;

#[derive(Parser)]
#[command(
    name = "ansidock",
    version,
    about = "Run Ansible playbooks in disposable Docker containers"
)]
struct Cli {
    /// Project directory mounted into the container.
    #[arg(short = 'd', long = "dir", global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a playbook inside a container.
    Run {
        /// Playbook path, relative to the project directory. Falls back to
        /// the config default, then to discovery.
        playbook: Option<String>,

        /// Inventory path, passed through as `-i`.
        #[arg(short, long)]
        inventory: Option<String>,

        /// Extra variable in key=value form. Repeatable; order is preserved.
        #[arg(short = 'e', long = "extra-var", value_name = "KEY=VALUE")]
        extra_vars: Vec<String>,

        /// Only run tasks carrying this tag. Repeatable.
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// SSH private key to stage into the container at mode 600.
        #[arg(long, value_name = "PATH")]
        ssh_key: Option<PathBuf>,

        /// Install Galaxy collections from this manifest before the run.
        /// Bare `-r` uses requirements.yml.
        #[arg(
            short = 'r',
            long,
            value_name = "FILE",
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = runner::DEFAULT_REQUIREMENTS
        )]
        requirements: Option<String>,

        /// Write the JSON run report to this path.
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        /// Container timeout in seconds (overrides config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Install Galaxy collections from a requirements manifest.
    GalaxyInstall {
        /// Requirements manifest, relative to the project directory.
        #[arg(short, long, default_value = runner::DEFAULT_REQUIREMENTS)]
        requirements: String,
    },

    /// List playbooks discovered under the project directory.
    List,

    /// Open an interactive container for debugging.
    Shell {
        /// SSH private key to stage into the container at mode 600.
        #[arg(long, value_name = "PATH")]
        ssh_key: Option<PathBuf>,
    },

    /// Write a starter project (playbook, inventory, config) into the directory.
    Init,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Command::Init = cli.command {
        return cmd_init(&cli.dir);
    }

    let dir = cli
        .dir
        .canonicalize()
        .with_context(|| format!("project directory not found: {}", cli.dir.display()))?;
    let cfg = config::load(&dir)?;

    match cli.command {
        Command::Run {
            playbook,
            inventory,
            extra_vars,
            tags,
            ssh_key,
            requirements,
            report,
            timeout,
        } => cmd_run(
            dir, cfg, playbook, inventory, extra_vars, tags, ssh_key, requirements, report, timeout,
        ),
        Command::GalaxyInstall { requirements } => cmd_galaxy_install(dir, cfg, requirements),
        Command::List => cmd_list(&dir, &cfg),
        Command::Shell { ssh_key } => cmd_shell(&dir, &cfg, ssh_key),
        Command::Init => unreachable!("handled above"),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    dir: PathBuf,
    mut cfg: Config,
    playbook_arg: Option<String>,
    inventory: Option<String>,
    extra_vars: Vec<String>,
    tags: Vec<String>,
    ssh_key: Option<PathBuf>,
    requirements: Option<String>,
    report_path: Option<PathBuf>,
    timeout: Option<u64>,
) -> Result<ExitCode> {
    if let Some(secs) = timeout {
        cfg.docker_timeout = secs;
    }

    let playbook_path = resolve_playbook(&dir, &cfg, playbook_arg)?;
    let ssh_key = match ssh_key {
        Some(path) => Some(
            path.canonicalize()
                .with_context(|| format!("SSH key not found: {}", path.display()))?,
        ),
        None => None,
    };

    let request = PlaybookRequest {
        playbook: playbook_path,
        inventory: inventory.or_else(|| cfg.inventory.clone()),
        extra_vars,
        tags,
        ssh_key,
        requirements,
    };

    docker::ensure_available()?;

    let input = RunInput {
        config: cfg,
        request,
        project_dir: dir,
    };
    let report = drain_events(run_playbook(input, CancelToken::new()))?;
    finish(&report, report_path.as_deref())
}

fn cmd_galaxy_install(dir: PathBuf, cfg: Config, requirements: String) -> Result<ExitCode> {
    // The manifest is not validated here; a missing or broken file surfaces
    // as a failed container run, the same way ansible-galaxy reports it.
    docker::ensure_available()?;

    let input = InstallInput {
        config: cfg,
        requirements,
        project_dir: dir,
    };
    let report = drain_events(run_install(input, CancelToken::new()))?;
    finish(&report, None)
}

fn cmd_list(dir: &Path, cfg: &Config) -> Result<ExitCode> {
    let playbooks = playbook::discover_playbooks(dir, cfg.search_depth)?;
    if playbooks.is_empty() {
        eprintln!("no playbooks found under {}", dir.display());
        return Ok(ExitCode::FAILURE);
    }
    for path in playbooks {
        println!("{path}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_shell(dir: &Path, cfg: &Config, ssh_key: Option<PathBuf>) -> Result<ExitCode> {
    let ssh_key = match ssh_key {
        Some(path) => Some(
            path.canonicalize()
                .with_context(|| format!("SSH key not found: {}", path.display()))?,
        ),
        None => None,
    };

    docker::ensure_available()?;

    let invocation = runner::shell_invocation(cfg, dir, ssh_key.as_deref());
    let code = docker::run_interactive(&invocation)?;
    Ok(match code {
        Some(0) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn cmd_init(dir: &Path) -> Result<ExitCode> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let written = scaffold::write_scaffold(dir)?;
    for path in written {
        println!("wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Resolve which playbook to run: explicit argument, config default, or
/// discovery.
fn resolve_playbook(dir: &Path, cfg: &Config, arg: Option<String>) -> Result<String> {
    if let Some(playbook) = arg.or_else(|| cfg.playbook.clone()) {
        let relative = playbook::normalize_playbook_path(dir, &playbook)?;
        return Ok(relative.to_string_lossy().to_string());
    }

    let discovered = playbook::discover_playbooks(dir, cfg.search_depth)?;
    match discovered.into_iter().next() {
        Some(first) => Ok(first),
        None => bail!(
            "no playbook given and none discovered under {} (try `ansidock list`)",
            dir.display()
        ),
    }
}

/// Print streamed container output as it arrives and wait for the report.
fn drain_events(rx: Receiver<RunEvent>) -> Result<RunReport> {
    for event in rx {
        match event {
            RunEvent::PhaseStarted(phase) => eprintln!("--- {} ---", phase.as_str()),
            RunEvent::Log { line, .. } => println!("{line}"),
            RunEvent::PhaseFinished { .. } => {}
            RunEvent::Completed(report) => return Ok(report),
            RunEvent::Aborted(reason) => bail!("run aborted: {reason}"),
        }
    }
    bail!("run ended without a result")
}

/// Print the recap summary, optionally write the JSON report, and map the
/// outcome to a process exit code.
fn finish(report: &RunReport, report_path: Option<&Path>) -> Result<ExitCode> {
    for host in &report.recap {
        eprintln!("{host}");
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    if report.passed() {
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(phase) = report.phases.playbook.as_ref() {
        for failure in recap::parse_failures(&phase.log) {
            eprintln!("failed task [{}] on {}: {}", failure.task, failure.host, failure.detail);
        }
    }
    Ok(ExitCode::FAILURE)
}
