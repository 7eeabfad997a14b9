use std::io::BufRead;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use super::types::{CancelToken, DockerInvocation, RunOutcome, StreamEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Spawn a container and return a channel that streams its output.
///
/// The caller receives [`StreamEvent::Stdout`]/[`Stderr`] lines as they
/// arrive, followed by exactly one [`StreamEvent::Done`] carrying the final
/// outcome and the full transcript.
pub fn spawn(invocation: DockerInvocation, cancel: CancelToken) -> Result<Receiver<StreamEvent>> {
    let mut child = Command::new("docker")
        .args(&invocation.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to spawn docker process")?;

    let stdout = child.stdout.take().expect("stdout was piped");
    let stderr = child.stderr.take().expect("stderr was piped");

    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        supervise(child, stdout, stderr, tx, cancel, invocation.timeout);
    });

    Ok(rx)
}

/// Run an invocation with the terminal attached (used by `ansidock shell`).
/// Blocks until the container exits; no timeout is enforced.
pub fn run_interactive(invocation: &DockerInvocation) -> Result<Option<i32>> {
    let status = Command::new("docker")
        .args(&invocation.args)
        .status()
        .context("failed to spawn docker process")?;
    Ok(status.code())
}

fn supervise(
    mut child: std::process::Child,
    stdout: std::process::ChildStdout,
    stderr: std::process::ChildStderr,
    tx: Sender<StreamEvent>,
    cancel: CancelToken,
    timeout: Duration,
) {
    // Accumulates the full transcript for the final outcome.
    let transcript = std::sync::Arc::new(std::sync::Mutex::new(String::new()));

    // --- reader threads ---------------------------------------------------
    let tx_out = tx.clone();
    let buf_out = transcript.clone();
    let stdout_handle = std::thread::spawn(move || {
        let reader = std::io::BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(l) => {
                    if let Ok(mut buf) = buf_out.lock() {
                        buf.push_str(&l);
                        buf.push('\n');
                    }
                    // Receiver may be dropped; ignore send errors.
                    let _ = tx_out.send(StreamEvent::Stdout(l));
                }
                Err(_) => break,
            }
        }
    });

    let tx_err = tx.clone();
    let buf_err = transcript.clone();
    let stderr_handle = std::thread::spawn(move || {
        let reader = std::io::BufReader::new(stderr);
        for line in reader.lines() {
            match line {
                Ok(l) => {
                    if let Ok(mut buf) = buf_err.lock() {
                        buf.push_str(&l);
                        buf.push('\n');
                    }
                    let _ = tx_err.send(StreamEvent::Stderr(l));
                }
                Err(_) => break,
            }
        }
    });

    // --- poll loop ---------------------------------------------------------
    let start = Instant::now();
    let mut cancelled = false;
    let mut timed_out = false;

    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {}
            Err(_) => break None,
        }

        if cancel.is_cancelled() {
            cancelled = true;
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }

        if start.elapsed() > timeout {
            timed_out = true;
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }

        std::thread::sleep(POLL_INTERVAL);
    };

    // --- finalize ----------------------------------------------------------
    let _ = stdout_handle.join();
    let _ = stderr_handle.join();

    let exit_code = exit_status.and_then(|s| s.code());
    let transcript = transcript.lock().map(|b| b.clone()).unwrap_or_default();

    let _ = tx.send(StreamEvent::Done(RunOutcome {
        exit_code,
        transcript,
        cancelled,
        timed_out,
    }));
}
