use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Cooperative cancellation token backed by an `AtomicBool`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A fully assembled `docker` invocation: everything after the binary name.
/// The runner layer is responsible for building the argument list.
#[derive(Debug, Clone)]
pub struct DockerInvocation {
    pub args: Vec<String>,
    pub timeout: Duration,
}

/// Final outcome of a container run.
///
/// A failed run is an outcome, not an error; `Err` is reserved for failing
/// to launch the docker process at all.
#[derive(Debug)]
pub struct RunOutcome {
    pub exit_code: Option<i32>,
    /// Everything the container wrote, stdout and stderr interleaved
    /// line by line in arrival order.
    pub transcript: String,
    pub cancelled: bool,
    pub timed_out: bool,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.cancelled && !self.timed_out
    }
}

/// Streamed output from a running container. The stream always ends with
/// exactly one `Done`.
#[derive(Debug)]
pub enum StreamEvent {
    Stdout(String),
    Stderr(String),
    Done(RunOutcome),
}
