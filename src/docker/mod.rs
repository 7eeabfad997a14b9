// Docker plumbing: spawning containers, streaming output, cancellation.

pub mod engine;
pub mod run;
pub mod types;

pub use engine::ensure_available;
pub use run::{run_interactive, spawn};
pub use types::{CancelToken, DockerInvocation, RunOutcome, StreamEvent};
