//! Run Ansible playbooks and Galaxy installs in disposable Docker containers.
//!
//! The project directory is mounted read-write at a fixed workdir inside the
//! container, an optional SSH private key is staged to `~/.ssh` with mode 600,
//! and container output is streamed back to the caller while being captured
//! for the final run report.

pub mod config;
pub mod docker;
pub mod playbook;
pub mod recap;
pub mod runner;
pub mod scaffold;
