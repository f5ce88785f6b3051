mod ycsb;

pub use ycsb::YcsbExecutor;

use crate::invocation::PhaseRequest;
use std::fs::File;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("Failed to wait for child process: {0}")]
    Wait(std::io::Error),
    #[error("Failed to share the log file between stdout and stderr: {0}")]
    LogHandle(std::io::Error),
}

/// How a single phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStatus {
    /// None if the child was killed by a signal or never started
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl PhaseStatus {
    pub fn exited(exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            exit_code: None,
            timed_out: true,
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// The benchmark tool as seen by the runner
///
/// Implementations execute exactly one phase and write the combined output of the tool into
/// `log`. They must not retry.
pub trait Executor {
    fn run(&mut self, request: &PhaseRequest<'_>, log: File) -> Result<PhaseStatus, ExecutorError>;
}
