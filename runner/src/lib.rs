//! Drives the YCSB launcher through a load and a run phase and keeps the logs of both.

pub mod benchmark;
pub mod cli;
pub mod config;
pub mod executors;
pub mod invocation;

pub use benchmark::{run_benchmark, run_benchmark_at, PhaseReport, RunReport, RunnerError};
pub use executors::{Executor, ExecutorError, PhaseStatus, YcsbExecutor};
pub use invocation::{BenchmarkInvocation, PhaseRequest};
