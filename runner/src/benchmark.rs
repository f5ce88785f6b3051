use crate::{
    config::{check_executable, ConfigErrors},
    executors::{Executor, PhaseStatus},
    invocation::{absolute, BenchmarkInvocation, PhaseRequest},
};
use chrono::Local;
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{error, info, warn};
use ycsb_ingest::{format_timestamp, log_file_name, Phase, RunMetadata};

/// number of trailing log lines echoed when a phase fails
const FAILURE_TAIL: usize = 20;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("YCSB binary not found at {}. Please build YCSB first.", .0.display())]
    MissingBinary(PathBuf),
    #[error("YCSB binary at {} is not executable", .0.display())]
    NotExecutable(PathBuf),
    #[error("Failed to inspect YCSB binary: {0}")]
    Inspect(#[from] ConfigErrors),
    #[error("Failed to create {path:?}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to resolve path: {0}")]
    Resolve(std::io::Error),
}

/// Outcome of one phase
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub phase: Phase,
    pub log_path: PathBuf,
    pub command: String,
    pub status: PhaseStatus,
    pub duration: Duration,
}

impl PhaseReport {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub load: PhaseReport,
    pub run: PhaseReport,
}

impl RunReport {
    /// true only if both phases succeeded
    pub fn success(&self) -> bool {
        self.load.success() && self.run.success()
    }
}

pub fn run_benchmark<E: Executor>(
    invocation: &BenchmarkInvocation,
    executor: &mut E,
) -> Result<RunReport, RunnerError> {
    run_benchmark_at(invocation, executor, &format_timestamp(&Local::now()))
}

/// Execute the load and then the run phase, both logs share `timestamp`
///
/// A failing phase is reported but never keeps the other phase from running, the caller decides
/// what a failure means through [`RunReport::success`].
pub fn run_benchmark_at<E: Executor>(
    invocation: &BenchmarkInvocation,
    executor: &mut E,
    timestamp: &str,
) -> Result<RunReport, RunnerError> {
    let binary = invocation.binary_path();

    match check_executable(&binary) {
        Ok(true) => {}
        Ok(false) => return Err(RunnerError::NotExecutable(binary)),
        Err(ConfigErrors::FileNotFound(_)) => return Err(RunnerError::MissingBinary(binary)),
        Err(e) => return Err(e.into()),
    }

    // YCSB is handed absolute paths so its working directory does not matter
    let binary = absolute(&binary).map_err(RunnerError::Resolve)?;
    let workload = absolute(&invocation.workload).map_err(RunnerError::Resolve)?;

    fs::create_dir_all(&invocation.output_dir).map_err(|source| RunnerError::Create {
        path: invocation.output_dir.clone(),
        source,
    })?;

    let workload_name = invocation.workload_name();
    let mut execute = |phase: Phase| {
        info!(
            "Starting {} phase for {} with {workload_name}...",
            phase.as_str().to_uppercase(),
            invocation.binding
        );

        let request = PhaseRequest {
            binary: &binary,
            phase,
            binding: invocation.binding,
            workload: &workload,
            threads: invocation.threads,
            properties: &invocation.properties,
            timeout: invocation.timeout,
        };
        let log_path = invocation.output_dir.join(log_file_name(
            invocation.binding,
            &workload_name,
            phase,
            timestamp,
        ));

        execute_phase(&mut *executor, &request, log_path, &workload_name, timestamp)
    };

    let load = execute(Phase::Load);
    let run = execute(Phase::Run);

    info!(
        "Benchmark completed in {:.2} seconds.",
        run.duration.as_secs_f64()
    );
    info!("Results saved to {}", invocation.output_dir.display());

    Ok(RunReport { load, run })
}

fn execute_phase<E: Executor>(
    executor: &mut E,
    request: &PhaseRequest<'_>,
    log_path: PathBuf,
    workload_name: &str,
    timestamp: &str,
) -> PhaseReport {
    let command = request.command_line();
    info!("Executing: {command}");

    let log = match File::create(&log_path) {
        Ok(log) => log,
        Err(e) => {
            error!("Failed to create log {}: {e}", log_path.display());
            error!("Skipping {} phase: {command}", request.phase);
            return PhaseReport {
                phase: request.phase,
                log_path,
                command,
                status: PhaseStatus::exited(None),
                duration: Duration::ZERO,
            };
        }
    };

    let start = Instant::now();
    let status = match executor.run(request, log) {
        Ok(status) => status,
        Err(e) => {
            error!("{e}");
            PhaseStatus::exited(None)
        }
    };
    let duration = start.elapsed();

    if !status.success() {
        if status.timed_out {
            error!("Timed out executing command: {command}");
        } else {
            error!("Error executing command: {command}");
        }
        error!(
            "Output of the failed {} phase is in {}",
            request.phase,
            log_path.display()
        );
        for line in tail(&log_path, FAILURE_TAIL) {
            error!("| {line}");
        }
    }

    let metadata = RunMetadata {
        database: request.binding.to_string(),
        workload: workload_name.to_string(),
        phase: request.phase,
        timestamp: timestamp.to_string(),
        threads: request.threads,
        properties: request.properties.join(" "),
        command: command.clone(),
        exit_code: status.exit_code,
        duration_secs: duration.as_secs_f64(),
    };
    // the log itself is intact without a sidecar, analysis falls back to the file name
    if let Err(e) = metadata.write(&log_path) {
        warn!("{e}");
    }

    PhaseReport {
        phase: request.phase,
        log_path,
        command,
        status,
        duration,
    }
}

/// last `count` lines of a log, empty if it cannot be read
fn tail(path: &Path, count: usize) -> Vec<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            let lines: Vec<&str> = text.lines().collect();

            lines[lines.len().saturating_sub(count)..]
                .iter()
                .map(|line| line.to_string())
                .collect()
        }
        Err(e) => {
            warn!("Failed to read back {}: {e}", path.display());
            Vec::new()
        }
    }
}

