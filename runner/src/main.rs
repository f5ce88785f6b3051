use clap::Parser;
use std::{
    io::{stdout, IsTerminal},
    process::ExitCode,
};
use tracing::error;
use tracing_subscriber::EnvFilter;
use ycsb_runner::{cli::Args, config, run_benchmark, YcsbExecutor};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(stdout().is_terminal())
        .init();

    let invocation = match config::resolve(Args::parse()) {
        Ok(invocation) => invocation,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    match run_benchmark(&invocation, &mut YcsbExecutor) {
        Ok(report) if report.success() => ExitCode::SUCCESS,
        Ok(report) => {
            for phase in [&report.load, &report.run] {
                if !phase.success() {
                    error!("{} phase failed, see {}", phase.phase, phase.log_path.display());
                }
            }
            ExitCode::from(1)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(2)
        }
    }
}
