use clap::Parser;
use std::{
    io::{stdout, IsTerminal},
    path::PathBuf,
    process::ExitCode,
};
use tracing::error;
use tracing_subscriber::EnvFilter;
use ycsb_analysis::{analyze, Analysis, PlottersSink};

/// Aggregate YCSB run logs into comparison tables and charts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the benchmark logs
    #[arg(default_value = "results")]
    results_dir: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(stdout().is_terminal())
        .init();

    let args = Args::parse();

    let outcome = match analyze(&args.results_dir, &mut PlottersSink::default()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match &outcome {
        Analysis::NoData => println!("{outcome}"),
        Analysis::NoValidData { records } => {
            println!("Aggregated Results:");
            println!("{records}");
            println!("{outcome}");
        }
        Analysis::Charted {
            records,
            pivots,
            charts,
        } => {
            println!("Aggregated Results:");
            println!("{records}");
            for pivot in pivots {
                println!("{pivot}");
            }
            for chart in charts {
                println!("Generated {}", chart.display());
            }
        }
    }

    ExitCode::SUCCESS
}
