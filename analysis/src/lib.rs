//! Aggregates the run logs of a results directory into comparison tables and bar charts.

pub mod chart;
pub mod collector;
pub mod table;

pub use chart::{ChartSink, ChartSpec, PlottersSink, READ_LATENCY_CHART, THROUGHPUT_CHART};
pub use collector::collect_records;
pub use table::{PivotTable, Reducer, ResultTable};

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, instrument};
use ycsb_ingest::Metric;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to create {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to render {path:?}: {message}")]
    Render { path: PathBuf, message: String },
}

/// Result of analysing a results directory, none of these are failures
#[derive(Debug)]
pub enum Analysis {
    NoData,
    /// every run failed, the records are kept for reporting
    NoValidData { records: ResultTable },
    Charted {
        records: ResultTable,
        pivots: Vec<PivotTable>,
        charts: Vec<PathBuf>,
    },
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("No data found to analyze."),
            Self::NoValidData { .. } => f.write_str("No valid data found (Throughput > 0)."),
            Self::Charted { charts, .. } => write!(f, "Generated {} charts", charts.len()),
        }
    }
}

/// where charts for `root` end up
pub fn charts_dir(root: &Path) -> PathBuf {
    root.join("analysis").join("charts")
}

/// Collect, filter, pivot and chart all run logs below `root`
#[instrument(skip(sink), level = "info")]
pub fn analyze<S: ChartSink>(root: &Path, sink: &mut S) -> Result<Analysis, AnalysisError> {
    let records = collect_records(root);
    if records.is_empty() {
        return Ok(Analysis::NoData);
    }

    let valid = records.valid();
    if valid.is_empty() {
        return Ok(Analysis::NoValidData { records });
    }
    info!(
        "{} of {} runs reported a positive throughput",
        valid.len(),
        records.len()
    );

    let mut planned = Vec::new();
    if let Some(pivot) = valid.pivot(Metric::Throughput, Reducer::Max) {
        planned.push((THROUGHPUT_CHART, pivot));
    }
    if let Some(pivot) = valid.pivot(Metric::ReadAvgLat, Reducer::Mean) {
        planned.push((READ_LATENCY_CHART, pivot));
    }

    let directory = charts_dir(root);
    fs::create_dir_all(&directory).map_err(|source| AnalysisError::CreateDir {
        path: directory.clone(),
        source,
    })?;

    let mut charts = Vec::with_capacity(planned.len());
    for (spec, pivot) in &planned {
        let path = directory.join(format!("{}.png", spec.name));
        sink.render(spec, pivot, &path)?;
        charts.push(path);
    }

    Ok(Analysis::Charted {
        records,
        pivots: planned.into_iter().map(|(_, pivot)| pivot).collect(),
        charts,
    })
}
