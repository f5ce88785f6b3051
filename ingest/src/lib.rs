//! Conventions shared by the runner and the analysis: how benchmark logs are named, the sidecar
//! metadata written next to them and how metrics are pulled out of YCSB's textual output.

pub mod metrics;
pub mod naming;
pub mod sidecar;

pub use metrics::{parse_log, parse_log_file, parse_metric_line, LogRecord, Metric, Metrics};
pub use naming::{
    format_timestamp, is_run_log, log_file_name, Binding, LogName, Phase, LOG_EXTENSION,
    TIMESTAMP_FORMAT,
};
pub use sidecar::RunMetadata;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path:?}: {source}")]
    ReadLog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write sidecar {path:?}: {source}")]
    WriteSidecar {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to (de)serialize sidecar metadata: {0}")]
    Sidecar(#[from] serde_yaml::Error),
    #[error("Failed to read log line: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown database binding '{0}'")]
    UnknownBinding(String),
}
