use chrono::{DateTime, TimeZone};
use globset::{GlobBuilder, GlobMatcher};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::IngestError;

/// strftime pattern shared by every log file name, e.g. `20240101_000000`
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const LOG_EXTENSION: &str = "log";

static RUN_LOG_GLOB: Lazy<GlobMatcher> = Lazy::new(|| {
    GlobBuilder::new("*run*.log")
        .literal_separator(true)
        .build()
        .expect("run log pattern is a valid glob")
        .compile_matcher()
});

/// The two YCSB operations executed per invocation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Load,
    Run,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Run => "run",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database bindings the runner knows how to drive
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Postgresql,
    Rocksdb,
}

impl Binding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Rocksdb => "rocksdb",
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Binding {
    type Err = IngestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "postgresql" => Ok(Self::Postgresql),
            "rocksdb" => Ok(Self::Rocksdb),
            _ => Err(IngestError::UnknownBinding(value.to_string())),
        }
    }
}

pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// `{backend}_{workload}_{phase}_{timestamp}.log`
pub fn log_file_name(binding: Binding, workload: &str, phase: Phase, timestamp: &str) -> String {
    format!("{binding}_{workload}_{phase}_{timestamp}.{LOG_EXTENSION}")
}

/// check whether a file name looks like the log of a run phase
pub fn is_run_log(file_name: &str) -> bool {
    RUN_LOG_GLOB.is_match(file_name)
}

/// Identity of a log recovered from its file name alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogName {
    pub database: String,
    pub workload: String,
}

impl LogName {
    /// Split on `_`: the backend is the first token and the workload is the second and third token
    /// joined by `_`. This assumes workload files carry an underscore themselves (`workload_a`),
    /// names with fewer than three tokens yield `None`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let mut tokens = file_name.split('_');

        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(database), Some(first), Some(second)) => Some(Self {
                database: database.to_string(),
                workload: format!("{first}_{second}"),
            }),
            _ => None,
        }
    }
}
