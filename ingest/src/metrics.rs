use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{debug, warn};

use crate::IngestError;

/// Metrics extracted from a YCSB log, keyed by the summary line that reports them
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Throughput,
    RunTime,
    UpdateAvgLat,
    ReadAvgLat,
    InsertAvgLat,
    UpdateP95Lat,
    ReadP95Lat,
    UpdateP99Lat,
    ReadP99Lat,
}

impl Metric {
    pub const ALL: [Metric; 9] = [
        Metric::Throughput,
        Metric::RunTime,
        Metric::UpdateAvgLat,
        Metric::ReadAvgLat,
        Metric::InsertAvgLat,
        Metric::UpdateP95Lat,
        Metric::ReadP95Lat,
        Metric::UpdateP99Lat,
        Metric::ReadP99Lat,
    ];

    /// column name used in tables and charts
    pub fn name(&self) -> &'static str {
        match self {
            Self::Throughput => "Throughput",
            Self::RunTime => "RunTime_ms",
            Self::UpdateAvgLat => "Update_Avg_Lat",
            Self::ReadAvgLat => "Read_Avg_Lat",
            Self::InsertAvgLat => "Insert_Avg_Lat",
            Self::UpdateP95Lat => "Update_P95_Lat",
            Self::ReadP95Lat => "Read_P95_Lat",
            Self::UpdateP99Lat => "Update_P99_Lat",
            Self::ReadP99Lat => "Read_P99_Lat",
        }
    }

    /// exact substring identifying the line in YCSB's summary output
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Throughput => "[OVERALL], Throughput(ops/sec)",
            Self::RunTime => "[OVERALL], RunTime(ms)",
            Self::UpdateAvgLat => "[UPDATE], AverageLatency(us)",
            Self::ReadAvgLat => "[READ], AverageLatency(us)",
            Self::InsertAvgLat => "[INSERT], AverageLatency(us)",
            Self::UpdateP95Lat => "[UPDATE], 95thPercentileLatency(us)",
            Self::ReadP95Lat => "[READ], 95thPercentileLatency(us)",
            Self::UpdateP99Lat => "[UPDATE], 99thPercentileLatency(us)",
            Self::ReadP99Lat => "[READ], 99thPercentileLatency(us)",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// sparse metric map, metrics missing from the log are absent
pub type Metrics = BTreeMap<Metric, f64>;

/// One analysed run log
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub database: String,
    pub workload: String,
    pub metrics: Metrics,
}

impl LogRecord {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }
}

/// Match a single line against the known markers and parse its trailing field
pub fn parse_metric_line(line: &str) -> Option<(Metric, f64)> {
    let metric = Metric::ALL
        .into_iter()
        .find(|metric| line.contains(metric.marker()))?;
    let field = line.rsplit(',').next().unwrap_or_default().trim();

    match field.parse::<f64>() {
        Ok(value) => Some((metric, value)),
        Err(error) => {
            warn!(metric = %metric, field = field, "Ignoring unparsable metric value: {error}");

            None
        }
    }
}

/// Scan a log line by line, later occurrences of a metric replace earlier ones
pub fn parse_log<R: BufRead>(mut reader: R) -> Result<Metrics, IngestError> {
    let mut metrics = Metrics::new();
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }

        // logs are captured byte for byte, so tolerate whatever the tool wrote
        let line = String::from_utf8_lossy(&buffer);

        if let Some((metric, value)) = parse_metric_line(&line) {
            metrics.insert(metric, value);
        }
    }

    Ok(metrics)
}

#[tracing::instrument(level = "debug")]
pub fn parse_log_file(path: &Path) -> Result<Metrics, IngestError> {
    let file = File::open(path).map_err(|error| IngestError::ReadLog {
        path: path.to_path_buf(),
        source: error,
    })?;
    let metrics = parse_log(BufReader::new(file))?;

    debug!("Extracted {} metrics", metrics.len());

    Ok(metrics)
}
