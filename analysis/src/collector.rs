use crate::table::ResultTable;
use ignore::{DirEntry, WalkBuilder};
use itertools::Itertools;
use std::path::Path;
use tracing::{debug, warn};
use ycsb_ingest::{is_run_log, parse_log_file, LogName, LogRecord, Phase, RunMetadata};

/// Walk `root` recursively and turn every run log into a record
///
/// Logs are visited in path order. Files whose identity can't be determined are skipped silently,
/// unreadable files are skipped with a warning.
pub fn collect_records(root: &Path) -> ResultTable {
    let paths = WalkBuilder::new(root)
        // results directories are plain trees, don't apply ignore files or hide dot files
        .standard_filters(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Failed to search for logs: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().map_or(false, |kind| kind.is_file()))
        .map(DirEntry::into_path)
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, is_run_log)
        })
        .sorted()
        .collect_vec();

    debug!("Found {} candidate run logs below {root:?}", paths.len());

    ResultTable::new(
        paths
            .iter()
            .filter_map(|path| record_for(path))
            .collect_vec(),
    )
}

fn record_for(path: &Path) -> Option<LogRecord> {
    let (database, workload) = identify(path)?;

    match parse_log_file(path) {
        Ok(metrics) => Some(LogRecord {
            database,
            workload,
            metrics,
        }),
        Err(e) => {
            warn!("Skipping log: {e}");
            None
        }
    }
}

/// database and workload of a log, the sidecar wins over the file name
fn identify(path: &Path) -> Option<(String, String)> {
    let from_name = || {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(LogName::parse)
            .map(|name| (name.database, name.workload))
    };

    match RunMetadata::read(path) {
        Ok(Some(metadata)) if metadata.phase == Phase::Load => {
            debug!(path = ?path, "Sidecar marks log as load phase, skipping");
            None
        }
        Ok(Some(metadata)) => {
            debug!(path = ?path, "Identity taken from sidecar");
            Some((metadata.database, metadata.workload))
        }
        Ok(None) => {
            debug!(path = ?path, "No sidecar, identity taken from the file name");
            from_name()
        }
        Err(e) => {
            warn!(path = ?path, "Ignoring unreadable sidecar: {e}");
            from_name()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use ycsb_ingest::Metric;

    const LOG: &str = "[OVERALL], Throughput(ops/sec), 100.0\n[READ], AverageLatency(us), 10\n";

    #[test]
    fn walks_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024").join(".hidden");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("rocksdb_workload_a_run_20240101_000000.log"), LOG).unwrap();
        fs::write(nested.join("postgresql_workload_b_run_20240101_000000.log"), LOG).unwrap();
        // load logs and unrelated files are not candidates
        fs::write(dir.path().join("rocksdb_workload_a_load_20240101_000000.log"), LOG).unwrap();
        fs::write(dir.path().join("notes_run.txt"), LOG).unwrap();

        let table = collect_records(dir.path());

        assert_eq!(table.len(), 2);
        let identities = table
            .records()
            .iter()
            .map(|record| (record.database.as_str(), record.workload.as_str()))
            .sorted()
            .collect_vec();
        assert_eq!(
            identities,
            vec![("postgresql", "workload_b"), ("rocksdb", "workload_a")]
        );
    }

    #[test]
    fn short_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run_1.log"), LOG).unwrap();
        fs::write(dir.path().join("run.log"), LOG).unwrap();

        assert!(collect_records(dir.path()).is_empty());
    }

    #[test]
    fn sidecar_identity_wins() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("postgresql_workloada_run_20240101_000000.log");
        fs::write(&log, LOG).unwrap();
        RunMetadata {
            database: "postgresql".into(),
            workload: "workloada".into(),
            phase: Phase::Run,
            timestamp: "20240101_000000".into(),
            threads: 1,
            properties: String::new(),
            command: "ycsb run postgresql".into(),
            exit_code: Some(0),
            duration_secs: 1.0,
        }
        .write(&log)
        .unwrap();

        let table = collect_records(dir.path());

        assert_eq!(table.len(), 1);
        let record = &table.records()[0];
        assert_eq!(record.workload, "workloada");
        assert_eq!(record.get(Metric::Throughput), Some(100.0));
        assert_eq!(record.get(Metric::ReadAvgLat), Some(10.0));
    }

    #[test]
    fn load_sidecar_excludes_log() {
        let dir = tempfile::tempdir().unwrap();
        // the workload name contains "run", which makes the load log look like a run log
        let log = dir.path().join("rocksdb_rerun_load_20240101_000000.log");
        fs::write(&log, LOG).unwrap();
        RunMetadata {
            database: "rocksdb".into(),
            workload: "rerun".into(),
            phase: Phase::Load,
            timestamp: "20240101_000000".into(),
            threads: 1,
            properties: String::new(),
            command: "ycsb load rocksdb".into(),
            exit_code: Some(0),
            duration_secs: 1.0,
        }
        .write(&log)
        .unwrap();

        assert!(collect_records(dir.path()).is_empty());
    }

    #[test]
    fn broken_sidecar_falls_back_to_name() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("postgres_workloada_run_20240101_000000.log");
        fs::write(&log, LOG).unwrap();
        fs::write(RunMetadata::sidecar_path(&log), "not: [valid").unwrap();

        let table = collect_records(dir.path());

        assert_eq!(table.records()[0].database, "postgres");
        assert_eq!(table.records()[0].workload, "workloada_run");
    }

    #[test]
    fn mixed_identity_sources() {
        let dir = tempfile::tempdir().unwrap();
        let with_sidecar = dir.path().join("rocksdb_workloada_run_20240101_000000.log");
        fs::write(&with_sidecar, LOG).unwrap();
        RunMetadata {
            database: "rocksdb".into(),
            workload: "workloada".into(),
            phase: Phase::Run,
            timestamp: "20240101_000000".into(),
            threads: 1,
            properties: String::new(),
            command: "ycsb run rocksdb".into(),
            exit_code: Some(0),
            duration_secs: 1.0,
        }
        .write(&with_sidecar)
        .unwrap();
        fs::write(dir.path().join("rocksdb_workloada_run_20240102_000000.log"), LOG).unwrap();

        let table = collect_records(dir.path());

        // each log keeps the identity of its own source, the literal name rule is not rewritten
        let workloads = table
            .records()
            .iter()
            .map(|record| record.workload.as_str())
            .collect_vec();
        assert_eq!(workloads, vec!["workloada", "workloada_run"]);
    }

    #[test]
    fn missing_root() {
        let dir = tempfile::tempdir().unwrap();

        assert!(collect_records(&dir.path().join("nothing-here")).is_empty());
    }
}
