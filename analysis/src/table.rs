use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use itertools::Itertools;
use std::{collections::BTreeMap, fmt};
use ycsb_ingest::{LogRecord, Metric};

/// How duplicate (workload, database) cells are folded into one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Max,
    Mean,
}

impl Reducer {
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        match self {
            Self::Max => values.iter().copied().reduce(f64::max),
            Self::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        }
    }
}

/// All records of one results directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    records: Vec<LogRecord>,
}

impl ResultTable {
    pub fn new(records: Vec<LogRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// drop failed runs, i.e. records without a positive throughput
    pub fn valid(&self) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| record.get(Metric::Throughput).map_or(false, |value| value > 0.0))
                .cloned()
                .collect(),
        }
    }

    pub fn has_metric(&self, metric: Metric) -> bool {
        self.records
            .iter()
            .any(|record| record.metrics.contains_key(&metric))
    }

    /// Reshape into workload rows by database columns, `None` if no record reports `metric`
    pub fn pivot(&self, metric: Metric, reducer: Reducer) -> Option<PivotTable> {
        let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();

        for record in &self.records {
            match record.get(metric) {
                Some(value) if !value.is_nan() => groups
                    .entry((record.workload.clone(), record.database.clone()))
                    .or_default()
                    .push(value),
                _ => {}
            }
        }

        if groups.is_empty() {
            return None;
        }

        let cells: BTreeMap<(String, String), f64> = groups
            .into_iter()
            .filter_map(|(key, values)| reducer.reduce(&values).map(|value| (key, value)))
            .collect();

        Some(PivotTable {
            metric,
            reducer,
            workloads: cells.keys().map(|(workload, _)| workload.clone()).dedup().collect(),
            databases: cells
                .keys()
                .map(|(_, database)| database.clone())
                .sorted()
                .dedup()
                .collect(),
            cells,
        })
    }

    pub fn to_table(&self) -> Table {
        let metrics = Metric::ALL
            .into_iter()
            .filter(|metric| self.has_metric(*metric))
            .collect_vec();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(
            ["DB", "Workload"]
                .into_iter()
                .map(String::from)
                .chain(metrics.iter().map(|metric| metric.name().to_string())),
        );

        for record in &self.records {
            table.add_row(
                [Cell::new(&record.database), Cell::new(&record.workload)]
                    .into_iter()
                    .chain(metrics.iter().map(|metric| value_cell(record.get(*metric)))),
            );
        }

        table
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

/// Metric values keyed by workload (rows) and database (columns)
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub metric: Metric,
    pub reducer: Reducer,
    pub workloads: Vec<String>,
    pub databases: Vec<String>,
    cells: BTreeMap<(String, String), f64>,
}

impl PivotTable {
    pub fn get(&self, workload: &str, database: &str) -> Option<f64> {
        self.cells
            .get(&(workload.to_string(), database.to_string()))
            .copied()
    }

    pub fn max_value(&self) -> Option<f64> {
        self.cells.values().copied().reduce(f64::max)
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(
            std::iter::once(format!("{} ({:?})", self.metric, self.reducer))
                .chain(self.databases.iter().cloned()),
        );

        for workload in &self.workloads {
            table.add_row(
                std::iter::once(Cell::new(workload)).chain(
                    self.databases
                        .iter()
                        .map(|database| value_cell(self.get(workload, database))),
                ),
            );
        }

        table
    }
}

impl fmt::Display for PivotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}

fn value_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right),
        None => Cell::new("-").set_alignment(CellAlignment::Center),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ycsb_ingest::Metrics;

    fn record(database: &str, workload: &str, metrics: &[(Metric, f64)]) -> LogRecord {
        LogRecord {
            database: database.into(),
            workload: workload.into(),
            metrics: metrics.iter().copied().collect::<Metrics>(),
        }
    }

    #[test]
    fn reducers() {
        assert_eq!(Reducer::Max.reduce(&[100.0, 200.0]), Some(200.0));
        assert_eq!(Reducer::Mean.reduce(&[10.0, 20.0]), Some(15.0));
        assert_eq!(Reducer::Mean.reduce(&[]), None);
    }

    #[test]
    fn duplicates_are_reduced() {
        let table = ResultTable::new(vec![
            record("rocksdb", "workload_a", &[(Metric::Throughput, 100.0), (Metric::ReadAvgLat, 10.0)]),
            record("rocksdb", "workload_a", &[(Metric::Throughput, 200.0), (Metric::ReadAvgLat, 20.0)]),
        ]);

        let throughput = table.pivot(Metric::Throughput, Reducer::Max).unwrap();
        let latency = table.pivot(Metric::ReadAvgLat, Reducer::Mean).unwrap();

        assert_eq!(throughput.get("workload_a", "rocksdb"), Some(200.0));
        assert_eq!(latency.get("workload_a", "rocksdb"), Some(15.0));
    }

    #[test]
    fn sparse_pivot() {
        let table = ResultTable::new(vec![
            record("rocksdb", "workload_b", &[(Metric::Throughput, 3.0)]),
            record("postgresql", "workload_a", &[(Metric::Throughput, 1.0)]),
            record("rocksdb", "workload_a", &[(Metric::Throughput, 2.0)]),
        ]);

        let pivot = table.pivot(Metric::Throughput, Reducer::Max).unwrap();

        assert_eq!(pivot.workloads, vec!["workload_a", "workload_b"]);
        assert_eq!(pivot.databases, vec!["postgresql", "rocksdb"]);
        assert_eq!(pivot.get("workload_b", "postgresql"), None);
        assert_eq!(pivot.max_value(), Some(3.0));
    }

    #[test]
    fn pivot_without_metric() {
        let table = ResultTable::new(vec![record("rocksdb", "workload_a", &[(Metric::Throughput, 1.0)])]);

        assert!(!table.has_metric(Metric::ReadAvgLat));
        assert_eq!(table.pivot(Metric::ReadAvgLat, Reducer::Mean), None);
    }

    #[test]
    fn failed_runs_are_dropped() {
        let table = ResultTable::new(vec![
            record("rocksdb", "workload_a", &[(Metric::Throughput, 0.0)]),
            record("rocksdb", "workload_b", &[(Metric::ReadAvgLat, 5.0)]),
            record("postgresql", "workload_a", &[(Metric::Throughput, 12.5)]),
        ]);

        let valid = table.valid();

        assert_eq!(valid.len(), 1);
        assert_eq!(valid.records()[0].database, "postgresql");
    }

    #[test]
    fn printed_table() {
        let table = ResultTable::new(vec![
            record("rocksdb", "workload_a", &[(Metric::Throughput, 1234.5)]),
            record("postgresql", "workload_a", &[(Metric::Throughput, 99.0), (Metric::ReadAvgLat, 3.0)]),
        ]);

        let printed = table.to_string();

        assert!(printed.contains("Throughput"));
        assert!(printed.contains("Read_Avg_Lat"));
        assert!(printed.contains("1234.50"));
        assert!(!printed.contains("Update_Avg_Lat"));
    }
}
