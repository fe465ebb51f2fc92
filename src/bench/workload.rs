use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;

use crate::backend::{Operation, Record};
use crate::conf::WorkloadConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    BulkInsert,
    ScanAll,
    PointLookup,
    BulkDelete,
}

impl StepKind {
    /// Execution order. Scan and lookup need the inserted data; delete runs
    /// last so the backend is empty again for the next invocation.
    pub const ORDER: [StepKind; 4] = [
        StepKind::BulkInsert,
        StepKind::ScanAll,
        StepKind::PointLookup,
        StepKind::BulkDelete,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StepKind::BulkInsert => "bulk_insert",
            StepKind::ScanAll => "scan_all",
            StepKind::PointLookup => "point_lookup",
            StepKind::BulkDelete => "bulk_delete",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `{id, name: "name<id>"}` for every id in `0..size`.
pub fn generate_dataset(size: usize) -> Vec<Record> {
    (0..size as i64)
        .map(|id| Record {
            id,
            name: format!("name{id}"),
        })
        .collect()
}

/// The fixed CRUD sequence and its dataset. The dataset is generated once and
/// shared by every run, so generation never shows up in a timing.
#[derive(Debug, Clone)]
pub struct Workload {
    lookup_key: i64,
    dataset: Arc<[Record]>,
}

impl Workload {
    pub const DEFAULT_DATASET_SIZE: usize = 10_000;
    pub const DEFAULT_LOOKUP_KEY: i64 = 5555;

    pub fn new(dataset_size: usize, lookup_key: i64) -> Self {
        Self {
            lookup_key,
            dataset: generate_dataset(dataset_size).into(),
        }
    }

    pub fn from_config(config: &WorkloadConfig) -> Self {
        Self::new(config.dataset_size, config.lookup_key)
    }

    pub fn dataset_size(&self) -> usize {
        self.dataset.len()
    }

    pub fn id_range(&self) -> Range<i64> {
        0..self.dataset.len() as i64
    }

    pub fn lookup_key(&self) -> i64 {
        self.lookup_key
    }

    pub fn steps(&self) -> &'static [StepKind] {
        &StepKind::ORDER
    }

    pub fn dataset(&self) -> &[Record] {
        &self.dataset
    }

    pub fn operation(&self, step: StepKind) -> Operation {
        match step {
            StepKind::BulkInsert => Operation::BulkInsert(self.dataset.clone()),
            StepKind::ScanAll => Operation::ScanAll,
            StepKind::PointLookup => Operation::PointLookup(self.lookup_key),
            StepKind::BulkDelete => Operation::BulkDelete,
        }
    }
}

impl Default for Workload {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DATASET_SIZE, Self::DEFAULT_LOOKUP_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_dataset() {
        let data = generate_dataset(3);
        assert_eq!(
            data,
            vec![
                Record { id: 0, name: "name0".to_string() },
                Record { id: 1, name: "name1".to_string() },
                Record { id: 2, name: "name2".to_string() },
            ]
        );
        assert!(generate_dataset(0).is_empty());
    }

    #[test]
    fn test_default_workload() {
        let workload = Workload::default();
        assert_eq!(workload.dataset_size(), 10_000);
        assert_eq!(workload.id_range(), 0..10_000);
        assert_eq!(workload.lookup_key(), 5555);
        assert_eq!(workload.dataset()[5555].name, "name5555");
        assert_eq!(workload.dataset(), generate_dataset(10_000).as_slice());
    }

    #[test]
    fn test_step_order() {
        let names: Vec<&str> = Workload::default().steps().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["bulk_insert", "scan_all", "point_lookup", "bulk_delete"]);
    }

    #[test]
    fn test_operation_binds_arguments() {
        let workload = Workload::new(10, 7);
        match workload.operation(StepKind::BulkInsert) {
            Operation::BulkInsert(records) => assert_eq!(records.len(), 10),
            other => panic!("unexpected operation {other:?}"),
        }
        assert!(matches!(
            workload.operation(StepKind::PointLookup),
            Operation::PointLookup(7)
        ));
    }
}
