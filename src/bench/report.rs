use std::collections::HashSet;
use std::time::Duration;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::StepKind;
use crate::core::BenchError;

/// Named step durations in execution order. Built once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    timings: Vec<(StepKind, Duration)>,
}

impl BenchmarkResult {
    pub(crate) fn new(timings: Vec<(StepKind, Duration)>) -> Self {
        Self { timings }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StepKind, Duration)> + '_ {
        self.timings.iter().copied()
    }

    pub fn get(&self, step: StepKind) -> Option<Duration> {
        self.iter().find(|(s, _)| *s == step).map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.timings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }
}

pub fn result_key(step: StepKind) -> String {
    format!("time_{}", step.name())
}

/// Flat `{"time_<step>": seconds}` object; keys keep execution order.
impl Serialize for BenchmarkResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.timings.len()))?;
        for (step, duration) in &self.timings {
            map.serialize_entry(&result_key(*step), &duration.as_secs_f64())?;
        }
        map.end()
    }
}

/// Encodes a result as the JSON response body.
pub fn serialize(result: &BenchmarkResult) -> Result<Vec<u8>, BenchError> {
    if result.is_empty() {
        return Err(BenchError::Serialization("empty benchmark result".to_string()));
    }
    let mut seen = HashSet::new();
    if let Some((step, _)) = result.iter().find(|(step, _)| !seen.insert(*step)) {
        return Err(BenchError::Serialization(format!(
            "step '{step}' recorded twice"
        )));
    }
    Ok(serde_json::to_vec(result)?)
}
