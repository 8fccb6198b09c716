//! Grouping of artifact references.
//!
//! Two explicit modes: by owning identifier (the file name up to its first
//! dot) and by strategy. Both keep first-seen order inside each group and
//! never touch their input.

use crate::models::Strategy;
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Derive the identifier a reference belongs to.
///
/// `scans/2024/1/abc.performance.mobile.json` belongs to `abc`.
pub fn identifier_of(reference: &str) -> &str {
    let file_name = reference.rsplit('/').next().unwrap_or(reference);
    file_name.split('.').next().unwrap_or(file_name)
}

/// Group references by owning identifier, groups in first-seen order.
pub fn group_by_identifier(references: &[String]) -> IndexMap<String, Vec<String>> {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();

    for reference in references {
        grouped
            .entry(identifier_of(reference).to_string())
            .or_default()
            .push(reference.clone());
    }

    grouped
}

/// Find the strategy a reference was produced for.
///
/// File name segments are read right to left, skipping the `json` and
/// `min` suffixes, so the strategy position wins over a slug that happens
/// to be a strategy name. With no matching segment, any occurrence of the
/// name in the reference counts, first in `Strategy::ALL` order.
pub fn strategy_of(reference: &str) -> Option<Strategy> {
    let file_name = reference.rsplit('/').next().unwrap_or(reference);

    let mut segments: Vec<&str> = file_name.split('.').collect();
    if segments.len() > 1 && segments.last() == Some(&"json") {
        segments.pop();
    }
    if segments.len() > 1 && segments.last() == Some(&"min") {
        segments.pop();
    }

    segments
        .iter()
        .rev()
        .find_map(|segment| Strategy::ALL.into_iter().find(|s| s.as_str() == *segment))
        .or_else(|| {
            Strategy::ALL
                .into_iter()
                .find(|s| reference.contains(s.as_str()))
        })
}

/// References split by strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyPartition {
    /// One bucket per strategy that had at least one reference.
    pub buckets: BTreeMap<Strategy, Vec<String>>,
    /// References that name no known strategy.
    pub unclassified: Vec<String>,
}

impl StrategyPartition {
    /// References for `strategy`, empty when none were seen.
    pub fn bucket(&self, strategy: Strategy) -> &[String] {
        self.buckets.get(&strategy).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Group references by strategy.
pub fn group_by_strategy(references: &[String]) -> StrategyPartition {
    let mut partition = StrategyPartition::default();

    for reference in references {
        match strategy_of(reference) {
            Some(strategy) => partition
                .buckets
                .entry(strategy)
                .or_default()
                .push(reference.clone()),
            None => partition.unclassified.push(reference.clone()),
        }
    }

    partition
}
