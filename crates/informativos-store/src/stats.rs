//! Aggregate projections behind the statistics view.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::table::InformativoTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Counts over one (usually filtered) table.
///
/// Branch and area counts are over exploded rows; the year series and the
/// repercussion distribution are over unique judgments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub unique_records: usize,
    pub rows: usize,
    pub by_branch: Vec<CountEntry>,
    pub by_area: Vec<CountEntry>,
    pub unique_by_year: Vec<YearCount>,
    pub repercussion: Vec<CountEntry>,
}

impl Statistics {
    /// Share of unique judgments for a repercussion entry, in percent.
    pub fn percentage(&self, entry: &CountEntry) -> f64 {
        if self.unique_records == 0 {
            0.0
        } else {
            entry.count as f64 * 100.0 / self.unique_records as f64
        }
    }
}

pub fn compute(table: &InformativoTable) -> Statistics {
    let c = table.cols();
    let mut branches: HashMap<&str, usize> = HashMap::new();
    let mut areas: HashMap<&str, usize> = HashMap::new();
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    let mut repercussion: HashMap<&str, usize> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for i in 0..table.num_rows() {
        let branch = c.branch.value(i);
        if !branch.is_empty() {
            *branches.entry(branch).or_default() += 1;
        }
        *areas.entry(c.area.value(i)).or_default() += 1;

        if seen.insert(c.id.value(i)) {
            *years.entry(c.year.value(i)).or_default() += 1;
            *repercussion.entry(c.repercussion.value(i)).or_default() += 1;
        }
    }

    Statistics {
        unique_records: seen.len(),
        rows: table.num_rows(),
        by_branch: ranked(branches),
        by_area: ranked(areas),
        unique_by_year: years
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect(),
        repercussion: ranked(repercussion),
    }
}

/// Count descending, ties broken by label.
fn ranked(counts: HashMap<&str, usize>) -> Vec<CountEntry> {
    let mut out: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry {
            label: label.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}
