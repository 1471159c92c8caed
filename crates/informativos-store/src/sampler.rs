//! Study-set sampler: a uniform random draw of judgment ids for a reading goal.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{info, warn};

use crate::StoreError;
use crate::filter::{self, DateSelection, FilterSelection};
use crate::table::InformativoTable;

/// Meta-filter applied to the full table before sampling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyFilter {
    pub years: BTreeSet<i32>,
    pub areas: BTreeSet<String>,
    pub branches: BTreeSet<String>,
}

impl StudyFilter {
    pub fn to_selection(&self) -> FilterSelection {
        FilterSelection {
            date: DateSelection::Years(self.years.clone()),
            areas: self.areas.clone(),
            branches: self.branches.clone(),
            ..Default::default()
        }
    }

    /// Unique candidate ids in table order.
    pub fn candidates(&self, table: &InformativoTable) -> Result<Vec<String>, StoreError> {
        let outcome = filter::apply(table, &self.to_selection(), &BTreeSet::new())?;
        Ok(outcome.table.unique_ids())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleOutcome {
    Complete,
    /// Fewer candidates than requested; every candidate was returned.
    Reduced { requested: usize, available: usize },
    NoCandidates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudySet {
    pub ids: Vec<String>,
    pub outcome: SampleOutcome,
}

impl StudySet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }
}

/// Draw up to `n` distinct ids uniformly without replacement.
pub fn sample_study_set<R: Rng + ?Sized>(candidates: &[String], n: usize, rng: &mut R) -> StudySet {
    if candidates.is_empty() {
        warn!(requested = n, "no candidates for study set");
        return StudySet {
            ids: Vec::new(),
            outcome: SampleOutcome::NoCandidates,
        };
    }
    if candidates.len() < n {
        warn!(
            requested = n,
            available = candidates.len(),
            "fewer candidates than requested, returning all"
        );
        return StudySet {
            ids: candidates.to_vec(),
            outcome: SampleOutcome::Reduced {
                requested: n,
                available: candidates.len(),
            },
        };
    }

    let ids: Vec<String> = candidates.choose_multiple(rng, n).cloned().collect();
    info!(requested = n, candidates = candidates.len(), "sampled study set");
    StudySet {
        ids,
        outcome: SampleOutcome::Complete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_table;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn exact_count_of_distinct_candidates() {
        let candidates = pool(40);
        let mut rng = StdRng::seed_from_u64(7);
        let set = sample_study_set(&candidates, 10, &mut rng);
        assert_eq!(set.outcome, SampleOutcome::Complete);
        assert_eq!(set.ids.len(), 10);
        let distinct: BTreeSet<&String> = set.ids.iter().collect();
        assert_eq!(distinct.len(), 10);
        assert!(set.ids.iter().all(|id| candidates.contains(id)));
    }

    #[test]
    fn reduced_when_pool_is_small() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = sample_study_set(&pool(4), 10, &mut rng);
        assert_eq!(
            set.outcome,
            SampleOutcome::Reduced {
                requested: 10,
                available: 4
            }
        );
        assert_eq!(set.ids, pool(4));
    }

    #[test]
    fn empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = sample_study_set(&[], 5, &mut rng);
        assert_eq!(set.outcome, SampleOutcome::NoCandidates);
        assert!(set.ids.is_empty());
    }

    #[test]
    fn same_seed_same_draw() {
        let candidates = pool(100);
        let a = sample_study_set(&candidates, 15, &mut StdRng::seed_from_u64(42));
        let b = sample_study_set(&candidates, 15, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn meta_filter_candidates() {
        let table = sample_table();
        let filter = StudyFilter {
            years: [2024].into(),
            ..Default::default()
        };
        assert_eq!(filter.candidates(&table).unwrap(), vec!["3", "4"]);

        let filter = StudyFilter {
            areas: ["Direito Penal".to_string()].into(),
            ..Default::default()
        };
        // Judgment 0 qualifies through its second branch and appears once.
        assert_eq!(filter.candidates(&table).unwrap(), vec!["0", "3"]);

        assert_eq!(StudyFilter::default().candidates(&table).unwrap().len(), 5);
    }

    #[test]
    fn outcome_json_shape() {
        let set = StudySet {
            ids: vec!["1".into()],
            outcome: SampleOutcome::Reduced {
                requested: 3,
                available: 1,
            },
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["outcome"]["status"], "reduced");
        assert_eq!(json["outcome"]["available"], 1);
    }
}
