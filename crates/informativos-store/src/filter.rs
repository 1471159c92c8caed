//! Filter engine: independent predicates ANDed over the working table.
//!
//! Each active dimension of a [`FilterSelection`] becomes one [`Predicate`];
//! every predicate evaluates to a boolean mask over the *input* table, the
//! masks are combined with Arrow's `and` kernel and applied once. Inactive
//! dimensions produce no predicate at all.

use std::collections::BTreeSet;

use arrow::array::{BooleanArray, StringArray};
use arrow::compute::and;
use informativos_core::Repercussion;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::StoreError;
use crate::table::InformativoTable;

/// Date dimension: by year or by year-month, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSelection {
    Years(BTreeSet<i32>),
    YearMonths(BTreeSet<String>),
}

impl Default for DateSelection {
    fn default() -> Self {
        Self::Years(BTreeSet::new())
    }
}

/// Repercussion dimension; `All` is the inactive sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepercussionChoice {
    #[default]
    All,
    Only(Repercussion),
}

/// The user's current filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub date: DateSelection,
    pub areas: BTreeSet<String>,
    pub branches: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub bulletin: Option<String>,
    pub repercussion: RepercussionChoice,
    pub favorites_only: bool,
    pub query: Option<String>,
}

impl FilterSelection {
    /// Predicates for every active dimension. `favorites` is only consulted
    /// when `favorites_only` is set.
    pub fn predicates(&self, favorites: &BTreeSet<String>) -> Vec<Predicate> {
        let mut out = Vec::new();
        match &self.date {
            DateSelection::Years(years) if !years.is_empty() => {
                out.push(Predicate::Years(years.clone()))
            }
            DateSelection::YearMonths(keys) if !keys.is_empty() => {
                out.push(Predicate::YearMonths(keys.clone()))
            }
            _ => {}
        }
        if !self.areas.is_empty() {
            out.push(Predicate::Areas(self.areas.clone()));
        }
        if !self.branches.is_empty() {
            out.push(Predicate::Branches(self.branches.clone()));
        }
        if !self.classes.is_empty() {
            out.push(Predicate::Classes(self.classes.clone()));
        }
        if let Some(bulletin) = &self.bulletin {
            out.push(Predicate::Bulletin(bulletin.clone()));
        }
        if let RepercussionChoice::Only(flag) = self.repercussion {
            out.push(Predicate::Repercussion(flag));
        }
        if self.favorites_only {
            out.push(Predicate::Favorites(favorites.clone()));
        }
        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => out.push(Predicate::Text(TextQuery::compile(query))),
            _ => {}
        }
        out
    }

    /// Same selection with the free-text query cleared.
    pub fn without_query(&self) -> Self {
        Self {
            query: None,
            ..self.clone()
        }
    }
}

/// How a free-text query was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Case-insensitive regular expression.
    Pattern,
    /// The pattern did not compile; case-insensitive substring match.
    Literal,
}

/// A compiled free-text query over title, thesis and summary.
#[derive(Debug, Clone)]
pub enum TextQuery {
    Pattern(Regex),
    Literal(String),
}

impl TextQuery {
    /// Compile case-insensitively, falling back to a literal match when the
    /// query is not a valid regular expression.
    pub fn compile(query: &str) -> Self {
        match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(re) => Self::Pattern(re),
            Err(e) => {
                warn!(query, error = %e, "invalid search pattern, matching literally");
                Self::Literal(query.to_lowercase())
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(text),
            Self::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }

    pub fn mode(&self) -> QueryMode {
        match self {
            Self::Pattern(_) => QueryMode::Pattern,
            Self::Literal(_) => QueryMode::Literal,
        }
    }
}

/// One active filter dimension.
#[derive(Debug, Clone)]
pub enum Predicate {
    Years(BTreeSet<i32>),
    YearMonths(BTreeSet<String>),
    Areas(BTreeSet<String>),
    Branches(BTreeSet<String>),
    Classes(BTreeSet<String>),
    Bulletin(String),
    Repercussion(Repercussion),
    Favorites(BTreeSet<String>),
    Text(TextQuery),
}

impl Predicate {
    /// Row mask over `table`: `true` keeps the row.
    pub fn mask(&self, table: &InformativoTable) -> BooleanArray {
        let c = table.cols();
        match self {
            Self::Years(years) => c
                .year
                .iter()
                .map(|y| Some(y.is_some_and(|y| years.contains(&y))))
                .collect(),
            Self::YearMonths(keys) => member_mask(&c.year_month, keys),
            Self::Areas(areas) => member_mask(&c.area, areas),
            Self::Branches(branches) => member_mask(&c.branch, branches),
            Self::Classes(classes) => member_mask(&c.process_class, classes),
            Self::Bulletin(bulletin) => c
                .bulletin
                .iter()
                .map(|b| Some(b == Some(bulletin.as_str())))
                .collect(),
            Self::Repercussion(flag) => c
                .repercussion
                .iter()
                .map(|r| Some(r == Some(flag.label())))
                .collect(),
            Self::Favorites(ids) => member_mask(&c.id, ids),
            Self::Text(query) => (0..table.num_rows())
                .map(|i| {
                    Some(
                        query.is_match(c.title.value(i))
                            || query.is_match(c.thesis.value(i))
                            || query.is_match(c.summary.value(i)),
                    )
                })
                .collect(),
        }
    }
}

fn member_mask(column: &StringArray, set: &BTreeSet<String>) -> BooleanArray {
    column
        .iter()
        .map(|v| Some(v.is_some_and(|v| set.contains(v))))
        .collect()
}

/// Result of a filter pass, with both counts a status display needs.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub table: InformativoTable,
    /// Distinct judgment ids matched.
    pub unique_count: usize,
    /// Exploded rows matched; at least `unique_count`.
    pub row_count: usize,
    /// Set when a free-text query was active.
    pub query_mode: Option<QueryMode>,
}

/// Apply every active dimension of `selection`.
pub fn apply(
    table: &InformativoTable,
    selection: &FilterSelection,
    favorites: &BTreeSet<String>,
) -> Result<FilterOutcome, StoreError> {
    apply_predicates(table, &selection.predicates(favorites))
}

/// AND the masks of `predicates` and filter once. An empty slice keeps every row.
pub fn apply_predicates(
    table: &InformativoTable,
    predicates: &[Predicate],
) -> Result<FilterOutcome, StoreError> {
    let mut combined: Option<BooleanArray> = None;
    for predicate in predicates {
        let mask = predicate.mask(table);
        combined = Some(match combined {
            Some(acc) => and(&acc, &mask)?,
            None => mask,
        });
    }

    let filtered = match combined {
        Some(mask) => table.filter(&mask)?,
        None => table.clone(),
    };
    let query_mode = predicates.iter().find_map(|p| match p {
        Predicate::Text(q) => Some(q.mode()),
        _ => None,
    });

    let outcome = FilterOutcome {
        unique_count: filtered.unique_count(),
        row_count: filtered.num_rows(),
        table: filtered,
        query_mode,
    };
    debug!(
        predicates = predicates.len(),
        unique = outcome.unique_count,
        rows = outcome.row_count,
        "applied filters"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{judgment, sample_table};

    fn set<T: Ord + Clone>(items: &[T]) -> BTreeSet<T> {
        items.iter().cloned().collect()
    }

    fn strings(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ids(outcome: &FilterOutcome) -> Vec<String> {
        outcome.table.unique_ids()
    }

    fn run(selection: &FilterSelection) -> FilterOutcome {
        apply(&sample_table(), selection, &BTreeSet::new()).unwrap()
    }

    #[test]
    fn inactive_selection_keeps_everything() {
        let outcome = run(&FilterSelection::default());
        assert_eq!(outcome.row_count, 6);
        assert_eq!(outcome.unique_count, 5);
        assert_eq!(outcome.query_mode, None);
    }

    #[test]
    fn blank_query_is_inactive() {
        let selection = FilterSelection {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert!(selection.predicates(&BTreeSet::new()).is_empty());
        assert_eq!(run(&selection).row_count, 6);
    }

    #[test]
    fn year_filter() {
        let selection = FilterSelection {
            date: DateSelection::Years(set(&[2024])),
            ..Default::default()
        };
        assert_eq!(ids(&run(&selection)), vec!["3", "4"]);
    }

    #[test]
    fn year_month_filter() {
        let selection = FilterSelection {
            date: DateSelection::YearMonths(strings(&["2024-11", "2021-03"])),
            ..Default::default()
        };
        let outcome = run(&selection);
        assert_eq!(ids(&outcome), vec!["0", "3"]);
        // Judgment 0 keeps both of its branch rows.
        assert_eq!(outcome.row_count, 3);
    }

    #[test]
    fn area_filter_keeps_only_matching_branch_rows() {
        let selection = FilterSelection {
            areas: strings(&["Direito Penal"]),
            ..Default::default()
        };
        let outcome = run(&selection);
        assert_eq!(ids(&outcome), vec!["0", "3"]);
        assert_eq!(outcome.row_count, 2);
        assert!(outcome.table.rows().all(|r| r.area == "Direito Penal"));
    }

    #[test]
    fn branch_class_bulletin_and_repercussion() {
        let selection = FilterSelection {
            branches: strings(&["Direito Constitucional", "Direito Penal"]),
            classes: strings(&["HC", "ADI"]),
            bulletin: Some("1050".into()),
            repercussion: RepercussionChoice::Only(Repercussion::Yes),
            ..Default::default()
        };
        assert_eq!(ids(&run(&selection)), vec!["3"]);
    }

    #[test]
    fn favorites_only() {
        let table = sample_table();
        let selection = FilterSelection {
            favorites_only: true,
            ..Default::default()
        };
        let favorites = strings(&["2", "4"]);
        let outcome = apply(&table, &selection, &favorites).unwrap();
        assert_eq!(ids(&outcome), vec!["2", "4"]);

        // With no favorites the toggle still applies.
        let outcome = apply(&table, &selection, &BTreeSet::new()).unwrap();
        assert_eq!(outcome.unique_count, 0);
    }

    #[test]
    fn text_query_is_case_insensitive_over_three_fields() {
        let by_title = FilterSelection {
            query: Some("PRISÃO".into()),
            ..Default::default()
        };
        assert_eq!(ids(&run(&by_title)), vec!["3"]);

        let by_summary = FilterSelection {
            query: Some("tema 69".into()),
            ..Default::default()
        };
        assert_eq!(ids(&run(&by_summary)), vec!["2"]);

        let pattern = FilterSelection {
            query: Some("usucapi[aã]o|icms".into()),
            ..Default::default()
        };
        let outcome = run(&pattern);
        assert_eq!(ids(&outcome), vec!["0", "2"]);
        assert_eq!(outcome.query_mode, Some(QueryMode::Pattern));
    }

    #[test]
    fn invalid_pattern_falls_back_to_literal() {
        let selection = FilterSelection {
            query: Some("(art. 191".into()),
            ..Default::default()
        };
        let outcome = run(&selection);
        assert_eq!(outcome.query_mode, Some(QueryMode::Literal));
        assert_eq!(ids(&outcome), vec!["0"]);
    }

    #[test]
    fn no_match_query_yields_empty_result() {
        let judgments: Vec<_> = (0..50)
            .map(|i| judgment(&i.to_string(), "2023-04-01", "Direito Civil"))
            .collect();
        let table = InformativoTable::from_judgments(&judgments).unwrap();
        let selection = FilterSelection {
            query: Some("aborto".into()),
            ..Default::default()
        };
        let outcome = apply(&table, &selection, &BTreeSet::new()).unwrap();
        assert_eq!(outcome.unique_count, 0);
        assert_eq!(outcome.row_count, 0);
        assert!(outcome.table.is_empty());
    }

    fn rich_selection() -> FilterSelection {
        FilterSelection {
            date: DateSelection::Years(set(&[2021, 2023, 2024])),
            areas: strings(&["Direito Penal", "Direito Público", "Outras Áreas"]),
            classes: strings(&["RE", "HC", "ADPF"]),
            repercussion: RepercussionChoice::Only(Repercussion::Yes),
            query: Some("a".into()),
            ..Default::default()
        }
    }

    #[test]
    fn predicate_order_does_not_matter() {
        let table = sample_table();
        let predicates = rich_selection().predicates(&BTreeSet::new());
        let expected = apply_predicates(&table, &predicates).unwrap();

        let mut reversed = predicates.clone();
        reversed.reverse();
        let mut rotated = predicates.clone();
        rotated.rotate_left(2);
        for order in [reversed, rotated] {
            let outcome = apply_predicates(&table, &order).unwrap();
            assert_eq!(outcome.table.batch(), expected.table.batch());
        }

        // Sequential application equals the combined mask.
        let mut step = table.clone();
        for p in &predicates {
            step = apply_predicates(&step, std::slice::from_ref(p)).unwrap().table;
        }
        assert_eq!(step.batch(), expected.table.batch());
    }

    #[test]
    fn dropping_a_dimension_never_removes_rows() {
        let table = sample_table();
        let predicates = rich_selection().predicates(&BTreeSet::new());
        let full = apply_predicates(&table, &predicates).unwrap();
        let full_ids: BTreeSet<String> = full.table.unique_ids().into_iter().collect();

        for skip in 0..predicates.len() {
            let relaxed: Vec<Predicate> = predicates
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| p.clone())
                .collect();
            let outcome = apply_predicates(&table, &relaxed).unwrap();
            assert!(outcome.row_count >= full.row_count);
            let relaxed_ids: BTreeSet<String> = outcome.table.unique_ids().into_iter().collect();
            assert!(full_ids.is_subset(&relaxed_ids));
        }
    }

    #[test]
    fn without_query_clears_only_the_query() {
        let selection = rich_selection();
        let cleared = selection.without_query();
        assert_eq!(cleared.query, None);
        assert_eq!(cleared.areas, selection.areas);
    }
}
