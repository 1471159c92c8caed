//! The exploded judgment table: an immutable Arrow `RecordBatch` with typed
//! column handles extracted once at construction.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Date32Array, Int32Array, StringArray};
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use informativos_core::{ExplodedRow, Judgment, Repercussion, columns, working_table_schema};

use crate::StoreError;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the Date32 epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Working table of exploded judgment rows.
///
/// Cloning is cheap: Arrow buffers are reference-counted.
#[derive(Debug, Clone)]
pub struct InformativoTable {
    batch: RecordBatch,
    cols: Columns,
}

#[derive(Debug, Clone)]
pub(crate) struct Columns {
    pub id: StringArray,
    pub title: StringArray,
    pub thesis: StringArray,
    pub summary: StringArray,
    pub legislation: StringArray,
    pub process_class: StringArray,
    pub bulletin: StringArray,
    pub repercussion: StringArray,
    pub judgment_date: Date32Array,
    pub year: Int32Array,
    pub month: Int32Array,
    pub year_month: StringArray,
    pub branch: StringArray,
    pub area: StringArray,
}

/// Distinct values available to each filter control, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Most recent first.
    pub years: Vec<i32>,
    /// Most recent first.
    pub year_months: Vec<String>,
    pub branches: Vec<String>,
    pub areas: Vec<String>,
    pub classes: Vec<String>,
    /// Numeric order where the value parses, one entry per bulletin.
    pub bulletins: Vec<String>,
}

impl InformativoTable {
    /// Explode judgments into the working table, preserving source order.
    pub fn from_judgments(judgments: &[Judgment]) -> Result<Self, StoreError> {
        let rows: Vec<ExplodedRow> = judgments.iter().flat_map(Judgment::explode).collect();
        Self::from_rows(&rows)
    }

    pub fn from_rows(rows: &[ExplodedRow]) -> Result<Self, StoreError> {
        let schema = Arc::new(working_table_schema());
        let columns: Vec<ArrayRef> = vec![
            utf8(rows, |r| &r.id),
            utf8(rows, |r| &r.title),
            utf8(rows, |r| &r.thesis),
            utf8(rows, |r| &r.summary),
            utf8(rows, |r| &r.legislation),
            utf8(rows, |r| &r.process_class),
            utf8(rows, |r| &r.bulletin),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.repercussion.label()),
            )),
            Arc::new(Date32Array::from_iter_values(
                rows.iter().map(|r| to_date32(r.judgment_date)),
            )),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Int32Array::from_iter_values(
                rows.iter().map(|r| r.month as i32),
            )),
            utf8(rows, |r| &r.year_month),
            utf8(rows, |r| &r.branch),
            utf8(rows, |r| &r.area),
        ];
        Self::from_batch(RecordBatch::try_new(schema, columns)?)
    }

    /// Wrap a batch that follows [`working_table_schema`].
    pub fn from_batch(batch: RecordBatch) -> Result<Self, StoreError> {
        let cols = Columns {
            id: typed_column(&batch, columns::ID)?,
            title: typed_column(&batch, columns::TITLE)?,
            thesis: typed_column(&batch, columns::THESIS)?,
            summary: typed_column(&batch, columns::SUMMARY)?,
            legislation: typed_column(&batch, columns::LEGISLATION)?,
            process_class: typed_column(&batch, columns::PROCESS_CLASS)?,
            bulletin: typed_column(&batch, columns::BULLETIN)?,
            repercussion: typed_column(&batch, columns::REPERCUSSION)?,
            judgment_date: typed_column(&batch, columns::JUDGMENT_DATE)?,
            year: typed_column(&batch, columns::YEAR)?,
            month: typed_column(&batch, columns::MONTH)?,
            year_month: typed_column(&batch, columns::YEAR_MONTH)?,
            branch: typed_column(&batch, columns::BRANCH)?,
            area: typed_column(&batch, columns::AREA)?,
        };
        Ok(Self { batch, cols })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub(crate) fn cols(&self) -> &Columns {
        &self.cols
    }

    /// Number of exploded rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Number of distinct judgment ids.
    pub fn unique_count(&self) -> usize {
        self.cols.id.iter().flatten().collect::<HashSet<_>>().len()
    }

    /// Distinct ids in order of first appearance.
    pub fn unique_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.cols
            .id
            .iter()
            .flatten()
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    /// Materialise row `i`. Panics if `i >= num_rows()`.
    pub fn row(&self, i: usize) -> ExplodedRow {
        let c = &self.cols;
        ExplodedRow {
            id: c.id.value(i).to_string(),
            title: c.title.value(i).to_string(),
            thesis: c.thesis.value(i).to_string(),
            summary: c.summary.value(i).to_string(),
            legislation: c.legislation.value(i).to_string(),
            process_class: c.process_class.value(i).to_string(),
            bulletin: c.bulletin.value(i).to_string(),
            repercussion: Repercussion::from_label(c.repercussion.value(i))
                .unwrap_or(Repercussion::NotInformed),
            judgment_date: from_date32(c.judgment_date.value(i)),
            year: c.year.value(i),
            month: c.month.value(i).max(0) as u32,
            year_month: c.year_month.value(i).to_string(),
            branch: c.branch.value(i).to_string(),
            area: c.area.value(i).to_string(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = ExplodedRow> + '_ {
        (0..self.num_rows()).map(|i| self.row(i))
    }

    /// Keep only the first row of every judgment id, in table order.
    pub fn distinct_by_id(&self) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        let mask: BooleanArray = self
            .cols
            .id
            .iter()
            .map(|id| Some(seen.insert(id.unwrap_or_default())))
            .collect();
        self.filter(&mask)
    }

    /// First row of the given judgment, if present in this table.
    pub fn find(&self, id: &str) -> Option<ExplodedRow> {
        self.position(id).map(|i| self.row(i))
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.cols.id.iter().position(|v| v == Some(id))
    }

    /// All branch tags of a judgment, distinct, in table order. Empty tags are skipped.
    pub fn branches_of(&self, id: &str) -> Vec<String> {
        self.distinct_for_id(id, &self.cols.branch)
    }

    /// All study areas of a judgment, distinct, in table order.
    pub fn areas_of(&self, id: &str) -> Vec<String> {
        self.distinct_for_id(id, &self.cols.area)
    }

    fn distinct_for_id(&self, id: &str, column: &StringArray) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for i in 0..self.num_rows() {
            if self.cols.id.value(i) != id {
                continue;
            }
            let value = column.value(i);
            if !value.is_empty() && !out.iter().any(|v| v == value) {
                out.push(value.to_string());
            }
        }
        out
    }

    /// Rows whose id is in `ids`, in table order.
    pub fn retain_ids(&self, ids: &BTreeSet<String>) -> Result<Self, StoreError> {
        let mask: BooleanArray = self
            .cols
            .id
            .iter()
            .map(|id| Some(id.is_some_and(|id| ids.contains(id))))
            .collect();
        self.filter(&mask)
    }

    /// Apply a boolean mask (same length as the table).
    pub fn filter(&self, mask: &BooleanArray) -> Result<Self, StoreError> {
        Self::from_batch(filter_record_batch(&self.batch, mask)?)
    }

    /// Distinct values for each filter control.
    pub fn options(&self) -> FilterOptions {
        let c = &self.cols;
        let years: BTreeSet<i32> = c.year.iter().flatten().collect();
        let year_months: BTreeSet<&str> = c.year_month.iter().flatten().collect();
        let mut bulletins: Vec<String> = non_empty_distinct(&c.bulletin).into_iter().collect();
        bulletins.sort_by_key(|b| (b.parse::<u64>().unwrap_or(u64::MAX), b.clone()));

        FilterOptions {
            years: years.into_iter().rev().collect(),
            year_months: year_months.into_iter().rev().map(str::to_string).collect(),
            branches: non_empty_distinct(&c.branch).into_iter().collect(),
            areas: non_empty_distinct(&c.area).into_iter().collect(),
            classes: non_empty_distinct(&c.process_class).into_iter().collect(),
            bulletins,
        }
    }
}

fn non_empty_distinct(column: &StringArray) -> BTreeSet<String> {
    column
        .iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn utf8(rows: &[ExplodedRow], field: impl Fn(&ExplodedRow) -> &String) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| field(r).as_str()),
    ))
}

fn typed_column<A: Array + Clone + 'static>(
    batch: &RecordBatch,
    name: &str,
) -> Result<A, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<A>())
        .cloned()
        .ok_or_else(|| StoreError::Other(format!("working table column '{name}' missing or mistyped")))
}

fn to_date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

fn from_date32(days: i32) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{judgment, sample_table};

    #[test]
    fn date32_conversion() {
        let d = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(to_date32(d), 0);
        let d = NaiveDate::from_ymd_opt(2023, 5, 10).unwrap();
        assert_eq!(from_date32(to_date32(d)), d);
    }

    #[test]
    fn explosion_counts() {
        let table = sample_table();
        // 5 judgments, one of them with two branches and one with none.
        assert_eq!(table.unique_count(), 5);
        assert_eq!(table.num_rows(), 6);
    }

    #[test]
    fn explosion_is_lossless() {
        let judgments = vec![
            judgment("0", "2021-02-01", "Direito Civil;Direito Penal;Direito Tributário"),
            judgment("1", "2022-02-01", ""),
            judgment("2", "2023-02-01", "Direito Civil"),
        ];
        let table = InformativoTable::from_judgments(&judgments).unwrap();
        assert_eq!(table.num_rows(), 5);
        assert_eq!(table.unique_ids(), vec!["0", "1", "2"]);
        let empty = table.find("1").unwrap();
        assert_eq!(empty.branch, "");
        assert_eq!(empty.area, informativos_core::DEFAULT_AREA);
    }

    #[test]
    fn row_materialises_all_fields() {
        let table = sample_table();
        let row = table.find("0").unwrap();
        assert_eq!(row.year, 2021);
        assert_eq!(row.month, 3);
        assert_eq!(row.year_month, "2021-03");
        assert_eq!(row.branch, "Direito Civil");
        assert_eq!(row.area, "Direito Privado");
        assert_eq!(row.repercussion, Repercussion::Yes);
        assert_eq!(row.display_date(), "15/03/2021");
    }

    #[test]
    fn distinct_by_id_keeps_first_row() {
        let table = sample_table();
        let unique = table.distinct_by_id().unwrap();
        assert_eq!(unique.num_rows(), 5);
        assert_eq!(unique.find("0").unwrap().branch, "Direito Civil");
    }

    #[test]
    fn branches_and_areas_of_record() {
        let table = sample_table();
        assert_eq!(table.branches_of("0"), vec!["Direito Civil", "Direito Penal"]);
        assert_eq!(table.areas_of("0"), vec!["Direito Privado", "Direito Penal"]);
        assert!(table.branches_of("4").is_empty());
        assert_eq!(table.areas_of("4"), vec![informativos_core::DEFAULT_AREA]);
        assert!(table.branches_of("missing").is_empty());
    }

    #[test]
    fn retain_ids_selects_all_rows_of_each_id() {
        let table = sample_table();
        let ids: BTreeSet<String> = ["0".to_string(), "2".to_string()].into();
        let subset = table.retain_ids(&ids).unwrap();
        assert_eq!(subset.num_rows(), 3);
        assert_eq!(subset.unique_count(), 2);
    }

    #[test]
    fn options_are_sorted_and_skip_empty() {
        let opts = sample_table().options();
        assert_eq!(opts.years, vec![2024, 2023, 2022, 2021]);
        assert_eq!(opts.year_months.first().map(String::as_str), Some("2024-11"));
        assert!(!opts.branches.iter().any(String::is_empty));
        assert!(opts.areas.contains(&"Direito Público".to_string()));
        assert_eq!(opts.bulletins, vec!["999", "1001", "1050"]);
    }

    #[test]
    fn empty_table() {
        let table = InformativoTable::from_rows(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.unique_count(), 0);
        assert!(table.find("0").is_none());
        assert_eq!(table.options(), FilterOptions::default());
    }
}
