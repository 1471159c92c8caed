//! Loader/normaliser: raw sheet → judgments → exploded working table.
//!
//! Pipeline, in order:
//! 1. rename source headers to canonical columns (missing non-critical
//!    columns become empty; a missing judgment date is fatal)
//! 2. parse the judgment date, silently dropping rows that fail
//! 3. assign sequential ids over the surviving rows
//! 4. coerce bulletin number and repercussion flag, split branch tags
//! 5. keep judgments dated 2021–2025 and explode them per branch

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use informativos_core::{Judgment, Repercussion, columns, split_branches};
use tracing::{info, warn};

use crate::StoreError;
use crate::source::{RawSheet, read_source};
use crate::table::InformativoTable;

/// First and last judgment years kept in the working table.
pub const YEAR_RANGE: (i32, i32) = (2021, 2025);

/// Source header → canonical column.
const RENAME_MAP: &[(&str, &str)] = &[
    ("Numero do informativo", columns::BULLETIN),
    ("Classe Processo", columns::PROCESS_CLASS),
    ("Data Julgamento", columns::JUDGMENT_DATE),
    ("Tese Julgado", columns::THESIS),
    ("Ramo Direito", columns::BRANCH),
    ("Repercussão Geral", columns::REPERCUSSION),
    ("Título", columns::TITLE),
    ("Resumo", columns::SUMMARY),
    ("Legislação", columns::LEGISLATION),
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Row counts at each stage of a load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub source_rows: usize,
    /// Rows dropped because the judgment date did not parse.
    pub invalid_dates: usize,
    /// Judgments dropped by the year-range filter.
    pub out_of_range: usize,
    pub judgments: usize,
    /// Exploded rows in the final table.
    pub rows: usize,
    /// Canonical columns absent from the source and filled with empty text.
    pub defaulted_columns: Vec<String>,
}

/// A loaded table together with its load report.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: InformativoTable,
    pub report: LoadReport,
}

/// Read and normalise a source file into the working table.
pub fn load_dataset(path: &Path) -> Result<Dataset, StoreError> {
    let sheet = read_source(path)?;
    let dataset = build_dataset(&sheet)?;
    info!(
        path = %path.display(),
        judgments = dataset.report.judgments,
        rows = dataset.report.rows,
        "loaded informativos"
    );
    Ok(dataset)
}

/// Normalise an in-memory sheet into the working table.
pub fn build_dataset(sheet: &RawSheet) -> Result<Dataset, StoreError> {
    let (judgments, mut report) = normalize(sheet)?;
    let table = InformativoTable::from_judgments(&judgments)?;
    report.rows = table.num_rows();
    info!(rows = report.rows, "exploded by branch");
    Ok(Dataset { table, report })
}

/// Column positions after renaming. `None` means the column is absent.
struct ColumnMap {
    title: Option<usize>,
    thesis: Option<usize>,
    summary: Option<usize>,
    legislation: Option<usize>,
    process_class: Option<usize>,
    bulletin: Option<usize>,
    repercussion: Option<usize>,
    branch: Option<usize>,
    judgment_date: usize,
}

impl ColumnMap {
    fn resolve(sheet: &RawSheet, defaulted: &mut Vec<String>) -> Result<Self, StoreError> {
        let mut find = |canonical: &str| {
            let source = RENAME_MAP
                .iter()
                .find(|(_, c)| *c == canonical)
                .map(|(s, _)| *s)
                .unwrap_or(canonical);
            let idx = sheet.column_index(source);
            if idx.is_none() && canonical != columns::JUDGMENT_DATE {
                warn!(column = source, "column not found in source, filled with empty values");
                defaulted.push(canonical.to_string());
            }
            idx
        };

        let judgment_date = find(columns::JUDGMENT_DATE)
            .ok_or_else(|| StoreError::MissingColumn("Data Julgamento".to_string()))?;
        Ok(Self {
            title: find(columns::TITLE),
            thesis: find(columns::THESIS),
            summary: find(columns::SUMMARY),
            legislation: find(columns::LEGISLATION),
            process_class: find(columns::PROCESS_CLASS),
            bulletin: find(columns::BULLETIN),
            repercussion: find(columns::REPERCUSSION),
            branch: find(columns::BRANCH),
            judgment_date,
        })
    }
}

/// Sheet rows → judgments within [`YEAR_RANGE`], with the load report.
pub fn normalize(sheet: &RawSheet) -> Result<(Vec<Judgment>, LoadReport), StoreError> {
    let mut report = LoadReport {
        source_rows: sheet.num_rows(),
        ..Default::default()
    };
    let map = ColumnMap::resolve(sheet, &mut report.defaulted_columns)?;

    let text = |row: usize, col: Option<usize>| -> String {
        col.and_then(|c| sheet.cell(row, c))
            .unwrap_or_default()
            .to_string()
    };

    let mut judgments = Vec::new();
    let mut next_id = 0usize;
    for row in 0..sheet.num_rows() {
        let Some(date) = sheet.cell(row, map.judgment_date).and_then(parse_judgment_date) else {
            report.invalid_dates += 1;
            continue;
        };
        let id = next_id.to_string();
        next_id += 1;

        judgments.push(Judgment {
            id,
            title: text(row, map.title),
            thesis: text(row, map.thesis),
            summary: text(row, map.summary),
            legislation: text(row, map.legislation),
            process_class: text(row, map.process_class),
            bulletin: parse_bulletin(map.bulletin.and_then(|c| sheet.cell(row, c))),
            repercussion: Repercussion::from_raw(map.repercussion.and_then(|c| sheet.cell(row, c))),
            judgment_date: date,
            branches: split_branches(&text(row, map.branch)),
        });
    }
    info!(
        source_rows = report.source_rows,
        invalid_dates = report.invalid_dates,
        "parsed judgment dates"
    );

    let (first, last) = YEAR_RANGE;
    let before = judgments.len();
    judgments.retain(|j| (first..=last).contains(&j.year()));
    report.out_of_range = before - judgments.len();
    report.judgments = judgments.len();
    Ok((judgments, report))
}

/// Parse a judgment date. Returns `None` for anything unrecognised.
pub fn parse_judgment_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        })
}

/// Integral bulletin numbers render as plain digits; anything else is empty.
pub fn parse_bulletin(raw: Option<&str>) -> String {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    if let Ok(n) = s.parse::<i64>() {
        return n.to_string();
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => String::new(),
    }
}
