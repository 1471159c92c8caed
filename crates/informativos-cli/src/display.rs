//! Text presentation of judgments: cards, the row table, and statistics charts.
//!
//! Every renderer returns a `String` so the one-shot commands and the
//! interactive shell print the same output.

use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use informativos_core::ExplodedRow;
use informativos_store::stats::{CountEntry, YearCount};
use informativos_store::{
    Dataset, FilterOutcome, InformativoTable, QueryMode, SampleOutcome, Statistics, StudySet,
};

/// Cards shown per listing.
pub const MAX_CARDS: usize = 10;

const BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 34;

pub fn status_line(outcome: &FilterOutcome) -> String {
    let mut line = format!(
        "{} julgados únicos ({} linhas/ramos)",
        outcome.unique_count, outcome.row_count
    );
    if outcome.query_mode == Some(QueryMode::Literal) {
        line.push_str(" [busca literal: expressão regular inválida]");
    }
    line
}

// ── Cards ──

/// One judgment card. Branches and areas come from `full`, so a filtered
/// view still shows every tag of the record.
pub fn render_card(row: &ExplodedRow, full: &InformativoTable, favorite: bool) -> String {
    let star = if favorite { "★" } else { "☆" };
    let mut out = format!("{star} [{}] {}\n", row.id, row.title);

    let bulletin = if row.bulletin.is_empty() {
        "-"
    } else {
        row.bulletin.as_str()
    };
    field(&mut out, "Informativo", bulletin);
    field(&mut out, "Data", &row.display_date());
    field(&mut out, "Classe", &row.process_class);
    field(&mut out, "Ramos", &joined(&full.branches_of(&row.id)));
    field(&mut out, "Áreas", &joined(&full.areas_of(&row.id)));
    field(&mut out, "Repercussão Geral", row.repercussion.label());

    out.push_str("\n  Tese / Notícia:\n");
    out.push_str(&indent(&row.thesis));
    if !row.summary.is_empty() && row.summary != row.thesis {
        out.push_str("\n  Resumo:\n");
        out.push_str(&indent(&row.summary));
    }
    if !row.legislation.is_empty() {
        out.push_str("\n  Legislação:\n");
        out.push_str(&indent(&row.legislation));
    }
    out
}

/// Cards for the first [`MAX_CARDS`] unique judgments of `view`.
pub fn render_cards(
    view: &InformativoTable,
    full: &InformativoTable,
    favorites: &BTreeSet<String>,
) -> String {
    let unique = view.unique_ids();
    if unique.is_empty() {
        return "Nenhum julgado encontrado com os filtros atuais.\n".to_string();
    }

    let mut out = String::new();
    for id in unique.iter().take(MAX_CARDS) {
        if let Some(row) = view.find(id) {
            out.push_str(&render_card(&row, full, favorites.contains(id)));
            out.push_str(&"─".repeat(60));
            out.push('\n');
        }
    }
    if unique.len() > MAX_CARDS {
        out.push_str(&format!(
            "Mostrando os primeiros {} de {} julgados.\n",
            MAX_CARDS,
            unique.len()
        ));
    }
    out
}

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("  {:<20} {}\n", label, value));
}

fn joined(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|l| format!("    {l}\n")).collect()
}

// ── Row table ──

const TABLE_HEADERS: [&str; 7] = [
    "Informativo",
    "Data",
    "Título",
    "Classe",
    "Ramo Direito",
    "Área Estudo",
    "RG",
];

/// One line per exploded row, via Arrow's pretty printer.
pub fn render_table(view: &InformativoTable) -> Result<String, ArrowError> {
    let rows: Vec<ExplodedRow> = view.rows().collect();
    let columns = vec![
        text_column(&rows, |r| r.bulletin.clone()),
        text_column(&rows, |r| r.display_date()),
        text_column(&rows, |r| r.title.clone()),
        text_column(&rows, |r| r.process_class.clone()),
        text_column(&rows, |r| r.branch.clone()),
        text_column(&rows, |r| r.area.clone()),
        text_column(&rows, |r| r.repercussion.label().to_string()),
    ];
    let schema = Schema::new(
        TABLE_HEADERS
            .iter()
            .map(|h| Field::new(*h, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    );
    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

fn text_column(rows: &[ExplodedRow], value: impl Fn(&ExplodedRow) -> String) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(rows.iter().map(value)))
}

// ── Charts ──

pub fn render_bars(title: &str, entries: &[CountEntry]) -> String {
    let mut out = format!("{title}\n");
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    for e in entries {
        out.push_str(&format!(
            "  {:<lw$} {:<bw$} {}\n",
            truncate(&e.label, LABEL_WIDTH),
            bar(e.count, max),
            e.count,
            lw = LABEL_WIDTH,
            bw = BAR_WIDTH,
        ));
    }
    out
}

pub fn render_year_series(series: &[YearCount]) -> String {
    let mut out = "Julgados únicos por ano\n".to_string();
    let max = series.iter().map(|y| y.count).max().unwrap_or(0);
    for y in series {
        out.push_str(&format!(
            "  {:<6} {:<bw$} {}\n",
            y.year,
            bar(y.count, max),
            y.count,
            bw = BAR_WIDTH,
        ));
    }
    out
}

pub fn render_repercussion(stats: &Statistics) -> String {
    let mut out = "Repercussão Geral (julgados únicos)\n".to_string();
    for e in &stats.repercussion {
        out.push_str(&format!(
            "  {:<16} {:>6} {:>6.1}%\n",
            e.label,
            e.count,
            stats.percentage(e)
        ));
    }
    out
}

pub fn render_stats(stats: &Statistics) -> String {
    if stats.unique_records == 0 {
        return "Nenhum dado para exibir com os filtros atuais.\n".to_string();
    }
    [
        format!(
            "{} julgados únicos ({} linhas/ramos)\n",
            stats.unique_records, stats.rows
        ),
        render_bars("Linhas por ramo do direito", &stats.by_branch),
        render_bars("Linhas por área de estudo", &stats.by_area),
        render_year_series(&stats.unique_by_year),
        render_repercussion(stats),
    ]
    .join("\n")
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(width)
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(width - 1).collect();
        s.push('…');
        s
    }
}

// ── Summary and study sets ──

pub fn render_summary(dataset: &Dataset) -> String {
    let report = &dataset.report;
    let opts = dataset.table.options();
    let mut out = format!(
        "{} julgados carregados ({} linhas/ramos)\n",
        report.judgments, report.rows
    );
    out.push_str(&format!("  {:<26} {}\n", "linhas na fonte", report.source_rows));
    out.push_str(&format!("  {:<26} {}\n", "datas inválidas", report.invalid_dates));
    out.push_str(&format!("  {:<26} {}\n", "fora de 2021–2025", report.out_of_range));
    if !report.defaulted_columns.is_empty() {
        out.push_str(&format!(
            "  {:<26} {}\n",
            "colunas ausentes",
            report.defaulted_columns.join(", ")
        ));
    }
    let years: Vec<String> = opts.years.iter().map(i32::to_string).collect();
    out.push_str(&format!("  {:<26} {}\n", "anos", years.join(", ")));
    out.push_str(&format!("  {:<26} {}\n", "áreas", opts.areas.join(", ")));
    out.push_str(&format!("  {:<26} {}\n", "classes", opts.classes.join(", ")));
    out.push_str(&format!("  {:<26} {}\n", "ramos", opts.branches.len()));
    out.push_str(&format!("  {:<26} {}\n", "informativos", opts.bulletins.len()));
    out
}

/// Study-set listing; `pick` marks the item being read.
pub fn render_study_set(set: &StudySet, full: &InformativoTable, pick: Option<&str>) -> String {
    let mut out = match set.outcome {
        SampleOutcome::Complete => format!("Meta de estudo: {} julgados\n", set.ids.len()),
        SampleOutcome::Reduced {
            requested,
            available,
        } => format!(
            "Apenas {available} julgados disponíveis para os filtros (pedidos {requested}); \
             todos foram incluídos.\n"
        ),
        SampleOutcome::NoCandidates => {
            return "Nenhum julgado corresponde aos filtros da meta.\n".to_string();
        }
    };
    for (i, id) in set.ids.iter().enumerate() {
        let (title, date) = full
            .find(id)
            .map(|r| (r.title.clone(), r.display_date()))
            .unwrap_or_default();
        let marker = if pick == Some(id.as_str()) { "▶" } else { " " };
        out.push_str(&format!("{marker} {:>3}. [{id}] {date} {title}\n", i + 1));
    }
    out
}
