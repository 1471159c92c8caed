//! Judgment records ("julgados") and their exploded per-branch rows.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::areas::area_for;

/// General-repercussion flag ("Repercussão Geral").
///
/// The source column is free text; only the exact values `Sim` and `Não`
/// are meaningful, everything else collapses to [`Repercussion::NotInformed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Repercussion {
    Yes,
    No,
    NotInformed,
}

impl Repercussion {
    pub const ALL: [Repercussion; 3] = [Self::Yes, Self::No, Self::NotInformed];

    /// Normalise a raw spreadsheet value. Matching on `Sim`/`Não` is
    /// case-sensitive but ignores surrounding whitespace, so `" Sim "` is
    /// `Yes` where an exact comparison would give `NotInformed`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Sim") => Self::Yes,
            Some("Não") => Self::No,
            _ => Self::NotInformed,
        }
    }

    /// Display label, in the language of the source data.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Sim",
            Self::No => "Não",
            Self::NotInformed => "Não Informado",
        }
    }

    /// Inverse of [`label`](Self::label).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.label() == label)
    }
}

impl fmt::Display for Repercussion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalised source row, before branch explosion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    /// Sequential id assigned at load time, stable for the life of the table.
    pub id: String,
    pub title: String,
    pub thesis: String,
    pub summary: String,
    pub legislation: String,
    pub process_class: String,
    /// Display form of the bulletin number; empty when blank or unparseable.
    pub bulletin: String,
    pub repercussion: Repercussion,
    pub judgment_date: NaiveDate,
    /// Trimmed, non-empty branch tags in source order.
    pub branches: Vec<String>,
}

impl Judgment {
    pub fn year(&self) -> i32 {
        self.judgment_date.year()
    }

    pub fn month(&self) -> u32 {
        self.judgment_date.month()
    }

    /// `YYYY-MM` key used by the month filter.
    pub fn year_month(&self) -> String {
        year_month_key(self.judgment_date)
    }

    /// One row per branch tag; a judgment without tags still yields exactly
    /// one row, with an empty branch.
    pub fn explode(&self) -> Vec<ExplodedRow> {
        if self.branches.is_empty() {
            return vec![self.row_for_branch("")];
        }
        self.branches
            .iter()
            .map(|branch| self.row_for_branch(branch))
            .collect()
    }

    fn row_for_branch(&self, branch: &str) -> ExplodedRow {
        ExplodedRow {
            id: self.id.clone(),
            title: self.title.clone(),
            thesis: self.thesis.clone(),
            summary: self.summary.clone(),
            legislation: self.legislation.clone(),
            process_class: self.process_class.clone(),
            bulletin: self.bulletin.clone(),
            repercussion: self.repercussion,
            judgment_date: self.judgment_date,
            year: self.year(),
            month: self.month(),
            year_month: self.year_month(),
            branch: branch.to_string(),
            area: area_for(branch).to_string(),
        }
    }
}

/// Split a semicolon-delimited branch field into trimmed, non-empty tags.
pub fn split_branches(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn year_month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// One row of the working table: a judgment paired with one branch tag and
/// the study area derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplodedRow {
    pub id: String,
    pub title: String,
    pub thesis: String,
    pub summary: String,
    pub legislation: String,
    pub process_class: String,
    pub bulletin: String,
    pub repercussion: Repercussion,
    pub judgment_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub year_month: String,
    pub branch: String,
    pub area: String,
}

impl ExplodedRow {
    /// Judgment date as `DD/MM/YYYY`.
    pub fn display_date(&self) -> String {
        self.judgment_date.format("%d/%m/%Y").to_string()
    }
}
