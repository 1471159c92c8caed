//! Command-line argument groups shared by several subcommands.

use std::collections::BTreeSet;

use clap::Args;
use informativos_ai::{DEFAULT_API_BASE, DEFAULT_MODEL, LlmConfig};
use informativos_core::Repercussion;
use informativos_store::{DateSelection, FilterSelection, RepercussionChoice};

pub const DEFAULT_DATA: &str = "Dados_InformativosSTF_2021-2025.xlsx";

/// Completion-service settings.
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// API key for the completion service; LLM actions are disabled without it
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model identifier
    #[arg(long, env = "INFORMATIVOS_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "INFORMATIVOS_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,
}

impl LlmArgs {
    pub fn config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.api_base.clone(),
        }
    }
}

/// The main filter controls. Every option is repeatable where it accepts a set.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Judgment year
    #[arg(long = "year")]
    pub years: Vec<i32>,

    /// Judgment month as YYYY-MM (instead of --year)
    #[arg(long = "month", conflicts_with = "years")]
    pub months: Vec<String>,

    /// Study area, e.g. "Direito Público"
    #[arg(long = "area")]
    pub areas: Vec<String>,

    /// Law branch, e.g. "Direito Penal"
    #[arg(long = "branch")]
    pub branches: Vec<String>,

    /// Process class, e.g. RE, ADI, HC
    #[arg(long = "class")]
    pub classes: Vec<String>,

    /// Bulletin number
    #[arg(long)]
    pub bulletin: Option<String>,

    /// General repercussion: Sim, Não, "Não Informado" or Todos
    #[arg(long = "rg", value_parser = parse_repercussion)]
    pub repercussion: Option<RepercussionChoice>,

    /// Case-insensitive regular expression over title, thesis and summary
    #[arg(short, long)]
    pub query: Option<String>,
}

impl FilterArgs {
    pub fn to_selection(&self) -> FilterSelection {
        let date = if self.months.is_empty() {
            DateSelection::Years(self.years.iter().copied().collect())
        } else {
            DateSelection::YearMonths(self.months.iter().cloned().collect())
        };
        FilterSelection {
            date,
            areas: to_set(&self.areas),
            branches: to_set(&self.branches),
            classes: to_set(&self.classes),
            bulletin: self.bulletin.clone(),
            repercussion: self.repercussion.unwrap_or_default(),
            favorites_only: false,
            query: self.query.clone(),
        }
    }
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}

/// Accepts the display labels, case-insensitively, with or without accents.
pub fn parse_repercussion(raw: &str) -> Result<RepercussionChoice, String> {
    let key = raw.trim().to_lowercase().replace('ã', "a");
    match key.as_str() {
        "todos" | "all" => Ok(RepercussionChoice::All),
        "sim" => Ok(RepercussionChoice::Only(Repercussion::Yes)),
        "nao" => Ok(RepercussionChoice::Only(Repercussion::No)),
        "nao informado" | "nao-informado" => Ok(RepercussionChoice::Only(Repercussion::NotInformed)),
        _ => Err(format!(
            "valor inválido '{raw}': use Sim, Não, \"Não Informado\" ou Todos"
        )),
    }
}

/// Study-set size: a whole number of at least one judgment.
pub fn parse_study_size(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("a meta de estudo precisa de pelo menos 1 julgado".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("quantidade inválida: {raw}")),
    }
}
