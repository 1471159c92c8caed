mod actions;
mod args;
mod display;
mod session;
mod shell;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use informativos_ai::LlmBridge;
use informativos_store::{Catalog, LoadFailure, StoreError, StudyFilter};
use tracing::Level;

use crate::actions::{Action, DEFAULT_STUDY_SIZE};
use crate::args::{DEFAULT_DATA, FilterArgs, LlmArgs, parse_study_size};
use crate::session::Session;

/// Dashboard for STF informativos (2021-2025): search, statistics, study sets
/// and LLM-assisted study material.
#[derive(Parser, Debug)]
#[command(name = "informativos")]
#[command(version)]
struct Cli {
    /// Source spreadsheet (.xlsx, .xls, .ods, .csv or .parquet)
    #[arg(long, env = "INFORMATIVOS_DATA", default_value = DEFAULT_DATA, global = true)]
    data: PathBuf,

    /// Print statistics and study sets as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    llm: LlmArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load report and available filter values (default)
    Summary,

    /// List matching judgments as cards, or as a row table
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// One line per (judgment, branch) row instead of cards
        #[arg(long)]
        table: bool,
    },

    /// Show one judgment card
    Show { id: String },

    /// Counts by branch, area, year and general repercussion
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Draw a random study set
    Study {
        /// Number of judgments
        #[arg(short = 'n', long, default_value_t = DEFAULT_STUDY_SIZE, value_parser = parse_study_size)]
        count: usize,

        #[arg(long = "year")]
        years: Vec<i32>,

        #[arg(long = "area")]
        areas: Vec<String>,

        #[arg(long = "branch")]
        branches: Vec<String>,

        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate a practice case for a judgment in the filtered view
    Case {
        id: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Generate five true/false assertions for a judgment
    Assertions { id: String },

    /// Ask a question answered from the filtered judgments
    Ask {
        question: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Export the filtered rows to Parquet
    Export {
        path: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Interactive session
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("informativos v{}", env!("CARGO_PKG_VERSION"));

    let dataset = Catalog::global()
        .get_or_load(&cli.data)
        .map_err(|e| anyhow::anyhow!(describe_load_error(&e, &cli.data)))?;
    let bridge = LlmBridge::from_config(&cli.llm.config());
    tracing::info!(
        model = bridge.model(),
        configured = bridge.is_configured(),
        "llm bridge ready"
    );
    let mut session = Session::new(dataset);

    let action = match cli.command.unwrap_or(Command::Summary) {
        Command::Summary => Action::Summary,
        Command::Search { filters, table } => {
            session.selection = filters.to_selection();
            if table { Action::Table } else { Action::Cards }
        }
        Command::Show { id } => Action::Show(id),
        Command::Stats { filters } => {
            session.selection = filters.to_selection();
            Action::Stats
        }
        Command::Study {
            count,
            years,
            areas,
            branches,
            seed,
        } => {
            session.study_filter = StudyFilter {
                years: years.into_iter().collect(),
                areas: areas.into_iter().collect(),
                branches: branches.into_iter().collect(),
            };
            Action::Study { count, seed }
        }
        Command::Case { id, filters } => {
            session.selection = filters.to_selection();
            Action::Case(id)
        }
        Command::Assertions { id } => Action::Assertions(id),
        Command::Ask { question, filters } => {
            session.selection = filters.to_selection();
            Action::Ask(question)
        }
        Command::Export { path, filters } => {
            session.selection = filters.to_selection();
            Action::Export(path)
        }
        Command::Shell => return shell::run(&mut session, &bridge).await,
    };

    match actions::execute(&mut session, &bridge, action, cli.json).await {
        Ok(out) => {
            println!("{out}");
            Ok(())
        }
        Err(e) => anyhow::bail!(e.user_message()),
    }
}

fn describe_load_error(e: &StoreError, path: &Path) -> String {
    match e.kind() {
        LoadFailure::FileNotFound => format!(
            "arquivo de dados '{}' não encontrado; use --data ou INFORMATIVOS_DATA",
            path.display()
        ),
        LoadFailure::Validation => format!("dados inválidos em '{}': {e}", path.display()),
        LoadFailure::Processing => format!("erro ao processar '{}': {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_count_must_be_positive() {
        let cli = Cli::try_parse_from(["informativos", "study", "-n", "3", "--seed", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Study {
                count: 3,
                seed: Some(7),
                ..
            })
        ));
        assert!(Cli::try_parse_from(["informativos", "study", "-n", "0"]).is_err());

        let cli = Cli::try_parse_from(["informativos", "study"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Study {
                count: DEFAULT_STUDY_SIZE,
                ..
            })
        ));
    }
}
