//! User actions over a [`Session`], shared by the one-shot commands and the shell.

use std::path::PathBuf;

use informativos_ai::prompt::REFUSAL;
use informativos_ai::{Answer, Generation, LlmBridge};
use informativos_core::ExplodedRow;
use informativos_store::{Statistics, stats, write_parquet};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::display;
use crate::session::{ActionError, SelectionError, Session};

/// Study-set size when none is given.
pub const DEFAULT_STUDY_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Summary,
    Options,
    Cards,
    Table,
    Show(String),
    Stats,
    Favorite(String),
    Case(String),
    CloseCase,
    Assertions(String),
    Ask(String),
    Study { count: usize, seed: Option<u64> },
    StudyList,
    Pick(String),
    Status,
    Export(PathBuf),
}

/// Run `action` and return the text to print.
pub async fn execute(
    session: &mut Session,
    bridge: &LlmBridge,
    action: Action,
    json: bool,
) -> Result<String, ActionError> {
    match action {
        Action::Summary => Ok(display::render_summary(session.dataset())),
        Action::Options => Ok(render_options(session)),
        Action::Cards => {
            let outcome = session.view()?;
            Ok(format!(
                "{}\n\n{}",
                display::status_line(&outcome),
                display::render_cards(&outcome.table, session.table(), session.favorites())
            ))
        }
        Action::Table => {
            let outcome = session.view()?;
            Ok(format!(
                "{}\n{}\n",
                display::status_line(&outcome),
                display::render_table(&outcome.table)?
            ))
        }
        Action::Show(id) => {
            let row = session
                .table()
                .find(&id)
                .ok_or(SelectionError::NotFound(id.clone()))?;
            let favorite = session.favorites().contains(&id);
            Ok(display::render_card(&row, session.table(), favorite))
        }
        Action::Stats => {
            let outcome = session.stats_view()?;
            let stats: Statistics = stats::compute(&outcome.table);
            if json {
                Ok(serde_json::to_string_pretty(&stats)?)
            } else {
                Ok(display::render_stats(&stats))
            }
        }
        Action::Favorite(id) => {
            let now = session.toggle_favorite(&id)?;
            Ok(if now {
                format!("★ {id} adicionado aos favoritos")
            } else {
                format!("☆ {id} removido dos favoritos")
            })
        }
        Action::Case(id) => {
            session.select_for_case(&id);
            let (row, generation) = session.practice_case(bridge).await?;
            Ok(render_generation("Caso prático", &row, &generation))
        }
        Action::CloseCase => {
            let closed = session.case_target().map(str::to_string);
            session.close_case();
            Ok(match closed {
                Some(id) => format!("Caso prático do julgado {id} fechado."),
                None => "Nenhum caso prático aberto.".to_string(),
            })
        }
        Action::Assertions(id) => {
            session.select_for_assertions(&id);
            let (row, generation) = session.assertions(bridge).await?;
            Ok(render_generation("Assertivas", &row, &generation))
        }
        Action::Ask(question) => match session.ask(bridge, &question).await? {
            Answer::Text(text) => Ok(format!("Resposta:\n\n{text}")),
            Answer::NotInContext => Ok(format!(
                "Resposta:\n\n{REFUSAL}\n(Ajuste os filtros para incluir outros julgados no contexto.)"
            )),
            Answer::BlankQuestion => Ok("Por favor, digite sua pergunta.".to_string()),
        },
        Action::Study { count, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let set = session.generate_study_set(count, &mut rng)?.clone();
            if json {
                Ok(serde_json::to_string_pretty(&set)?)
            } else {
                Ok(display::render_study_set(&set, session.table(), None))
            }
        }
        Action::StudyList => Ok(match session.study_set() {
            Some(set) => display::render_study_set(set, session.table(), session.study_pick()),
            None => "Nenhuma meta de estudo gerada.".to_string(),
        }),
        Action::Pick(id) => {
            let row = session.pick_study_item(&id)?;
            let favorite = session.favorites().contains(&id);
            Ok(display::render_card(&row, session.table(), favorite))
        }
        Action::Status => Ok(render_status(session, bridge)),
        Action::Export(path) => {
            let outcome = session.view()?;
            write_parquet(&outcome.table, &path)?;
            info!(path = %path.display(), "export complete");
            Ok(format!(
                "{} linhas exportadas para {}",
                outcome.row_count,
                path.display()
            ))
        }
    }
}

fn render_generation(heading: &str, row: &ExplodedRow, generation: &Generation) -> String {
    match generation {
        Generation::Ready(text) => {
            format!("{heading}: [{}] {}\n\n{text}\n", row.id, row.title)
        }
        Generation::Failed(message) => format!(
            "{message}\nNão foi possível gerar {} para o julgado {} devido a um erro na API.\n",
            heading.to_lowercase(),
            row.id
        ),
    }
}

/// Session selections and LLM availability.
fn render_status(session: &Session, bridge: &LlmBridge) -> String {
    let model = if bridge.is_configured() {
        bridge.model().to_string()
    } else {
        format!("{} (sem chave de API)", bridge.model())
    };
    let or_dash = |id: Option<&str>| id.unwrap_or("-").to_string();
    let study = session
        .study_set()
        .map_or("-".to_string(), |set| format!("{} julgados", set.ids.len()));
    [
        ("modelo", model),
        ("favoritos", session.favorites().len().to_string()),
        ("caso prático", or_dash(session.case_target())),
        ("assertivas", or_dash(session.assertion_target())),
        ("meta de estudo", study),
        ("item da meta", or_dash(session.study_pick())),
    ]
    .iter()
    .map(|(label, value)| format!("  {label:<26} {value}"))
    .collect::<Vec<_>>()
    .join("\n")
}

fn render_options(session: &Session) -> String {
    let opts = session.table().options();
    let years: Vec<String> = opts.years.iter().map(i32::to_string).collect();
    [
        format!("Anos: {}", years.join(", ")),
        format!("Meses: {}", opts.year_months.join(", ")),
        format!("Áreas: {}", opts.areas.join("; ")),
        format!("Ramos: {}", opts.branches.join("; ")),
        format!("Classes: {}", opts.classes.join(", ")),
        format!("Informativos: {}", opts.bulletins.join(", ")),
    ]
    .join("\n")
}
