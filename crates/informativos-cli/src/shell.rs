//! Interactive shell: one [`Session`] driven line by line from stdin.

use std::collections::BTreeSet;

use informativos_ai::LlmBridge;
use informativos_store::{DateSelection, FilterSelection, RepercussionChoice};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::actions::{self, Action, DEFAULT_STUDY_SIZE};
use crate::args::{parse_repercussion, parse_study_size};
use crate::session::Session;

const HELP: &str = "\
Filtros (listas separadas por ';', sem valor limpa o filtro):
  anos 2023 2024          meses 2024-11 2024-10
  areas Direito Penal; Direito Público
  ramos Direito Civil     classes RE; HC
  informativo 1050        rg Sim|Não|Não Informado|Todos
  busca <regex>           favoritos on|off
  limpar                  opcoes
Visualização:
  cards   tabela   stats   ver <id>   fav <id>   resumo
IA:
  caso <id>   fechar   assertivas <id>   pergunta <texto>
Metas de estudo:
  meta anos 2024 | meta areas ... | meta ramos ...
  meta gerar [n] [semente]   meta lista   meta ver <id>
Outros:
  status   exportar <arquivo.parquet>   ajuda   sair";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEdit {
    Years(BTreeSet<i32>),
    Months(BTreeSet<String>),
    Areas(BTreeSet<String>),
    Branches(BTreeSet<String>),
    Classes(BTreeSet<String>),
    Bulletin(Option<String>),
    Repercussion(RepercussionChoice),
    Query(Option<String>),
    FavoritesOnly(bool),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaEdit {
    Years(BTreeSet<i32>),
    Areas(BTreeSet<String>),
    Branches(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Filter(FilterEdit),
    Meta(MetaEdit),
    Run(Action),
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => Self::Empty,
            "ajuda" | "help" | "?" => Self::Help,
            "sair" | "quit" | "exit" => Self::Quit,

            "anos" => Self::Filter(FilterEdit::Years(parse_years(rest)?)),
            "meses" => Self::Filter(FilterEdit::Months(words(rest))),
            "areas" => Self::Filter(FilterEdit::Areas(list(rest))),
            "ramos" => Self::Filter(FilterEdit::Branches(list(rest))),
            "classes" => Self::Filter(FilterEdit::Classes(list(rest))),
            "informativo" => Self::Filter(FilterEdit::Bulletin(optional(rest))),
            "rg" => Self::Filter(FilterEdit::Repercussion(if rest.is_empty() {
                RepercussionChoice::All
            } else {
                parse_repercussion(rest)?
            })),
            "busca" => Self::Filter(FilterEdit::Query(optional(rest))),
            "favoritos" => Self::Filter(FilterEdit::FavoritesOnly(parse_switch(rest)?)),
            "limpar" => Self::Filter(FilterEdit::Clear),

            "resumo" => Self::Run(Action::Summary),
            "status" => Self::Run(Action::Status),
            "opcoes" => Self::Run(Action::Options),
            "cards" => Self::Run(Action::Cards),
            "tabela" => Self::Run(Action::Table),
            "stats" => Self::Run(Action::Stats),
            "ver" => Self::Run(Action::Show(required(rest, "ver <id>")?)),
            "fav" => Self::Run(Action::Favorite(required(rest, "fav <id>")?)),
            "caso" => Self::Run(Action::Case(required(rest, "caso <id>")?)),
            "fechar" => Self::Run(Action::CloseCase),
            "assertivas" => Self::Run(Action::Assertions(required(rest, "assertivas <id>")?)),
            "pergunta" => Self::Run(Action::Ask(rest.to_string())),
            "exportar" => Self::Run(Action::Export(required(rest, "exportar <arquivo>")?.into())),

            "meta" => parse_meta(rest)?,
            other => return Err(format!("comando desconhecido: {other} (digite 'ajuda')")),
        };
        Ok(command)
    }
}

fn parse_meta(rest: &str) -> Result<ShellCommand, String> {
    let (word, args) = match rest.split_once(char::is_whitespace) {
        Some((w, a)) => (w, a.trim()),
        None => (rest, ""),
    };
    let command = match word {
        "anos" => ShellCommand::Meta(MetaEdit::Years(parse_years(args)?)),
        "areas" => ShellCommand::Meta(MetaEdit::Areas(list(args))),
        "ramos" => ShellCommand::Meta(MetaEdit::Branches(list(args))),
        "gerar" => {
            let mut parts = args.split_whitespace();
            let count = match parts.next() {
                Some(n) => parse_study_size(n)?,
                None => DEFAULT_STUDY_SIZE,
            };
            let seed = parts
                .next()
                .map(|s| s.parse().map_err(|_| format!("semente inválida: {s}")))
                .transpose()?;
            ShellCommand::Run(Action::Study { count, seed })
        }
        "ver" => ShellCommand::Run(Action::Pick(required(args, "meta ver <id>")?)),
        "lista" => ShellCommand::Run(Action::StudyList),
        _ => return Err("uso: meta anos|areas|ramos|gerar|lista|ver ...".to_string()),
    };
    Ok(command)
}

fn parse_years(raw: &str) -> Result<BTreeSet<i32>, String> {
    raw.split_whitespace()
        .map(|y| y.parse().map_err(|_| format!("ano inválido: {y}")))
        .collect()
}

fn parse_switch(raw: &str) -> Result<bool, String> {
    match raw.to_lowercase().as_str() {
        "on" | "sim" | "" => Ok(true),
        "off" | "nao" | "não" => Ok(false),
        other => Err(format!("use on ou off, não '{other}'")),
    }
}

/// `;`-separated values, trimmed, empty entries dropped.
fn list(raw: &str) -> BTreeSet<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn words(raw: &str) -> BTreeSet<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

fn optional(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

fn required(raw: &str, usage: &str) -> Result<String, String> {
    optional(raw).ok_or_else(|| format!("uso: {usage}"))
}

fn apply_filter_edit(selection: &mut FilterSelection, edit: FilterEdit) {
    match edit {
        FilterEdit::Years(years) => selection.date = DateSelection::Years(years),
        FilterEdit::Months(months) => selection.date = DateSelection::YearMonths(months),
        FilterEdit::Areas(areas) => selection.areas = areas,
        FilterEdit::Branches(branches) => selection.branches = branches,
        FilterEdit::Classes(classes) => selection.classes = classes,
        FilterEdit::Bulletin(bulletin) => selection.bulletin = bulletin,
        FilterEdit::Repercussion(choice) => selection.repercussion = choice,
        FilterEdit::Query(query) => selection.query = query,
        FilterEdit::FavoritesOnly(on) => selection.favorites_only = on,
        FilterEdit::Clear => *selection = FilterSelection::default(),
    }
}

/// Handle one input line. Returns `false` when the shell should exit.
pub async fn handle_line(session: &mut Session, bridge: &LlmBridge, line: &str) -> bool {
    let command = match ShellCommand::parse(line) {
        Ok(c) => c,
        Err(message) => {
            eprintln!("{message}");
            return true;
        }
    };
    debug!(?command, "shell command");

    match command {
        ShellCommand::Empty => {}
        ShellCommand::Quit => return false,
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Filter(edit) => {
            apply_filter_edit(&mut session.selection, edit);
            match session.view() {
                Ok(outcome) => println!("{}", crate::display::status_line(&outcome)),
                Err(e) => eprintln!("{e}"),
            }
        }
        ShellCommand::Meta(edit) => {
            let filter = &mut session.study_filter;
            match edit {
                MetaEdit::Years(years) => filter.years = years,
                MetaEdit::Areas(areas) => filter.areas = areas,
                MetaEdit::Branches(branches) => filter.branches = branches,
            }
            println!("Filtros da meta atualizados.");
        }
        ShellCommand::Run(action) => match actions::execute(session, bridge, action, false).await {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("{}", e.user_message()),
        },
    }
    true
}

pub async fn run(session: &mut Session, bridge: &LlmBridge) -> anyhow::Result<()> {
    println!("{}", crate::display::render_summary(session.dataset()));
    if !bridge.is_configured() {
        println!("(sem chave de API: ações de IA desativadas)");
    }
    println!("Digite 'ajuda' para ver os comandos.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("informativos> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !handle_line(session, bridge, &line).await {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use informativos_core::Repercussion;

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::parse(line).unwrap()
    }

    #[test]
    fn filter_commands() {
        assert_eq!(
            parse("anos 2024 2023"),
            ShellCommand::Filter(FilterEdit::Years([2023, 2024].into()))
        );
        assert_eq!(parse("anos"), ShellCommand::Filter(FilterEdit::Years(BTreeSet::new())));
        assert_eq!(
            parse("areas Direito Penal; Direito Público ;"),
            ShellCommand::Filter(FilterEdit::Areas(
                ["Direito Penal".to_string(), "Direito Público".to_string()].into()
            ))
        );
        assert_eq!(
            parse("rg Não Informado"),
            ShellCommand::Filter(FilterEdit::Repercussion(RepercussionChoice::Only(
                Repercussion::NotInformed
            )))
        );
        assert_eq!(parse("busca"), ShellCommand::Filter(FilterEdit::Query(None)));
        assert_eq!(
            parse("busca usucapi(ão|ao)"),
            ShellCommand::Filter(FilterEdit::Query(Some("usucapi(ão|ao)".into())))
        );
        assert_eq!(parse("favoritos off"), ShellCommand::Filter(FilterEdit::FavoritesOnly(false)));
    }

    #[test]
    fn action_commands() {
        assert_eq!(parse("  "), ShellCommand::Empty);
        assert_eq!(parse("CARDS"), ShellCommand::Run(Action::Cards));
        assert_eq!(parse("caso 12"), ShellCommand::Run(Action::Case("12".into())));
        assert_eq!(
            parse("pergunta O ICMS integra o PIS?"),
            ShellCommand::Run(Action::Ask("O ICMS integra o PIS?".into()))
        );
        assert_eq!(
            parse("meta gerar"),
            ShellCommand::Run(Action::Study {
                count: DEFAULT_STUDY_SIZE,
                seed: None
            })
        );
        assert_eq!(
            parse("meta gerar 5 42"),
            ShellCommand::Run(Action::Study {
                count: 5,
                seed: Some(42)
            })
        );
        assert_eq!(parse("meta ver 3"), ShellCommand::Run(Action::Pick("3".into())));
        assert_eq!(parse("meta lista"), ShellCommand::Run(Action::StudyList));
        assert_eq!(parse("status"), ShellCommand::Run(Action::Status));
    }

    #[test]
    fn parse_errors() {
        assert!(ShellCommand::parse("ver").is_err());
        assert!(ShellCommand::parse("anos dois mil").is_err());
        assert!(ShellCommand::parse("meta gerar muitos").is_err());
        assert!(ShellCommand::parse("meta gerar 0").is_err());
        assert!(ShellCommand::parse("rg talvez").is_err());
        assert!(ShellCommand::parse("voar").is_err());
    }

    #[test]
    fn filter_edits_apply_to_selection() {
        let mut selection = FilterSelection::default();
        apply_filter_edit(&mut selection, FilterEdit::Months(["2024-11".to_string()].into()));
        apply_filter_edit(&mut selection, FilterEdit::Query(Some("icms".into())));
        assert!(matches!(selection.date, DateSelection::YearMonths(_)));
        assert_eq!(selection.query.as_deref(), Some("icms"));
        apply_filter_edit(&mut selection, FilterEdit::Clear);
        assert_eq!(selection, FilterSelection::default());
    }
}
