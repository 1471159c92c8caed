//! Per-session state layered over the shared, read-only dataset.
//!
//! Nothing here persists: a session starts empty and changes only through
//! the user actions below.

use std::collections::BTreeSet;
use std::sync::Arc;

use informativos_ai::{
    Answer, ContextEntry, Generation, GenerationCache, LlmBridge, LlmError, Purpose,
};
use informativos_core::ExplodedRow;
use informativos_store::{
    Dataset, FilterOutcome, FilterSelection, InformativoTable, StoreError, StudyFilter, StudySet,
    filter, sample_study_set,
};
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("julgado {0} não encontrado")]
    NotFound(String),
    #[error("nenhum julgado selecionado")]
    NothingSelected,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("render error: {0}")]
    Render(#[from] arrow::error::ArrowError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ActionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Llm(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub struct Session {
    dataset: Arc<Dataset>,
    favorites: BTreeSet<String>,
    pub selection: FilterSelection,
    pub study_filter: StudyFilter,
    study_set: Option<StudySet>,
    study_pick: Option<String>,
    assertion_target: Option<String>,
    case_target: Option<String>,
    generations: GenerationCache,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            favorites: BTreeSet::new(),
            selection: FilterSelection::default(),
            study_filter: StudyFilter::default(),
            study_set: None,
            study_pick: None,
            assertion_target: None,
            case_target: None,
            generations: GenerationCache::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The full working table.
    pub fn table(&self) -> &InformativoTable {
        &self.dataset.table
    }

    pub fn favorites(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    /// Current view: every filter including the free-text query.
    pub fn view(&self) -> Result<FilterOutcome, StoreError> {
        filter::apply(self.table(), &self.selection, &self.favorites)
    }

    /// View for the statistics screen, which ignores the free-text query.
    pub fn stats_view(&self) -> Result<FilterOutcome, StoreError> {
        filter::apply(self.table(), &self.selection.without_query(), &self.favorites)
    }

    /// Returns whether `id` is a favorite afterwards.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool, SelectionError> {
        if !self.table().contains_id(id) {
            return Err(SelectionError::NotFound(id.to_string()));
        }
        if self.favorites.remove(id) {
            Ok(false)
        } else {
            self.favorites.insert(id.to_string());
            Ok(true)
        }
    }

    // ── Record selection ──

    pub fn select_for_assertions(&mut self, id: &str) {
        self.assertion_target = Some(id.to_string());
        self.case_target = None;
    }

    pub fn select_for_case(&mut self, id: &str) {
        self.case_target = Some(id.to_string());
        self.assertion_target = None;
    }

    pub fn assertion_target(&self) -> Option<&str> {
        self.assertion_target.as_deref()
    }

    pub fn case_target(&self) -> Option<&str> {
        self.case_target.as_deref()
    }

    /// The practice-case record, looked up in `view`. A stale target is cleared.
    pub fn resolve_case_target(
        &mut self,
        view: &InformativoTable,
    ) -> Result<ExplodedRow, SelectionError> {
        resolve(&mut self.case_target, view)
    }

    /// The assertion record, looked up in the full table. A stale target is cleared.
    pub fn resolve_assertion_target(&mut self) -> Result<ExplodedRow, SelectionError> {
        let table = self.dataset.table.clone();
        resolve(&mut self.assertion_target, &table)
    }

    /// Close the practice case and forget its generated text.
    pub fn close_case(&mut self) {
        if let Some(id) = self.case_target.take() {
            self.generations.clear(&id, Purpose::PracticeCase);
        }
    }

    // ── Study sets ──

    /// Sample a new study set from the full table, replacing the previous one.
    pub fn generate_study_set<R: Rng + ?Sized>(
        &mut self,
        n: usize,
        rng: &mut R,
    ) -> Result<&StudySet, StoreError> {
        let candidates = self.study_filter.candidates(self.table())?;
        let set = sample_study_set(&candidates, n, rng);
        self.study_pick = None;
        Ok(&*self.study_set.insert(set))
    }

    pub fn study_set(&self) -> Option<&StudySet> {
        self.study_set.as_ref()
    }

    /// Pick an item of the current study set for reading.
    pub fn pick_study_item(&mut self, id: &str) -> Result<ExplodedRow, SelectionError> {
        let in_set = self.study_set.as_ref().is_some_and(|s| s.contains(id));
        if !in_set {
            return Err(SelectionError::NotFound(id.to_string()));
        }
        let row = self
            .table()
            .find(id)
            .ok_or_else(|| SelectionError::NotFound(id.to_string()))?;
        self.study_pick = Some(id.to_string());
        Ok(row)
    }

    pub fn study_pick(&self) -> Option<&str> {
        self.study_pick.as_deref()
    }

    // ── LLM actions ──

    /// Practice case for the selected record, resolved against the current view.
    pub async fn practice_case(
        &mut self,
        bridge: &LlmBridge,
    ) -> Result<(ExplodedRow, Generation), ActionError> {
        if self.case_target.is_none() {
            return Err(SelectionError::NothingSelected.into());
        }
        let view = self.view()?.table;
        let row = self.resolve_case_target(&view).inspect_err(|e| {
            warn!(error = %e, "practice-case selection no longer in view");
        })?;
        let generation = bridge
            .generate_cached(&mut self.generations, &row.id, Purpose::PracticeCase, &row.thesis)
            .await?;
        Ok((row, generation))
    }

    /// Assertions for the selected record, resolved against the full table.
    pub async fn assertions(
        &mut self,
        bridge: &LlmBridge,
    ) -> Result<(ExplodedRow, Generation), ActionError> {
        if self.assertion_target.is_none() {
            return Err(SelectionError::NothingSelected.into());
        }
        let row = self.resolve_assertion_target()?;
        let generation = bridge
            .generate_cached(&mut self.generations, &row.id, Purpose::Assertions, &row.thesis)
            .await?;
        Ok((row, generation))
    }

    /// Answer a question from the first unique judgments of the current view.
    pub async fn ask(&self, bridge: &LlmBridge, question: &str) -> Result<Answer, ActionError> {
        let view = self.view()?.table.distinct_by_id()?;
        let context: Vec<ContextEntry> = view
            .rows()
            .take(informativos_ai::prompt::MAX_CONTEXT)
            .map(|r| ContextEntry::from(&r))
            .collect();
        info!(context = context.len(), "question context prepared");
        Ok(bridge.answer(question, &context).await?)
    }
}

fn resolve(
    target: &mut Option<String>,
    view: &InformativoTable,
) -> Result<ExplodedRow, SelectionError> {
    let id = target.clone().ok_or(SelectionError::NothingSelected)?;
    match view.find(&id) {
        Some(row) => Ok(row),
        None => {
            *target = None;
            Err(SelectionError::NotFound(id))
        }
    }
}
