//! The LLM bridge: builds study prompts for a record and routes them through
//! a [`CompletionService`], caching per-record results for the session.

use tracing::{info, warn};

use crate::LlmError;
use crate::cache::{Generation, GenerationCache};
use crate::client::{ChatMessage, CompletionRequest, CompletionService};
use crate::prompt::{
    ContextEntry, Purpose, QUESTION_TEMPERATURE, build_context, is_refusal, question_prompt,
};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl LlmConfig {
    /// The key, if present and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Outcome of a free-form question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    /// The model replied with the fixed refusal: the context does not hold the answer.
    NotInContext,
    /// The question was blank; nothing was sent.
    BlankQuestion,
}

pub struct LlmBridge {
    model: String,
    service: Option<Box<dyn CompletionService>>,
}

impl LlmBridge {
    /// `service` is `None` when no credential is configured; every request
    /// then fails with [`LlmError::NotConfigured`] without leaving the process.
    pub fn new(model: impl Into<String>, service: Option<Box<dyn CompletionService>>) -> Self {
        Self {
            model: model.into(),
            service,
        }
    }

    #[cfg(feature = "http")]
    pub fn from_config(config: &LlmConfig) -> Self {
        let service = config.credential().map(|key| {
            Box::new(crate::client::OpenAiClient::new(key.to_string(), &config.base_url))
                as Box<dyn CompletionService>
        });
        Self::new(config.model.clone(), service)
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: String, temperature: f32) -> Result<String, LlmError> {
        let service = self.service.as_deref().ok_or(LlmError::NotConfigured)?;
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature,
        };
        service.complete(&request).await
    }

    /// One uncached generation for a record's thesis.
    pub async fn generate(&self, purpose: Purpose, thesis: &str) -> Result<String, LlmError> {
        self.complete(purpose.prompt(thesis), purpose.temperature()).await
    }

    pub async fn practice_case(&self, thesis: &str) -> Result<String, LlmError> {
        self.generate(Purpose::PracticeCase, thesis).await
    }

    pub async fn assertions(&self, thesis: &str) -> Result<String, LlmError> {
        self.generate(Purpose::Assertions, thesis).await
    }

    /// Generate through `cache`: any stored entry, ready or failed, is returned
    /// without a new request. A missing credential is reported but not stored.
    pub async fn generate_cached(
        &self,
        cache: &mut GenerationCache,
        id: &str,
        purpose: Purpose,
        thesis: &str,
    ) -> Result<Generation, LlmError> {
        if let Some(hit) = cache.get(id, purpose) {
            return Ok(hit.clone());
        }
        let generation = match self.generate(purpose, thesis).await {
            Ok(text) => {
                info!(id, purpose = purpose.label(), "generation ready");
                Generation::Ready(text)
            }
            Err(LlmError::NotConfigured) => return Err(LlmError::NotConfigured),
            Err(e) => {
                warn!(id, purpose = purpose.label(), error = %e, "generation failed");
                Generation::Failed(e.user_message())
            }
        };
        cache.insert(id, purpose, generation.clone());
        Ok(generation)
    }

    /// Answer `question` from the given judgments only.
    pub async fn answer(
        &self,
        question: &str,
        context: &[ContextEntry],
    ) -> Result<Answer, LlmError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(Answer::BlankQuestion);
        }
        let prompt = question_prompt(question, &build_context(context));
        info!(context = context.len(), "answering question");
        let text = self.complete(prompt, QUESTION_TEMPERATURE).await?;
        if is_refusal(&text) {
            info!(context = context.len(), "answer not found in context");
            return Ok(Answer::NotInContext);
        }
        Ok(Answer::Text(text))
    }
}
