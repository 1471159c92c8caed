//! LLM bridge: study prompts over STF judgments and a chat-completion client.

mod error;
pub use error::{LlmError, classify_status};

pub mod bridge;
pub mod cache;
pub mod client;
pub mod prompt;

pub use bridge::{Answer, DEFAULT_API_BASE, DEFAULT_MODEL, LlmBridge, LlmConfig};
pub use cache::{Generation, GenerationCache};
pub use client::{ChatMessage, CompletionRequest, CompletionService};
#[cfg(feature = "http")]
pub use client::OpenAiClient;
pub use prompt::{ContextEntry, Purpose};
