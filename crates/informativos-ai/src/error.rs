use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion service not configured (no API key)")]
    NotConfigured,

    #[error("authentication rejected by completion service ({0})")]
    Authentication(u16),

    #[error("completion service rate limit exceeded")]
    RateLimited,

    #[error("server returned {status}: {body}")]
    Service { status: u16, body: String },

    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid completion response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Message shown to the user; one wording per failure category.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => "Chave da API OpenAI não configurada. Defina OPENAI_API_KEY \
                                    (ou use --api-key) para usar esta funcionalidade."
                .to_string(),
            Self::Authentication(_) => "Erro de autenticação com a API OpenAI. Verifique se sua \
                                        chave de API está correta."
                .to_string(),
            Self::RateLimited => {
                "Limite de taxa da API OpenAI excedido. Tente novamente mais tarde.".to_string()
            }
            other => format!("Erro ao chamar a API OpenAI: {other}"),
        }
    }
}

/// Map a non-success HTTP status to its failure category.
pub fn classify_status(status: u16, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::Authentication(status),
        429 => LlmError::RateLimited,
        _ => LlmError::Service { status, body },
    }
}
