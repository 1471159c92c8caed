//! Study prompts sent to the completion service.
//!
//! All prompts are a single user message written in Portuguese, the language
//! of the judgments themselves.

use informativos_core::ExplodedRow;
use serde::{Deserialize, Serialize};

/// Judgments included in a question's context.
pub const MAX_CONTEXT: usize = 5;

/// Context used when the current view has no judgments.
pub const EMPTY_CONTEXT: &str = "Nenhum julgado relevante encontrado nos filtros atuais.";

/// The exact sentence the model is told to use when the context has no answer.
pub const REFUSAL: &str =
    "Não foi possível encontrar a resposta para esta pergunta no contexto dos julgados fornecidos.";

pub const QUESTION_TEMPERATURE: f32 = 0.2;

/// Per-record generation kinds. Each is cached separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Purpose {
    PracticeCase,
    Assertions,
}

impl Purpose {
    pub fn temperature(&self) -> f32 {
        match self {
            Self::PracticeCase => 0.7,
            Self::Assertions => 0.5,
        }
    }

    pub fn prompt(&self, thesis: &str) -> String {
        match self {
            Self::PracticeCase => practice_case_prompt(thesis),
            Self::Assertions => assertions_prompt(thesis),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PracticeCase => "caso prático",
            Self::Assertions => "assertivas",
        }
    }
}

pub fn practice_case_prompt(thesis: &str) -> String {
    format!(
        "A partir da tese abaixo, extraída de um julgado do Supremo Tribunal Federal (STF), \
elabore um caso prático realista para quem estuda para concursos públicos. \
O caso deve mostrar a tese sendo aplicada a uma situação concreta, com personagens e cenário definidos, \
e terminar com uma pergunta sobre como o entendimento do STF resolve a situação.

**Tese do julgado:**
{thesis}

**Responda em markdown, neste formato:**

**Situação Hipotética:**
[cenário e personagens]

**Pergunta:**
[pergunta sobre a aplicação do julgado ao caso]
"
    )
}

pub fn assertions_prompt(thesis: &str) -> String {
    let mut items = String::new();
    for n in 1..=5 {
        items.push_str(&format!(
            "\n**{n}. Assertiva:** [texto]\n   **Gabarito:** [Certo/Errado]\n   **Justificativa:** [uma ou duas frases]\n"
        ));
    }
    format!(
        "A partir da tese abaixo, extraída de um julgado do Supremo Tribunal Federal (STF), \
escreva exatamente 5 (cinco) assertivas distintas no estilo Certo/Errado, próprias para concursos públicos. \
Para cada uma, informe o gabarito e uma justificativa curta apoiada apenas no texto fornecido.

**Tese do julgado:**
{thesis}

**Responda em markdown, neste formato:**
{items}"
    )
}

/// One judgment offered to the model as question context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub id: String,
    pub thesis: String,
}

impl From<&ExplodedRow> for ContextEntry {
    fn from(row: &ExplodedRow) -> Self {
        Self {
            id: row.id.clone(),
            thesis: row.thesis.clone(),
        }
    }
}

/// Numbered context blocks for at most [`MAX_CONTEXT`] entries.
pub fn build_context(entries: &[ContextEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }
    entries
        .iter()
        .take(MAX_CONTEXT)
        .enumerate()
        .map(|(i, e)| format!("**Julgado {} (ID: {})**:\n{}", i + 1, e.id, e.thesis))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

pub fn question_prompt(question: &str, context: &str) -> String {
    format!(
        "Você responde perguntas sobre jurisprudência do STF usando somente os julgados fornecidos abaixo. \
Não acrescente informações externas nem opiniões.

**Pergunta:**
{question}

**Julgados de referência:**
{context}

**Como responder:**
1. Leia a pergunta e os julgados de referência.
2. Se a resposta estiver nos julgados, responda de forma direta e indique o julgado que a sustenta.
3. Se a resposta não estiver nos julgados, responda apenas: \"{REFUSAL}\"
4. Não faça suposições.
"
    )
}

/// Whether a model answer is the fixed refusal sentence.
pub fn is_refusal(answer: &str) -> bool {
    answer.trim().trim_matches('"') == REFUSAL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, thesis: &str) -> ContextEntry {
        ContextEntry {
            id: id.into(),
            thesis: thesis.into(),
        }
    }

    #[test]
    fn context_blocks() {
        let ctx = build_context(&[entry("12", "Tese A."), entry("40", "Tese B.")]);
        assert_eq!(
            ctx,
            "**Julgado 1 (ID: 12)**:\nTese A.\n\n---\n\n**Julgado 2 (ID: 40)**:\nTese B."
        );
    }

    #[test]
    fn context_is_capped() {
        let entries: Vec<_> = (0..8).map(|i| entry(&i.to_string(), "t")).collect();
        let ctx = build_context(&entries);
        assert_eq!(ctx.matches("**Julgado ").count(), MAX_CONTEXT);
        assert!(!ctx.contains("ID: 5"));
    }

    #[test]
    fn empty_context_line() {
        assert_eq!(build_context(&[]), EMPTY_CONTEXT);
    }

    #[test]
    fn prompts_embed_inputs() {
        let thesis = "O ICMS não compõe a base de cálculo do PIS.";
        assert!(practice_case_prompt(thesis).contains(thesis));
        let assertions = assertions_prompt(thesis);
        assert!(assertions.contains(thesis));
        assert!(assertions.contains("**5. Assertiva:**"));
        assert!(!assertions.contains("**6. Assertiva:**"));

        let q = question_prompt("O ICMS integra o PIS?", "ctx");
        assert!(q.contains("O ICMS integra o PIS?"));
        assert!(q.contains(REFUSAL));
    }

    #[test]
    fn temperatures() {
        assert_eq!(Purpose::PracticeCase.temperature(), 0.7);
        assert_eq!(Purpose::Assertions.temperature(), 0.5);
        assert_eq!(QUESTION_TEMPERATURE, 0.2);
    }

    #[test]
    fn refusal_detection() {
        assert!(is_refusal(REFUSAL));
        assert!(is_refusal(&format!("\"{REFUSAL}\"\n")));
        assert!(!is_refusal("O ICMS não integra a base."));
    }
}
