//! Edit pipeline
//!
//! `propose_edit` turns (code, language, instruction) into an
//! [`AIProposal`]. Backend failures are rendered into the proposal text,
//! never raised past the pipeline; the only error a caller sees is the
//! empty-instruction guard, which short-circuits before any backend call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use executors::LanguageTag;

use crate::fences::strip_fences;
use crate::prompt::PromptContext;
use crate::providers::GenerativeBackend;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssistantError {
    #[error("instruction is empty")]
    EmptyInstruction,
}

/// The shell's verdict on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Pending,
    Accepted,
    Rejected,
}

/// A proposed code edit. Created pending; decided once; discarded after
/// application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIProposal {
    pub raw_response: String,
    pub cleaned_code: String,
    pub decision: Decision,
}

impl AIProposal {
    pub fn is_pending(&self) -> bool {
        self.decision == Decision::Pending
    }

    /// Whether the backend call behind this proposal failed (the error text
    /// lives in `raw_response`).
    pub fn is_error(&self) -> bool {
        self.cleaned_code.is_empty() && self.raw_response.starts_with("Error")
    }

    /// Record the user's verdict. Only the first decision sticks.
    pub fn decide(&mut self, accepted: bool) {
        if self.decision != Decision::Pending {
            tracing::warn!(decision = ?self.decision, "proposal already decided, ignoring");
            return;
        }
        self.decision = if accepted {
            Decision::Accepted
        } else {
            Decision::Rejected
        };
    }
}

/// Apply a decided proposal to a buffer snapshot, returning the new buffer
/// contents. Accepted proposals replace the buffer; rejected ones are
/// appended under an "AI Suggestion" separator comment in the buffer's
/// language. Pending proposals leave the buffer alone.
pub fn apply_decision(buffer: &str, proposal: &AIProposal, language: LanguageTag) -> String {
    match proposal.decision {
        Decision::Accepted => proposal.cleaned_code.clone(),
        Decision::Rejected => format!(
            "{buffer}\n\n{}\n{}",
            language.comment_line("AI Suggestion:"),
            proposal.cleaned_code
        ),
        Decision::Pending => buffer.to_string(),
    }
}

/// The AI edit pipeline: prompt assembly, one backend call, response
/// normalization. Owns no buffer state.
pub struct EditPipeline {
    backend: Arc<dyn GenerativeBackend>,
}

impl EditPipeline {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Request a code edit for `current_code` following `instruction`.
    ///
    /// Fails only on an empty/whitespace instruction, in which case no
    /// backend call is made. Everything the backend does wrong comes back
    /// as a proposal whose `raw_response` starts with `"Error"` and whose
    /// `cleaned_code` is empty.
    pub async fn propose_edit(
        &self,
        current_code: &str,
        language: LanguageTag,
        instruction: &str,
    ) -> Result<AIProposal, AssistantError> {
        if instruction.trim().is_empty() {
            return Err(AssistantError::EmptyInstruction);
        }

        let prompt = PromptContext::new(language, current_code, instruction).render();
        tracing::debug!(backend = self.backend.name(), %language, "requesting edit proposal");

        match self.backend.generate(&prompt).await {
            Ok(text) => {
                let raw = text.trim().to_string();
                Ok(AIProposal {
                    cleaned_code: strip_fences(&raw),
                    raw_response: raw,
                    decision: Decision::Pending,
                })
            }
            Err(err) => {
                tracing::warn!(backend = self.backend.name(), %err, "backend call failed");
                Ok(AIProposal {
                    raw_response: format!("Error from {} backend: {err}", self.backend.name()),
                    cleaned_code: String::new(),
                    decision: Decision::Pending,
                })
            }
        }
    }
}
