//! AI edit pipeline of the Quill editor.
//!
//! Builds a prompt from the current buffer, sends it to a generative-text
//! backend, normalizes the response, and hands back a proposal the shell
//! can accept or reject. Generation is a pure prompt→text function behind
//! the [`providers::GenerativeBackend`] trait; applying a proposal to a
//! buffer is a separate, pure step; this crate never mutates editor state.

pub mod fences;
pub mod pipeline;
pub mod prompt;
pub mod providers;

pub use fences::strip_fences;
pub use pipeline::{AIProposal, AssistantError, Decision, EditPipeline, apply_decision};
pub use prompt::PromptContext;
pub use providers::{BackendConfig, BackendError, GeminiBackend, GenerativeBackend};
