//! Execution and preview core of the Quill editor.
//!
//! Given a snippet and a language selector this crate either runs the
//! snippet through the language's toolchain ([`orchestrator`]) or composes
//! a browser-ready HTML document from it ([`preview`]). Both paths go
//! through the temp-artifact manager in `utils`; neither retains state
//! across calls.

pub mod language;
pub mod orchestrator;
pub mod preview;

pub use language::{ExecutionModel, LanguageTag};
pub use orchestrator::{
    DiagnosticStage, ExecutionOrchestrator, ExecutionResult, ExecutorConfig, ExecutorError,
};
pub use preview::{PreviewError, compose, write_preview};
