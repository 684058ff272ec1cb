//! Shared platform glue for the Quill editor core.
//!
//! Home of the temp-artifact manager plus the small pieces every other
//! crate leans on: default-browser launch, toolchain lookup, tracing setup.

pub mod artifact;
pub mod browser;
pub mod logging;
pub mod toolchain;

pub use artifact::{ArtifactKind, TempArtifact, sweep_stale};
pub use toolchain::ToolchainError;
