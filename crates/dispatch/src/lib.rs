//! Action dispatch for the Quill editor shell.
//!
//! The shell submits Run / Live Preview / AI-edit actions and goes back to
//! its event loop; workers run the blocking parts off-thread and deliver
//! [`events::ShellEvent`]s over a channel. Per action kind, only the most
//! recently submitted request may report: superseded workers are cancelled
//! and their results discarded, so outputs never interleave.

pub mod dispatcher;
pub mod events;

pub use dispatcher::{ActionDispatcher, DispatcherConfig};
pub use events::{ActionKind, ShellEvent};
