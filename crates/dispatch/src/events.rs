//! Events delivered to the shell.

use std::path::PathBuf;

use assistant::AIProposal;
use chrono::{DateTime, Utc};
use executors::ExecutionResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The user actions the dispatcher serializes independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Run,
    Preview,
    Assist,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Run => write!(f, "run"),
            ActionKind::Preview => write!(f, "preview"),
            ActionKind::Assist => write!(f, "assist"),
        }
    }
}

/// Events emitted while a request moves through a worker. Every event
/// carries the request id handed back at submission, so the shell can
/// correlate (and ignore anything it no longer cares about).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShellEvent {
    /// Worker picked the request up
    Started {
        kind: ActionKind,
        request_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Run finished; the result is ready for the output pane
    RunCompleted {
        request_id: Uuid,
        result: ExecutionResult,
        timestamp: DateTime<Utc>,
    },

    /// Preview document written (and the browser pointed at it); the file
    /// at `path` now belongs to the next-launch sweep
    PreviewReady {
        request_id: Uuid,
        path: PathBuf,
        timestamp: DateTime<Utc>,
    },

    /// Edit proposal ready for the accept/reject decision
    AssistCompleted {
        request_id: Uuid,
        proposal: AIProposal,
        timestamp: DateTime<Utc>,
    },

    /// The request failed; `error` is user-visible text
    Failed {
        kind: ActionKind,
        request_id: Uuid,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// The request was cancelled before finishing
    Cancelled {
        kind: ActionKind,
        request_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl ShellEvent {
    /// The request this event belongs to.
    pub fn request_id(&self) -> Uuid {
        match self {
            ShellEvent::Started { request_id, .. }
            | ShellEvent::RunCompleted { request_id, .. }
            | ShellEvent::PreviewReady { request_id, .. }
            | ShellEvent::AssistCompleted { request_id, .. }
            | ShellEvent::Failed { request_id, .. }
            | ShellEvent::Cancelled { request_id, .. } => *request_id,
        }
    }
}
