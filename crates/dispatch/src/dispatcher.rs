//! Action dispatcher
//!
//! One worker task per submitted action. The dispatcher tracks the latest
//! request per [`ActionKind`]; submitting cancels and supersedes the
//! previous request of that kind, and a worker may only report after
//! atomically claiming completion; a superseded worker claims nothing and
//! stays silent. Cancellation drops the worker's in-flight future, which
//! kills any child process it was waiting on.

use std::{collections::HashMap, sync::Arc, time::Duration};

use assistant::EditPipeline;
use chrono::Utc;
use executors::{ExecutionOrchestrator, LanguageTag, preview};
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use workspace_utils::browser;

use crate::events::{ActionKind, ShellEvent};

/// Dispatcher knobs. Run-phase timeouts live in
/// [`executors::ExecutorConfig`]; this covers the rest.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Timeout for one backend round-trip of an assist request.
    pub assist_timeout_ms: u64,
    /// Whether a finished preview is opened in the default browser.
    /// Disabled in tests and by shells that embed their own webview.
    pub open_browser: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            assist_timeout_ms: 60_000,
            open_browser: true,
        }
    }
}

struct Inflight {
    id: Uuid,
    cancel: CancellationToken,
}

/// Dispatches shell actions onto worker tasks and reports back over an
/// event channel.
pub struct ActionDispatcher {
    orchestrator: ExecutionOrchestrator,
    pipeline: EditPipeline,
    config: DispatcherConfig,
    events: mpsc::Sender<ShellEvent>,
    inflight: RwLock<HashMap<ActionKind, Inflight>>,
}

impl ActionDispatcher {
    pub fn new(
        orchestrator: ExecutionOrchestrator,
        pipeline: EditPipeline,
        events: mpsc::Sender<ShellEvent>,
    ) -> Arc<Self> {
        Self::with_config(orchestrator, pipeline, events, DispatcherConfig::default())
    }

    pub fn with_config(
        orchestrator: ExecutionOrchestrator,
        pipeline: EditPipeline,
        events: mpsc::Sender<ShellEvent>,
        config: DispatcherConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            orchestrator,
            pipeline,
            config,
            events,
            inflight: RwLock::new(HashMap::new()),
        })
    }

    /// Execute a snippet; the result arrives as `RunCompleted` or `Failed`.
    pub async fn submit_run(self: &Arc<Self>, code: String, language: LanguageTag) -> Uuid {
        let (id, token) = self.begin(ActionKind::Run).await;
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.started(ActionKind::Run, id).await;
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    this.cancelled(ActionKind::Run, id).await;
                    return;
                }
                outcome = this.orchestrator.execute(&code, language) => outcome,
            };
            if !this.complete(ActionKind::Run, id).await {
                return;
            }
            let event = match outcome {
                Ok(result) => ShellEvent::RunCompleted {
                    request_id: id,
                    result,
                    timestamp: Utc::now(),
                },
                Err(err) => ShellEvent::Failed {
                    kind: ActionKind::Run,
                    request_id: id,
                    error: err.to_string(),
                    timestamp: Utc::now(),
                },
            };
            this.emit(event).await;
        });
        id
    }

    /// Compose a preview document, optionally open the browser on it, and
    /// report the (now sweep-owned) path as `PreviewReady`.
    pub async fn submit_preview(self: &Arc<Self>, code: String, language: LanguageTag) -> Uuid {
        let (id, _token) = self.begin(ActionKind::Preview).await;
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.started(ActionKind::Preview, id).await;
            let outcome = preview::write_preview(&code, language);
            if !this.complete(ActionKind::Preview, id).await {
                return; // stale; the artifact guard reclaims the file
            }
            let event = match outcome {
                Ok(artifact) => {
                    let opened = if this.config.open_browser {
                        browser::open_path(artifact.path())
                    } else {
                        Ok(())
                    };
                    match opened {
                        Ok(()) => ShellEvent::PreviewReady {
                            request_id: id,
                            path: artifact.into_path(),
                            timestamp: Utc::now(),
                        },
                        Err(err) => ShellEvent::Failed {
                            kind: ActionKind::Preview,
                            request_id: id,
                            error: format!("failed to open browser: {err}"),
                            timestamp: Utc::now(),
                        },
                    }
                }
                Err(err) => ShellEvent::Failed {
                    kind: ActionKind::Preview,
                    request_id: id,
                    error: err.to_string(),
                    timestamp: Utc::now(),
                },
            };
            this.emit(event).await;
        });
        id
    }

    /// Request an AI edit proposal; arrives as `AssistCompleted` (including
    /// inline backend-error proposals) or `Failed` (guard/timeout).
    pub async fn submit_assist(
        self: &Arc<Self>,
        code: String,
        language: LanguageTag,
        instruction: String,
    ) -> Uuid {
        let (id, token) = self.begin(ActionKind::Assist).await;
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.started(ActionKind::Assist, id).await;
            let timeout = Duration::from_millis(this.config.assist_timeout_ms);
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    this.cancelled(ActionKind::Assist, id).await;
                    return;
                }
                outcome = tokio::time::timeout(
                    timeout,
                    this.pipeline.propose_edit(&code, language, &instruction),
                ) => outcome,
            };
            if !this.complete(ActionKind::Assist, id).await {
                return;
            }
            let event = match outcome {
                Ok(Ok(proposal)) => ShellEvent::AssistCompleted {
                    request_id: id,
                    proposal,
                    timestamp: Utc::now(),
                },
                Ok(Err(err)) => ShellEvent::Failed {
                    kind: ActionKind::Assist,
                    request_id: id,
                    error: err.to_string(),
                    timestamp: Utc::now(),
                },
                Err(_) => ShellEvent::Failed {
                    kind: ActionKind::Assist,
                    request_id: id,
                    error: format!(
                        "assist request timed out after {}ms",
                        this.config.assist_timeout_ms
                    ),
                    timestamp: Utc::now(),
                },
            };
            this.emit(event).await;
        });
        id
    }

    /// Cancel the in-flight request of `kind`, if any. The cancelled worker
    /// reports a `Cancelled` event.
    pub async fn cancel(&self, kind: ActionKind) {
        if let Some(inflight) = self.inflight.read().await.get(&kind) {
            tracing::info!(%kind, request_id = %inflight.id, "cancelling in-flight request");
            inflight.cancel.cancel();
        }
    }

    /// Register a fresh request as the latest of its kind, cancelling and
    /// superseding the previous one.
    async fn begin(&self, kind: ActionKind) -> (Uuid, CancellationToken) {
        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        let mut inflight = self.inflight.write().await;
        if let Some(prev) = inflight.insert(
            kind,
            Inflight {
                id,
                cancel: token.clone(),
            },
        ) {
            tracing::debug!(%kind, superseded = %prev.id, "superseding in-flight request");
            prev.cancel.cancel();
        }
        (id, token)
    }

    /// Atomically claim the right to report for (kind, id). Returns false
    /// when the request was superseded and the worker must stay silent.
    async fn complete(&self, kind: ActionKind, id: Uuid) -> bool {
        let mut inflight = self.inflight.write().await;
        if inflight.get(&kind).is_some_and(|entry| entry.id == id) {
            inflight.remove(&kind);
            true
        } else {
            false
        }
    }

    async fn started(&self, kind: ActionKind, id: Uuid) {
        self.emit(ShellEvent::Started {
            kind,
            request_id: id,
            timestamp: Utc::now(),
        })
        .await;
    }

    async fn cancelled(&self, kind: ActionKind, id: Uuid) {
        if self.complete(kind, id).await {
            self.emit(ShellEvent::Cancelled {
                kind,
                request_id: id,
                timestamp: Utc::now(),
            })
            .await;
        }
    }

    async fn emit(&self, event: ShellEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("shell event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant::providers::{BackendError, GenerativeBackend};
    use async_trait::async_trait;

    /// Backend stub that answers `text` after `delay_ms`.
    struct SlowStub {
        delay_ms: u64,
        text: String,
    }

    impl SlowStub {
        fn instant(text: &str) -> Self {
            Self {
                delay_ms: 0,
                text: text.to_string(),
            }
        }

        fn slow(delay_ms: u64) -> Self {
            Self {
                delay_ms,
                text: "slow answer".to_string(),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for SlowStub {
        fn name(&self) -> &'static str {
            "Stub"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(self.text.clone())
        }
    }

    fn dispatcher(
        backend: SlowStub,
        config: DispatcherConfig,
    ) -> (Arc<ActionDispatcher>, mpsc::Receiver<ShellEvent>) {
        let (tx, rx) = mpsc::channel(32);
        let dispatcher = ActionDispatcher::with_config(
            ExecutionOrchestrator::default(),
            EditPipeline::new(Arc::new(backend)),
            tx,
            config,
        );
        (dispatcher, rx)
    }

    fn headless() -> DispatcherConfig {
        DispatcherConfig {
            open_browser: false,
            ..Default::default()
        }
    }

    async fn next_event(rx: &mut mpsc::Receiver<ShellEvent>) -> ShellEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn preview_reports_a_ready_document() {
        let (dispatcher, mut rx) = dispatcher(SlowStub::instant("unused"), headless());
        let id = dispatcher
            .submit_preview("<p>hi</p>".to_string(), LanguageTag::Html)
            .await;

        assert!(matches!(
            next_event(&mut rx).await,
            ShellEvent::Started { kind: ActionKind::Preview, .. }
        ));
        match next_event(&mut rx).await {
            ShellEvent::PreviewReady { request_id, path, .. } => {
                assert_eq!(request_id, id);
                let document = std::fs::read_to_string(&path).unwrap();
                assert!(document.contains("<p>hi</p>"));
                std::fs::remove_file(path).unwrap();
            }
            other => panic!("expected PreviewReady, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn preview_of_an_executable_language_fails() {
        let (dispatcher, mut rx) = dispatcher(SlowStub::instant("unused"), headless());
        let id = dispatcher
            .submit_preview("print(1)".to_string(), LanguageTag::Python)
            .await;

        let _started = next_event(&mut rx).await;
        match next_event(&mut rx).await {
            ShellEvent::Failed { kind, request_id, error, .. } => {
                assert_eq!(kind, ActionKind::Preview);
                assert_eq!(request_id, id);
                assert!(error.contains("live preview"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn markup_run_reports_preview_guidance() {
        let (dispatcher, mut rx) = dispatcher(SlowStub::instant("unused"), headless());
        let id = dispatcher
            .submit_run("body {}".to_string(), LanguageTag::Css)
            .await;

        let _started = next_event(&mut rx).await;
        match next_event(&mut rx).await {
            ShellEvent::RunCompleted { request_id, result, .. } => {
                assert_eq!(request_id, id);
                assert!(!result.success);
                assert!(result.stderr.contains("Live Preview"));
            }
            other => panic!("expected RunCompleted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn assist_delivers_a_cleaned_proposal() {
        let (dispatcher, mut rx) =
            dispatcher(SlowStub::instant("```python\nprint(2)\n```"), headless());
        let id = dispatcher
            .submit_assist(
                "print(1)".to_string(),
                LanguageTag::Python,
                "bump it".to_string(),
            )
            .await;

        let _started = next_event(&mut rx).await;
        match next_event(&mut rx).await {
            ShellEvent::AssistCompleted { request_id, proposal, .. } => {
                assert_eq!(request_id, id);
                assert_eq!(proposal.cleaned_code, "print(2)");
                assert!(proposal.is_pending());
            }
            other => panic!("expected AssistCompleted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_instruction_fails_without_a_backend_call() {
        let (dispatcher, mut rx) = dispatcher(SlowStub::instant("unused"), headless());
        dispatcher
            .submit_assist("code".to_string(), LanguageTag::Python, "   ".to_string())
            .await;

        let _started = next_event(&mut rx).await;
        match next_event(&mut rx).await {
            ShellEvent::Failed { kind, error, .. } => {
                assert_eq!(kind, ActionKind::Assist);
                assert!(error.contains("empty"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancel_reports_cancelled_with_the_request_id() {
        let (dispatcher, mut rx) = dispatcher(SlowStub::slow(10_000), headless());
        let id = dispatcher
            .submit_assist(
                "code".to_string(),
                LanguageTag::Python,
                "take your time".to_string(),
            )
            .await;

        let _started = next_event(&mut rx).await;
        dispatcher.cancel(ActionKind::Assist).await;
        match next_event(&mut rx).await {
            ShellEvent::Cancelled { kind, request_id, .. } => {
                assert_eq!(kind, ActionKind::Assist);
                assert_eq!(request_id, id);
            }
            other => panic!("expected Cancelled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn superseded_requests_stay_silent() {
        let (dispatcher, mut rx) = dispatcher(SlowStub::slow(300), headless());
        let first = dispatcher
            .submit_assist("code".to_string(), LanguageTag::Python, "one".to_string())
            .await;
        let second = dispatcher
            .submit_assist("code".to_string(), LanguageTag::Python, "two".to_string())
            .await;

        let mut completed = Vec::new();
        loop {
            match next_event(&mut rx).await {
                ShellEvent::Started { .. } => continue,
                event => {
                    completed.push(event.clone());
                    if matches!(event, ShellEvent::AssistCompleted { .. }) {
                        break;
                    }
                }
            }
        }

        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].request_id(), second);
        assert_ne!(completed[0].request_id(), first);
    }

    #[tokio::test]
    async fn slow_assists_hit_the_timeout() {
        let config = DispatcherConfig {
            assist_timeout_ms: 100,
            open_browser: false,
        };
        let (dispatcher, mut rx) = dispatcher(SlowStub::slow(10_000), config);
        dispatcher
            .submit_assist("code".to_string(), LanguageTag::Python, "hurry".to_string())
            .await;

        let _started = next_event(&mut rx).await;
        match next_event(&mut rx).await {
            ShellEvent::Failed { error, .. } => assert!(error.contains("timed out")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
