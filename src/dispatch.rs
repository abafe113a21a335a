use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::agent::AgentRegistry;
use crate::error::{CoreError, CoreResult};
use crate::llm::{BackendMetrics, ChatMessage, CompletionBackend, CompletionRequest};
use crate::session::{ConversationSession, DEFAULT_HISTORY_WINDOW, Role};

pub const MAX_DISPATCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    BackendError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Success {
        text: String,
        metrics: Option<BackendMetrics>,
    },
    Failure {
        kind: FailureKind,
        detail: String,
    },
}

/// Sends one turn to the backend. Holds no session state: the caller owns the
/// session and applies whatever result comes back.
#[derive(Debug)]
pub struct Dispatcher<B> {
    registry: Arc<AgentRegistry>,
    backend: B,
    timeout: Duration,
    history_window: usize,
}

impl<B: CompletionBackend> Dispatcher<B> {
    pub fn new(registry: Arc<AgentRegistry>, backend: B) -> Self {
        Self {
            registry,
            backend,
            timeout: MAX_DISPATCH_TIMEOUT,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Lowers the exchange deadline. Values above [`MAX_DISPATCH_TIMEOUT`] are capped.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(MAX_DISPATCH_TIMEOUT);
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Assembles `[system] + last N history messages + [new user message]`.
    pub fn prepare(
        &self,
        session: &ConversationSession,
        new_user_text: &str,
    ) -> CoreResult<CompletionRequest> {
        let agent = session.active_agent().ok_or_else(CoreError::no_open_agent)?;
        let new_user_text = new_user_text.trim();
        if new_user_text.is_empty() {
            return Err(CoreError::InvalidState(
                "cannot dispatch an empty message".to_string(),
            ));
        }
        let profile = self.registry.get(agent)?;

        let mut messages = Vec::new();
        messages.push(ChatMessage {
            role: Role::System,
            text: profile.system_instruction.to_string(),
        });
        messages.extend(
            session
                .history_window(self.history_window)
                .map(|message| ChatMessage {
                    role: message.role,
                    text: message.text.clone(),
                }),
        );
        messages.push(ChatMessage {
            role: Role::User,
            text: new_user_text.to_string(),
        });

        Ok(CompletionRequest {
            agent,
            endpoint: profile.endpoint.clone(),
            messages,
        })
    }

    pub async fn send(&self, request: &CompletionRequest) -> DispatchResult {
        match timeout(self.timeout, self.backend.complete(request)).await {
            Ok(Ok(output)) => DispatchResult::Success {
                text: output.text,
                metrics: output.metrics,
            },
            Ok(Err(err)) => DispatchResult::Failure {
                kind: FailureKind::BackendError,
                detail: err.to_string(),
            },
            Err(_) => DispatchResult::Failure {
                kind: FailureKind::Timeout,
                detail: format!("no response within {} ms", self.timeout.as_millis()),
            },
        }
    }

    /// Like [`Dispatcher::send`], but gives up as soon as `cancel` completes. The
    /// in-flight exchange is dropped and `None` is returned.
    pub async fn send_until<C: Future<Output = ()>>(
        &self,
        request: &CompletionRequest,
        cancel: C,
    ) -> Option<DispatchResult> {
        tokio::select! {
            result = self.send(request) => Some(result),
            () = cancel => None,
        }
    }

    pub async fn dispatch(
        &self,
        session: &ConversationSession,
        new_user_text: &str,
    ) -> CoreResult<DispatchResult> {
        let request = self.prepare(session, new_user_text)?;
        Ok(self.send(&request).await)
    }
}
