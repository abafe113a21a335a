use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::agent::{AgentId, AgentProfile, AgentRegistry, synthesize};
use crate::dispatch::{DispatchResult, Dispatcher, FailureKind};
use crate::error::CoreResult;
use crate::llm::{BackendMetrics, CompletionBackend, CompletionRequest};
use crate::session::{ConversationSession, SessionTicket};
use crate::trace::SessionTrace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Opened(AgentId),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnMetrics {
    pub latency: Duration,
    pub data_points: Option<u32>,
    pub confidence: Option<u8>,
}

/// What the presentation layer renders for one finished turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub agent: AgentId,
    pub text: String,
    pub source: TurnSource,
    pub metrics: Option<TurnMetrics>,
}

/// A turn whose user message is already in history and whose request is ready to
/// send. Running it needs only the dispatcher, so the studio stays free to switch
/// or close agents while the exchange is in flight.
#[derive(Debug)]
pub struct PendingTurn {
    ticket: SessionTicket,
    request: CompletionRequest,
    query: String,
    started: Instant,
}

impl PendingTurn {
    pub fn ticket(&self) -> SessionTicket {
        self.ticket
    }

    pub fn request(&self) -> &CompletionRequest {
        &self.request
    }

    pub async fn run<B: CompletionBackend>(self, dispatcher: &Dispatcher<B>) -> CompletedTurn {
        let result = dispatcher.send(&self.request).await;
        self.complete(result)
    }

    /// Runs the turn unless `cancel` completes first, in which case the exchange
    /// is dropped and nothing is returned.
    pub async fn run_until<B: CompletionBackend, C: Future<Output = ()>>(
        self,
        dispatcher: &Dispatcher<B>,
        cancel: C,
    ) -> Option<CompletedTurn> {
        let result = dispatcher.send_until(&self.request, cancel).await?;
        Some(self.complete(result))
    }

    fn complete(self, result: DispatchResult) -> CompletedTurn {
        CompletedTurn {
            ticket: self.ticket,
            query: self.query,
            started: self.started,
            result,
        }
    }
}

#[derive(Debug)]
pub struct CompletedTurn {
    ticket: SessionTicket,
    query: String,
    started: Instant,
    result: DispatchResult,
}

impl CompletedTurn {
    pub fn result(&self) -> &DispatchResult {
        &self.result
    }
}

type Listener = Box<dyn FnMut(SessionEvent) + Send>;

/// Owns the open conversation and applies the turn policy: live answers grow the
/// history, failures are answered by the fallback table.
pub struct Studio<B> {
    dispatcher: Arc<Dispatcher<B>>,
    session: ConversationSession,
    record_fallback_in_history: bool,
    listener: Option<Listener>,
    trace: Option<SessionTrace>,
}

impl<B: CompletionBackend> Studio<B> {
    pub fn new(dispatcher: Dispatcher<B>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            session: ConversationSession::new(),
            record_fallback_in_history: false,
            listener: None,
            trace: None,
        }
    }

    pub fn with_listener<F: FnMut(SessionEvent) + Send + 'static>(mut self, listener: F) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn record_fallback_in_history(mut self, enabled: bool) -> Self {
        self.record_fallback_in_history = enabled;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        self.dispatcher.registry()
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher<B>> {
        Arc::clone(&self.dispatcher)
    }

    pub fn session(&self) -> &ConversationSession {
        &self.session
    }

    pub fn active_profile(&self) -> Option<&AgentProfile> {
        let id = self.session.active_agent()?;
        self.registry().get(id).ok()
    }

    pub fn open(&mut self, selector: &str) -> CoreResult<&AgentProfile> {
        let id = self.session.open(self.dispatcher.registry(), selector)?;
        self.emit(SessionEvent::Opened(id));
        self.registry().get(id)
    }

    pub fn close(&mut self) {
        if self.session.active_agent().is_none() {
            return;
        }
        self.session.close();
        self.emit(SessionEvent::Closed);
    }

    /// Validates the input, snapshots the request and appends the user message.
    /// Blank input yields `Ok(None)` and changes nothing.
    pub fn begin_turn(&mut self, text: &str) -> CoreResult<Option<PendingTurn>> {
        let ticket = self.session.ticket()?;
        let query = text.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let started = Instant::now();
        let request = self.dispatcher.prepare(&self.session, query)?;
        self.session.append_user(query)?;

        Ok(Some(PendingTurn {
            ticket,
            request,
            query: query.to_string(),
            started,
        }))
    }

    /// Applies a finished exchange. Returns `Ok(None)` when the session it was
    /// issued for has since been closed or replaced.
    pub fn finish_turn(&mut self, completed: CompletedTurn) -> CoreResult<Option<TurnResult>> {
        let CompletedTurn {
            ticket,
            query,
            started,
            result,
        } = completed;
        let agent = ticket.agent();

        if !self.session.is_current(&ticket) {
            self.log_turn("turn.stale", agent, None, started.elapsed());
            return Ok(None);
        }

        match result {
            DispatchResult::Success { text, metrics } => {
                self.session.append_assistant(&text)?;
                let latency = started.elapsed();
                self.log_turn("turn.live", agent, None, latency);
                Ok(Some(TurnResult {
                    agent,
                    text,
                    source: TurnSource::Live,
                    metrics: metrics.map(|metrics| live_metrics(metrics, latency)),
                }))
            }
            DispatchResult::Failure { kind, .. } => {
                let fallback = synthesize(self.registry(), agent, &query, started)?;
                if self.record_fallback_in_history {
                    self.session.append_assistant(&fallback.text)?;
                }
                self.log_turn("turn.fallback", agent, Some(kind), fallback.latency);
                Ok(Some(TurnResult {
                    agent,
                    text: fallback.text,
                    source: TurnSource::Fallback,
                    metrics: Some(TurnMetrics {
                        latency: fallback.latency,
                        data_points: Some(fallback.data_points),
                        confidence: Some(fallback.confidence),
                    }),
                }))
            }
        }
    }

    pub async fn submit(&mut self, text: &str) -> CoreResult<Option<TurnResult>> {
        let Some(pending) = self.begin_turn(text)? else {
            return Ok(None);
        };
        let dispatcher = Arc::clone(&self.dispatcher);
        let completed = pending.run(&dispatcher).await;
        self.finish_turn(completed)
    }

    fn emit(&mut self, event: SessionEvent) {
        if let Some(trace) = &self.trace {
            match event {
                SessionEvent::Opened(id) => trace.log_event("session.open", &format!("agent={id}")),
                SessionEvent::Closed => trace.log_event("session.close", "closed"),
            }
        }
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }

    fn log_turn(
        &self,
        kind: &str,
        agent: AgentId,
        failure: Option<FailureKind>,
        latency: Duration,
    ) {
        let Some(trace) = &self.trace else {
            return;
        };
        let failure = match failure {
            Some(FailureKind::Timeout) => " failure=timeout",
            Some(FailureKind::BackendError) => " failure=backend_error",
            None => "",
        };
        trace.log_event(
            kind,
            &format!("agent={agent}{failure} latency_ms={}", latency.as_millis()),
        );
    }
}

fn live_metrics(metrics: BackendMetrics, latency: Duration) -> TurnMetrics {
    TurnMetrics {
        latency,
        data_points: metrics.data_points,
        confidence: metrics.confidence,
    }
}
