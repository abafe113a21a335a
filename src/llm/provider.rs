use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::Value;

use crate::agent::AgentId;
use crate::session::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// Outbound exchange for one turn: the system instruction first, then the bounded
/// history, then the new user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub agent: AgentId,
    pub endpoint: String,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn latest_user_text(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map_or("", |message| message.text.as_str())
    }
}

/// Figures some backends report next to the completion text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendMetrics {
    pub data_points: Option<u32>,
    pub confidence: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutput {
    pub text: String,
    pub metrics: Option<BackendMetrics>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    MissingApiKey,
    HttpStatus { status: u16, body: String },
    Transport(String),
    Parse(String),
    EmptyResponse,
}

impl Display for LlmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "missing ATELIER_API_KEY"),
            Self::HttpStatus { status, body } => {
                write!(f, "backend request failed with status {status}: {body}")
            }
            Self::Transport(msg) => write!(f, "backend transport error: {msg}"),
            Self::Parse(msg) => write!(f, "backend parse error: {msg}"),
            Self::EmptyResponse => write!(f, "backend response had no completion text"),
        }
    }
}

impl Error for LlmError {}

pub type LlmResult<T> = std::result::Result<T, LlmError>;

pub trait CompletionBackend {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = LlmResult<CompletionOutput>> + Send;
}

pub(crate) fn error_body_excerpt(body: &str) -> String {
    body.chars().take(400).collect()
}

/// Reads a count that may arrive as a number or as text such as `"1000+"`.
pub(crate) fn lenient_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => leading_digits(text).parse().ok(),
        _ => None,
    }
}

/// Reads a percentage that may arrive as `98`, `0.98` or `"98%"`.
pub(crate) fn lenient_percent(value: &Value) -> Option<u8> {
    let percent = match value {
        Value::Number(number) => {
            let raw = number.as_f64()?;
            if raw > 0.0 && raw <= 1.0 && !number.is_u64() {
                raw * 100.0
            } else {
                raw
            }
        }
        Value::String(text) => leading_digits(text).parse::<f64>().ok()?,
        _ => return None,
    };

    if (0.0..=100.0).contains(&percent) {
        Some(percent.round() as u8)
    } else {
        None
    }
}

fn leading_digits(text: &str) -> &str {
    let text = text.trim();
    let end = text
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(text.len());
    &text[..end]
}
