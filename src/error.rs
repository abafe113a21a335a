use std::error::Error;
use std::fmt::{Display, Formatter};

/// Usage errors surfaced directly to the caller. Backend failures never use this
/// type; they travel as [`crate::dispatch::DispatchResult::Failure`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    NotFound(String),
    InvalidState(String),
}

impl CoreError {
    pub(crate) fn no_open_agent() -> Self {
        Self::InvalidState("no agent is open".to_string())
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(selector) => write!(f, "unknown agent '{selector}'"),
            Self::InvalidState(reason) => write!(f, "invalid state: {reason}"),
        }
    }
}

impl Error for CoreError {}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
