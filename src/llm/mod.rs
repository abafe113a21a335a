pub mod chat;
pub mod local;
pub mod provider;

pub use provider::{
    BackendMetrics, ChatMessage, CompletionBackend, CompletionOutput, CompletionRequest, LlmError,
    LlmResult,
};

use chat::ChatCompletionsProvider;
use local::LocalAgentProvider;

/// The backend selected by configuration.
#[derive(Debug, Clone)]
pub enum AnyBackend {
    Chat(ChatCompletionsProvider),
    Local(LocalAgentProvider),
}

impl CompletionBackend for AnyBackend {
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionOutput> {
        match self {
            Self::Chat(provider) => provider.complete(request).await,
            Self::Local(provider) => provider.complete(request).await,
        }
    }
}
