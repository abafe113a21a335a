use serde::{Deserialize, Serialize};

use super::provider::{
    CompletionBackend, CompletionOutput, CompletionRequest, LlmError, LlmResult,
    error_body_excerpt,
};
use crate::http::HttpClient;

/// Fixed generation parameters sent with every chat-completions request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// OpenAI-compatible `chat/completions` backend.
#[derive(Debug, Clone)]
pub struct ChatCompletionsProvider {
    http: HttpClient,
    api_key: String,
    params: GenerationParams,
}

impl ChatCompletionsProvider {
    pub fn new(
        http: HttpClient,
        api_key: Option<String>,
        params: GenerationParams,
    ) -> LlmResult<Self> {
        let api_key = api_key
            .filter(|v| !v.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            http,
            api_key,
            params,
        })
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.params.model,
            messages: request
                .messages
                .iter()
                .map(|message| ChatRequestMessage {
                    role: message.role.as_str(),
                    content: &message.text,
                })
                .collect(),
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        }
    }

    fn extract_text(resp: ChatResponse) -> LlmResult<String> {
        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

impl CompletionBackend for ChatCompletionsProvider {
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionOutput> {
        let payload = self.build_request(request);
        let resp = self
            .http
            .post_json(&request.endpoint, Some(self.api_key.as_str()), &payload)
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        if !(200..300).contains(&resp.status) {
            return Err(LlmError::HttpStatus {
                status: resp.status,
                body: error_body_excerpt(&resp.body),
            });
        }

        let parsed = serde_json::from_str::<ChatResponse>(&resp.body)
            .map_err(|err| LlmError::Parse(err.to_string()))?;
        let text = Self::extract_text(parsed)?;
        Ok(CompletionOutput {
            text,
            metrics: None,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
