use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::{
    BackendMetrics, CompletionBackend, CompletionOutput, CompletionRequest, LlmError, LlmResult,
    error_body_excerpt, lenient_count, lenient_percent,
};
use crate::agent::AgentId;
use crate::http::HttpClient;

/// Single-shot local agent server: posts only the latest user query and reads back
/// the agent's output together with the figures it reports.
#[derive(Debug, Clone)]
pub struct LocalAgentProvider {
    http: HttpClient,
}

impl LocalAgentProvider {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn endpoint_for(base_url: &str, agent: AgentId) -> String {
        format!("{}/agent/{agent}", base_url.trim_end_matches('/'))
    }
}

impl CompletionBackend for LocalAgentProvider {
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionOutput> {
        let payload = LocalQuery {
            query: request.latest_user_text(),
        };
        let resp = self
            .http
            .post_json(&request.endpoint, None, &payload)
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        if !(200..300).contains(&resp.status) {
            return Err(LlmError::HttpStatus {
                status: resp.status,
                body: error_body_excerpt(&resp.body),
            });
        }

        let parsed = serde_json::from_str::<LocalAnswer>(&resp.body)
            .map_err(|err| LlmError::Parse(err.to_string()))?;

        let text = non_blank(parsed.output)
            .or_else(|| non_blank(parsed.message))
            .ok_or(LlmError::EmptyResponse)?;

        let metrics = BackendMetrics {
            data_points: parsed.data_points.as_ref().and_then(lenient_count),
            confidence: parsed.confidence.as_ref().and_then(lenient_percent),
        };
        let metrics = (metrics != BackendMetrics::default()).then_some(metrics);

        Ok(CompletionOutput { text, metrics })
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Serialize)]
struct LocalQuery<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct LocalAnswer {
    output: Option<String>,
    message: Option<String>,
    data_points: Option<Value>,
    confidence: Option<Value>,
}
