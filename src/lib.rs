pub mod agent;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod llm;
pub mod session;
pub mod studio;
pub mod trace;

use agent::AgentRegistry;
use anyhow::{Result, anyhow};
use config::{AppConfig, BackendKind};
use dispatch::Dispatcher;
use http::{HttpClient, HttpDebugConfig};
use llm::chat::{ChatCompletionsProvider, GenerationParams};
use llm::local::LocalAgentProvider;
use llm::AnyBackend;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use studio::Studio;
use trace::SessionTrace;

/// Wires registry, backend, dispatcher and the optional trace from a loaded
/// configuration.
pub fn build_studio(config: &AppConfig) -> Result<Studio<AnyBackend>> {
    let trace = if config.trace {
        Some(SessionTrace::create(&generate_session_id())?)
    } else {
        None
    };

    let mut http = HttpClient::new(
        reqwest::Client::new(),
        HttpDebugConfig::new(config.http_debug),
    );
    if let Some(trace) = &trace {
        http = http.with_trace(trace.clone());
    }

    let (backend, registry) = match config.backend {
        BackendKind::Chat => {
            let provider = ChatCompletionsProvider::new(
                http,
                config.api_key.clone(),
                GenerationParams {
                    model: config.model.clone(),
                    temperature: config.temperature,
                    max_tokens: config.max_tokens,
                },
            )
            .map_err(|err| anyhow!("Failed to configure chat backend: {err}"))?;
            let endpoint = config.chat_endpoint();
            let registry = AgentRegistry::builtin(|_| endpoint.clone(), &config.agent_endpoints);
            (AnyBackend::Chat(provider), registry)
        }
        BackendKind::Local => {
            let registry = AgentRegistry::builtin(
                |id| LocalAgentProvider::endpoint_for(&config.local_url, id),
                &config.agent_endpoints,
            );
            (AnyBackend::Local(LocalAgentProvider::new(http)), registry)
        }
    };

    let dispatcher = Dispatcher::new(Arc::new(registry), backend)
        .with_timeout(config.timeout)
        .with_history_window(config.history_window);

    let mut studio =
        Studio::new(dispatcher).record_fallback_in_history(config.record_fallback_in_history);
    if let Some(trace) = trace {
        studio = studio.with_trace(trace);
    }
    Ok(studio)
}

fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    format!("{millis:x}-{:x}", std::process::id())
}
