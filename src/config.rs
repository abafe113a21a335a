use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::agent::AgentRegistry;
use crate::dispatch::MAX_DISPATCH_TIMEOUT;
use crate::session::DEFAULT_HISTORY_WINDOW;

pub const DEFAULT_MODEL: &str = "asi1-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.asi1.ai";
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:8000";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

const CONFIG_DIR_NAME: &str = "atelier";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Chat,
    Local,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "chat" => Ok(Self::Chat),
            "local" => Ok(Self::Local),
            _ => Err(format!("unknown backend '{value}', expected 'chat' or 'local'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub backend: BackendKind,
    pub local_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub history_window: usize,
    pub record_fallback_in_history: bool,
    pub http_debug: bool,
    pub trace: bool,
    /// Per-agent endpoint overrides keyed by agent key.
    pub agent_endpoints: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileConfig {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    backend: Option<String>,
    local_url: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    history_window: Option<usize>,
    record_fallback_in_history: Option<bool>,
    http_debug: Option<bool>,
    trace: Option<bool>,
    agents: Option<HashMap<String, RawAgentConfig>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAgentConfig {
    endpoint: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Loads the file at `path`, or the discovered XDG location when `None`. An
    /// explicit path must exist; the discovered one is optional.
    pub fn load_with_path(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.is_file() {
                    bail!("Failed to load config {}: file not found", path.display());
                }
                path.to_path_buf()
            }
            None => discover_config_path()?,
        };
        let file_config = load_file_config(&config_path)?.unwrap_or_default();

        dotenvy::dotenv().ok();

        let backend = match env_non_empty("ATELIER_BACKEND") {
            Some(value) => BackendKind::from_str(&value)
                .map_err(|reason| anyhow!("Failed to load config: ATELIER_BACKEND: {reason}"))?,
            None => match file_config.backend.as_deref() {
                Some(value) => BackendKind::from_str(value.trim())
                    .map_err(|reason| config_error(&config_path, "backend", &reason))?,
                None => BackendKind::Chat,
            },
        };

        let temperature = file_config.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(config_error(
                &config_path,
                "temperature",
                "must be between 0.0 and 2.0",
            ));
        }

        let max_tokens = file_config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(config_error(&config_path, "max_tokens", "must be at least 1"));
        }

        let timeout = match file_config.timeout_secs {
            Some(secs) if secs == 0 || secs > MAX_DISPATCH_TIMEOUT.as_secs() => {
                return Err(config_error(
                    &config_path,
                    "timeout_secs",
                    &format!("must be between 1 and {}", MAX_DISPATCH_TIMEOUT.as_secs()),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => MAX_DISPATCH_TIMEOUT,
        };

        let history_window = file_config.history_window.unwrap_or(DEFAULT_HISTORY_WINDOW);
        if history_window == 0 {
            return Err(config_error(
                &config_path,
                "history_window",
                "must be at least 1",
            ));
        }

        let agent_endpoints = validate_agents(file_config.agents.as_ref(), &config_path)?;

        let base_url = env_non_empty("ATELIER_BASE_URL")
            .or(non_empty_owned(file_config.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_url(&base_url, &config_path, "base_url")?;
        let local_url = env_non_empty("ATELIER_LOCAL_URL")
            .or(non_empty_owned(file_config.local_url))
            .unwrap_or_else(|| DEFAULT_LOCAL_URL.to_string());
        validate_url(&local_url, &config_path, "local_url")?;

        Ok(Self {
            api_key: env_non_empty("ATELIER_API_KEY").or(non_empty_owned(file_config.api_key)),
            model: env_non_empty("ATELIER_MODEL")
                .or(non_empty_owned(file_config.model))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url,
            local_url,
            backend,
            temperature,
            max_tokens,
            timeout,
            history_window,
            record_fallback_in_history: file_config.record_fallback_in_history.unwrap_or(false),
            http_debug: file_config.http_debug.unwrap_or(false),
            trace: file_config.trace.unwrap_or(false),
            agent_endpoints,
            config_path,
        })
    }

    pub fn chat_endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn discover_config_path() -> Result<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if trimmed.is_empty() {
            bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty");
        }

        return Ok(PathBuf::from(trimmed)
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow!("Failed to resolve config path: HOME directory is unavailable"))?;

    Ok(home
        .join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

fn load_file_config(config_path: &Path) -> Result<Option<RawFileConfig>> {
    if !config_path.is_file() {
        return Ok(None);
    }

    let config_text = fs::read_to_string(config_path).map_err(|err| {
        anyhow!(
            "Failed to load config {}: unable to read file: {err}",
            config_path.display()
        )
    })?;

    toml::from_str(&config_text)
        .map(Some)
        .map_err(|err| anyhow!("Failed to load config {}: {err}", config_path.display()))
}

fn validate_agents(
    raw_agents: Option<&HashMap<String, RawAgentConfig>>,
    config_path: &Path,
) -> Result<HashMap<String, String>> {
    let Some(agents) = raw_agents else {
        return Ok(HashMap::new());
    };

    let mut endpoints = HashMap::new();
    for (key, agent) in agents {
        if !AgentRegistry::is_known_key(key) {
            return Err(config_error(
                config_path,
                &format!("agents.{key}"),
                &format!("unknown agent '{key}'"),
            ));
        }
        let Some(endpoint) = agent.endpoint.as_deref() else {
            continue;
        };
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(config_error(
                config_path,
                &format!("agents.{key}.endpoint"),
                "must not be empty",
            ));
        }
        validate_url(endpoint, config_path, &format!("agents.{key}.endpoint"))?;
        endpoints.insert(key.clone(), endpoint.to_string());
    }

    Ok(endpoints)
}

fn validate_url(value: &str, config_path: &Path, key_path: &str) -> Result<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|err| config_error(config_path, key_path, &format!("invalid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(config_error(
            config_path,
            key_path,
            &format!("invalid url: unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| non_empty(&value).map(ToOwned::to_owned))
}

fn non_empty_owned(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(non_empty).map(ToOwned::to_owned)
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn config_error(config_path: &Path, key_path: &str, reason: &str) -> anyhow::Error {
    anyhow!(
        "Failed to load config {}: {key_path}: {reason}",
        config_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::{
        AppConfig, BackendKind, DEFAULT_BASE_URL, DEFAULT_LOCAL_URL, DEFAULT_MAX_TOKENS,
        DEFAULT_MODEL,
    };
    use serial_test::serial;
    use std::env;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    const ENV_KEYS: [&str; 6] = [
        "ATELIER_API_KEY",
        "ATELIER_MODEL",
        "ATELIER_BASE_URL",
        "ATELIER_LOCAL_URL",
        "ATELIER_BACKEND",
        "XDG_CONFIG_HOME",
    ];

    fn reset_vars() {
        for key in ENV_KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    fn with_cwd<T>(path: &Path, f: impl FnOnce() -> T) -> T {
        let cwd = env::current_dir().expect("current dir");
        env::set_current_dir(path).expect("set current dir");
        let result = f();
        env::set_current_dir(cwd).expect("restore current dir");
        result
    }

    fn write_config(root: &Path, contents: &str) {
        let config_dir = root.join("atelier");
        fs::create_dir_all(&config_dir).expect("create config dir");
        fs::write(config_dir.join("config.toml"), contents).expect("write config");
    }

    fn load_in(root: &Path) -> anyhow::Result<AppConfig> {
        unsafe {
            env::set_var("XDG_CONFIG_HOME", root);
        }
        with_cwd(root, AppConfig::load)
    }

    #[test]
    #[serial]
    fn load_uses_defaults_without_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        reset_vars();

        let cfg = load_in(tmp.path()).expect("load config");
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.local_url, DEFAULT_LOCAL_URL);
        assert_eq!(cfg.backend, BackendKind::Chat);
        assert_eq!(cfg.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(cfg.timeout, Duration::from_secs(60));
        assert_eq!(cfg.history_window, 10);
        assert!(!cfg.record_fallback_in_history);
        assert!(!cfg.http_debug);
        assert!(!cfg.trace);
        assert!(cfg.agent_endpoints.is_empty());
        assert_eq!(cfg.chat_endpoint(), "https://api.asi1.ai/v1/chat/completions");
    }

    #[test]
    #[serial]
    fn load_reads_file_values() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_config(
            tmp.path(),
            r#"
api_key = "file_key"
backend = "local"
local_url = "http://127.0.0.1:9000"
temperature = 0.2
timeout_secs = 15
history_window = 4
record_fallback_in_history = true
trace = true

[agents.timeline]
endpoint = "http://timeline.internal/agent/3"
"#,
        );
        reset_vars();

        let cfg = load_in(tmp.path()).expect("load config");
        assert_eq!(cfg.api_key.as_deref(), Some("file_key"));
        assert_eq!(cfg.backend, BackendKind::Local);
        assert_eq!(cfg.local_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.temperature, 0.2);
        assert_eq!(cfg.timeout, Duration::from_secs(15));
        assert_eq!(cfg.history_window, 4);
        assert!(cfg.record_fallback_in_history);
        assert!(cfg.trace);
        assert_eq!(
            cfg.agent_endpoints.get("timeline").map(String::as_str),
            Some("http://timeline.internal/agent/3")
        );
    }

    #[test]
    #[serial]
    fn load_env_overrides_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_config(
            tmp.path(),
            r#"
api_key = "file_key"
model = "file_model"
base_url = "https://example.com"
backend = "chat"
"#,
        );
        reset_vars();
        unsafe {
            env::set_var("ATELIER_API_KEY", "os_key");
            env::set_var("ATELIER_MODEL", "os_model");
            env::set_var("ATELIER_BACKEND", "local");
        }

        let cfg = load_in(tmp.path()).expect("load config");
        assert_eq!(cfg.api_key.as_deref(), Some("os_key"));
        assert_eq!(cfg.model, "os_model");
        assert_eq!(cfg.base_url, "https://example.com");
        assert_eq!(cfg.backend, BackendKind::Local);
        reset_vars();
    }

    #[test]
    #[serial]
    fn load_does_not_override_existing_os_env_with_dotenv() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(
            tmp.path().join(".env"),
            "ATELIER_API_KEY=dotenv_key\nATELIER_MODEL=dotenv_model\n",
        )
        .expect("write env file");
        reset_vars();
        unsafe {
            env::set_var("ATELIER_API_KEY", "os_key");
            env::set_var("ATELIER_MODEL", "os_model");
        }

        let cfg = load_in(tmp.path()).expect("load config");
        assert_eq!(cfg.api_key.as_deref(), Some("os_key"));
        assert_eq!(cfg.model, "os_model");
        reset_vars();
    }

    #[test]
    #[serial]
    fn load_with_explicit_path_requires_existing_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        reset_vars();

        let missing = tmp.path().join("nope.toml");
        let err = AppConfig::load_with_path(Some(&missing)).expect_err("missing file");
        assert!(err.to_string().contains("file not found"));

        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "history_window = 2\n").expect("write config");
        let cfg = with_cwd(tmp.path(), || {
            AppConfig::load_with_path(Some(&explicit)).expect("load config")
        });
        assert_eq!(cfg.history_window, 2);
        assert_eq!(cfg.config_path, explicit);
    }

    #[test]
    #[serial]
    fn load_fails_when_xdg_config_home_is_empty() {
        reset_vars();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", "   ");
        }

        let err = AppConfig::load().expect_err("load should fail");
        assert!(
            err.to_string()
                .contains("Failed to resolve config path: XDG_CONFIG_HOME is set but empty")
        );
        reset_vars();
    }

    #[test]
    #[serial]
    fn load_fails_on_unknown_root_key() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_config(tmp.path(), "unknown_key = 1");
        reset_vars();

        let err = load_in(tmp.path()).expect_err("load should fail");
        assert!(err.to_string().contains("Failed to load config"));
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    #[serial]
    fn load_fails_on_unknown_agent_key() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_config(
            tmp.path(),
            r#"
[agents.marketing]
endpoint = "http://localhost:8000/agent/9"
"#,
        );
        reset_vars();

        let err = load_in(tmp.path()).expect_err("load should fail");
        assert!(
            err.to_string()
                .contains("agents.marketing: unknown agent 'marketing'")
        );
    }

    #[test]
    #[serial]
    fn load_fails_on_invalid_agent_endpoint() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_config(
            tmp.path(),
            r#"
[agents.moq]
endpoint = "not a url"
"#,
        );
        reset_vars();

        let err = load_in(tmp.path()).expect_err("load should fail");
        assert!(err.to_string().contains("agents.moq.endpoint: invalid url"));
    }

    #[test]
    #[serial]
    fn load_rejects_out_of_range_limits() {
        let tmp = tempfile::tempdir().expect("tempdir");
        reset_vars();

        write_config(tmp.path(), "timeout_secs = 120\n");
        let err = load_in(tmp.path()).expect_err("timeout above ceiling");
        assert!(err.to_string().contains("timeout_secs: must be between 1 and 60"));

        write_config(tmp.path(), "history_window = 0\n");
        let err = load_in(tmp.path()).expect_err("empty window");
        assert!(err.to_string().contains("history_window: must be at least 1"));

        write_config(tmp.path(), "base_url = \"api.asi1.ai\"\n");
        let err = load_in(tmp.path()).expect_err("base url without scheme");
        assert!(err.to_string().contains("base_url: invalid url"));

        write_config(tmp.path(), "local_url = \"localhost:8000\"\n");
        let err = load_in(tmp.path()).expect_err("local url without scheme");
        assert!(err.to_string().contains("local_url: invalid url"));

        write_config(tmp.path(), "backend = \"cloud\"\n");
        let err = load_in(tmp.path()).expect_err("unknown backend");
        assert!(err.to_string().contains("backend: unknown backend 'cloud'"));
    }
}
