use reqwest::Url;
use reqwest::header::HeaderValue;
use serde_json::Value;

const REDACTION: &str = "***REDACTED***";
const SENSITIVE_KEYS: [&str; 9] = [
    "key",
    "api_key",
    "apikey",
    "token",
    "access_token",
    "authorization",
    "secret",
    "password",
    "x-api-key",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpDebugConfig {
    pub enabled: bool,
    pub max_body_chars: usize,
}

impl HttpDebugConfig {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            max_body_chars: 2_000,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }
}

pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = redacted
        .query_pairs()
        .map(|(k, v)| {
            if is_sensitive_key(k.as_ref()) {
                (k.into_owned(), REDACTION.to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    redacted.set_query(None);
    if !pairs.is_empty() {
        let mut qp = redacted.query_pairs_mut();
        for (k, v) in pairs {
            qp.append_pair(&k, &v);
        }
    }

    redacted.as_str().to_string()
}

pub fn redact_header_value(name: &str, value: &HeaderValue) -> String {
    if is_sensitive_key(name) {
        REDACTION.to_string()
    } else {
        value
            .to_str()
            .map(std::string::ToString::to_string)
            .unwrap_or_else(|_| "<non-utf8>".to_string())
    }
}

/// Error bodies are logged with secrets masked. Request bodies and successful
/// response bodies carry conversation text and are only ever summarized.
pub fn redact_error_body(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(mut json) => {
            redact_json_value(&mut json);
            serde_json::to_string(&json).unwrap_or_else(|_| raw.to_string())
        }
        Err(_) => raw.to_string(),
    }
}

pub fn summarize_body(body: &str) -> String {
    if body.is_empty() {
        "<empty body>".to_string()
    } else {
        format!("<{} bytes>", body.len())
    }
}

pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    let count = input.chars().count();
    if count <= max_chars {
        return input.to_string();
    }

    let truncated = input.chars().take(max_chars).collect::<String>();
    format!("{truncated}... <truncated {} chars>", count - max_chars)
}

fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                if is_sensitive_key(key) {
                    *item = Value::String(REDACTION.to_string());
                } else {
                    redact_json_value(item);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                redact_json_value(item);
            }
        }
        _ => {}
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|s| *s == key)
}

#[cfg(test)]
mod tests {
    use super::{
        redact_error_body, redact_header_value, redact_url, summarize_body, truncate_for_log,
    };
    use reqwest::Url;
    use reqwest::header::HeaderValue;

    #[test]
    fn redact_url_masks_sensitive_query_params() {
        let url = Url::parse("https://example.com/path?key=super-secret&view=full").expect("url");
        let redacted = redact_url(&url);
        assert!(
            redacted.contains("key=%2A%2A%2AREDACTED%2A%2A%2A")
                || redacted.contains("key=***REDACTED***")
        );
        assert!(redacted.contains("view=full"));
        assert!(!redacted.contains("super-secret"));
    }

    #[test]
    fn redact_header_value_masks_authorization() {
        let value = HeaderValue::from_static("Bearer secret");
        assert_eq!(redact_header_value("Authorization", &value), "***REDACTED***");
        assert_eq!(
            redact_header_value("content-type", &HeaderValue::from_static("application/json")),
            "application/json"
        );
    }

    #[test]
    fn redact_error_body_masks_nested_json_keys() {
        let raw = r#"{"error":{"message":"bad","api_key":"123"},"token":"secret"}"#;
        let redacted = redact_error_body(raw);
        assert!(redacted.contains("\"api_key\":\"***REDACTED***\""));
        assert!(redacted.contains("\"token\":\"***REDACTED***\""));
        assert!(redacted.contains("\"message\":\"bad\""));
        assert!(!redacted.contains("123"));
    }

    #[test]
    fn summarize_body_reports_size_only() {
        assert_eq!(summarize_body(""), "<empty body>");
        assert_eq!(summarize_body("{\"query\":\"hi\"}"), "<14 bytes>");
    }

    #[test]
    fn truncate_for_log_appends_marker() {
        let out = truncate_for_log("abcdefghijklmnopqrstuvwxyz", 5);
        assert!(out.starts_with("abcde"));
        assert!(out.contains("<truncated 21 chars>"));
    }
}
