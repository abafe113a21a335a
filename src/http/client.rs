use super::debug::{
    HttpDebugConfig, redact_error_body, redact_header_value, redact_url, summarize_body,
    truncate_for_log,
};
use crate::trace::SessionTrace;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
#[cfg(test)]
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    debug: HttpDebugConfig,
    sink: LogSink,
    trace: Option<SessionTrace>,
}

#[derive(Clone)]
enum LogSink {
    Stderr,
    #[cfg(test)]
    Buffer(Arc<Mutex<Vec<String>>>),
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("debug", &self.debug)
            .finish()
    }
}

impl HttpClient {
    pub fn new(inner: Client, debug: HttpDebugConfig) -> Self {
        Self {
            inner,
            debug,
            sink: LogSink::Stderr,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: SessionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        payload: &T,
    ) -> Result<HttpResponseData, reqwest::Error> {
        let mut builder = self.inner.post(url).json(payload);
        if let Some(token) = bearer_token {
            builder = builder.bearer_auth(token);
        }
        let request = builder.build()?;
        let body_len = request
            .body()
            .and_then(|body| body.as_bytes())
            .map_or(0, <[u8]>::len);

        self.log_request(&request, body_len);
        if let Some(trace) = &self.trace {
            trace.log_http_request(request.method().as_str(), &redact_url(request.url()));
        }

        let response = match self.inner.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                if let Some(trace) = &self.trace {
                    trace.log_http_error(&err.to_string());
                }
                return Err(err);
            }
        };
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        self.log_response(status, &headers, &body);
        if let Some(trace) = &self.trace {
            trace.log_http_response(status, body.len());
        }

        Ok(HttpResponseData { status, body })
    }

    fn log_request(&self, request: &reqwest::Request, body_len: usize) {
        if !self.debug.enabled {
            return;
        }

        for line in request_log_lines(request, body_len) {
            self.log_line(line);
        }
    }

    fn log_response(&self, status: u16, headers: &HeaderMap, body: &str) {
        if !self.debug.enabled {
            return;
        }

        for line in response_log_lines(self.debug, status, headers, body) {
            self.log_line(line);
        }
    }

    fn log_line(&self, line: String) {
        match &self.sink {
            LogSink::Stderr => {
                let mut stderr = io::stderr().lock();
                let _ = writeln!(stderr, "{line}");
            }
            #[cfg(test)]
            LogSink::Buffer(buffer) => {
                if let Ok(mut b) = buffer.lock() {
                    b.push(line);
                }
            }
        }
    }

    #[cfg(test)]
    pub fn with_buffer_sink(
        inner: Client,
        debug: HttpDebugConfig,
    ) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            inner,
            debug,
            sink: LogSink::Buffer(Arc::clone(&buffer)),
            trace: None,
        };
        (client, buffer)
    }
}

fn request_log_lines(request: &reqwest::Request, body_len: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "[http-debug] > {} {}",
        request.method(),
        redact_url(request.url())
    ));
    for (name, value) in request.headers() {
        lines.push(format!(
            "[http-debug] > {}: {}",
            name.as_str(),
            redact_header_value(name.as_str(), value)
        ));
    }
    let summary = if body_len == 0 {
        "<empty body>".to_string()
    } else {
        format!("<{body_len} bytes>")
    };
    lines.push(format!("[http-debug] > {summary}"));
    lines
}

fn response_log_lines(
    debug: HttpDebugConfig,
    status: u16,
    headers: &HeaderMap,
    body: &str,
) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("[http-debug] < HTTP {status}"));
    for (name, value) in headers {
        lines.push(format!(
            "[http-debug] < {}: {}",
            name.as_str(),
            redact_header_value(name.as_str(), value)
        ));
    }

    if (200..300).contains(&status) {
        lines.push(format!("[http-debug] < {}", summarize_body(body)));
        return lines;
    }

    let body = truncate_for_log(&redact_error_body(body), debug.max_body_chars);
    if body.is_empty() {
        lines.push("[http-debug] < <empty body>".to_string());
    }
    for line in body.lines() {
        lines.push(format!("[http-debug] < {line}"));
    }
    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::{HttpClient, HttpResponseData, request_log_lines, response_log_lines};
    use crate::http::debug::HttpDebugConfig;
    use crate::trace::SessionTrace;
    use reqwest::Client;
    use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
    use reqwest::{Method, Url};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn post_json_logs_without_bodies_or_secrets_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer super-secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_json(json!({"reply":"private answer"})),
            )
            .mount(&server)
            .await;

        let (client, logs) =
            HttpClient::with_buffer_sink(Client::new(), HttpDebugConfig::new(true));

        let response = client
            .post_json(
                &format!("{}/v1/chat/completions", server.uri()),
                Some("super-secret"),
                &json!({"content":"private question"}),
            )
            .await
            .expect("request should succeed");

        assert_eq!(
            response,
            HttpResponseData {
                status: 200,
                body: "{\"reply\":\"private answer\"}".to_string(),
            }
        );

        let logged = logs.lock().expect("logs lock").join("\n");
        assert!(logged.contains("[http-debug] > POST"));
        assert!(logged.contains("[http-debug] < HTTP 200"));
        assert!(logged.contains("authorization: ***REDACTED***"));
        assert!(!logged.contains("super-secret"));
        assert!(!logged.contains("private question"));
        assert!(!logged.contains("private answer"));
    }

    #[tokio::test]
    async fn post_json_emits_no_logs_when_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok":true})))
            .mount(&server)
            .await;

        let (client, logs) =
            HttpClient::with_buffer_sink(Client::new(), HttpDebugConfig::disabled());

        let _ = client
            .post_json(&format!("{}/agent/1", server.uri()), None, &json!({"query":"hi"}))
            .await
            .expect("request should succeed");

        assert!(logs.lock().expect("logs lock").is_empty());
    }

    #[tokio::test]
    async fn post_json_records_status_in_trace_without_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent/2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let dir = tempdir().expect("tempdir");
        let trace = SessionTrace::create_in_temp_dir("test-session", dir.path()).expect("trace");
        let client =
            HttpClient::new(Client::new(), HttpDebugConfig::disabled()).with_trace(trace.clone());

        let response = client
            .post_json(
                &format!("{}/agent/2", server.uri()),
                Some("token-value"),
                &json!({"query":"negotiate moq"}),
            )
            .await
            .expect("request should complete");

        assert_eq!(response.status, 503);
        let trace_text = fs::read_to_string(trace.file_path()).expect("read trace file");
        assert!(trace_text.contains("POST http://"));
        assert!(trace_text.contains("HTTP 503 (10 bytes)"));
        assert!(!trace_text.contains("negotiate moq"));
        assert!(!trace_text.contains("token-value"));
    }

    #[test]
    fn request_log_lines_match_snapshot() {
        let mut request = reqwest::Request::new(
            Method::POST,
            Url::parse("https://example.com/v1/chat/completions").expect("valid url"),
        );
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let lines = request_log_lines(&request, 42);
        insta::assert_snapshot!(lines.join("\n"), @r"
        [http-debug] > POST https://example.com/v1/chat/completions
        [http-debug] > content-type: application/json
        [http-debug] > <42 bytes>
        ");
    }

    #[test]
    fn response_log_lines_show_redacted_error_body() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("response-secret"));

        let lines = response_log_lines(
            HttpDebugConfig::new(true),
            401,
            &headers,
            "{\"error\":\"invalid\",\"api_key\":\"response-secret\"}",
        );
        insta::assert_snapshot!(lines.join("\n"), @r#"
        [http-debug] < HTTP 401
        [http-debug] < x-api-key: ***REDACTED***
        [http-debug] < {"api_key":"***REDACTED***","error":"invalid"}
        "#);
    }

    #[test]
    fn response_log_lines_summarize_success_body() {
        let lines = response_log_lines(
            HttpDebugConfig::new(true),
            200,
            &HeaderMap::new(),
            "{\"output\":\"text\"}",
        );
        assert_eq!(lines, vec!["[http-debug] < HTTP 200", "[http-debug] < <17 bytes>"]);
    }
}
