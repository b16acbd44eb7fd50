//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! validation, route matching, body parsing and access logging.

use crate::config::{AppState, HttpConfig};
use crate::handler::assistant::AssistantResponse;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, StatusCode, Version};
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    logger::log_request(req.method(), req.uri(), req.version());
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let access_entry = state
        .access_log_enabled()
        .then(|| start_access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;
    apply_common_headers(&mut response, &state.config.http);

    if let Some(mut entry) = access_entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn start_access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = http_version(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}

fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Add the `Server` header and, when enabled, the CORS origin header
fn apply_common_headers(response: &mut Response<Full<Bytes>>, http_config: &HttpConfig) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&http_config.server_name) {
        headers.insert("Server", server);
    }
    if http_config.enable_cors {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
}

/// Route request based on method, path and configuration
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path();

    // 0. Preflight on any path
    if method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // 1. Health check endpoints
    let health = &state.config.routes.health;
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return match method {
            Method::GET | Method::HEAD => {
                http::build_health_response("ok", method == Method::HEAD)
            }
            _ => {
                logger::log_warning(&format!("Method not allowed: {method} {path}"));
                http::build_405_response("GET, HEAD")
            }
        };
    }

    // 2. Assistant endpoint
    if path == state.config.assistant.endpoint {
        if method != Method::POST {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response(http::response::ALLOWED_METHODS);
        }
        return handle_assistant(req, state).await;
    }

    http::build_404_response()
}

/// Read the body, extract `message` and build the reply
async fn handle_assistant<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_error(&format!(
                "Request body too large (max: {max_body_size} bytes)"
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_400_response("Failed to read request body");
        }
    };

    let message = match parse_message(&body) {
        Ok(m) => m,
        Err(e) => {
            logger::log_warning(&format!("Invalid JSON body: {e}"));
            return http::build_400_response(&format!("Invalid JSON: {e}"));
        }
    };

    match state.assistant.reply(message.as_ref()).await {
        Ok(response) => http::build_json_response(StatusCode::OK, &AssistantResponse { response }),
        Err(e) => {
            logger::log_error(&format!("Assistant reply failed: {e}"));
            http::build_500_response(&e.to_string())
        }
    }
}

/// Extract the `message` field of a JSON body.
///
/// An empty body or a JSON value that is not an object carries no message.
fn parse_message(body: &[u8]) -> Result<Option<Value>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(mut fields) => Ok(fields.remove("message")),
        _ => Ok(None),
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, LookupFailurePolicy};
    use tempfile::TempDir;

    fn test_state(dir: &TempDir, configure: impl FnOnce(&mut Config)) -> Arc<AppState> {
        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = false;
        config.assistant.files_dir = dir.path().to_string_lossy().into_owned();
        configure(&mut config);
        Arc::new(AppState::new(&config))
    }

    fn fixture_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.py"), "print('hi')").unwrap();
        std::fs::write(
            dir.path().join("performance.json"),
            r#"{"Foundations of Internal Auditing": {"correct": 7, "total": 10}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("QBANK_CIA1.csv"), "line1\nline2\nline3").unwrap();
        dir
    }

    fn request(method: Method, path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> (StatusCode, String) {
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let resp = handle_request(req, Arc::clone(state), peer).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn reply_text(body: &str) -> String {
        let value: Value = serde_json::from_str(body).unwrap();
        value["response"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_post_hello() {
        let dir = fixture_dir();
        let state = test_state(&dir, |_| {});

        let (status, body) = send(&state, request(Method::POST, "/api/ai", r#"{"message":"hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);

        let text = reply_text(&body);
        assert!(text.starts_with("You said: \"hello\"."));
        assert!(text.contains(r#"{"name":"add_questions.py","content":"File not found or unreadable"}"#));
        assert!(text.contains(r#"{"name":"app.py","content":"print('hi')"}"#));
        assert!(text.contains(r#"{"name":"README.txt","content":"File not found or unreadable"}"#));
    }

    #[tokio::test]
    async fn test_post_keywords() {
        let dir = fixture_dir();
        let state = test_state(&dir, |_| {});

        let (_, body) = send(
            &state,
            request(Method::POST, "/api/ai", r#"{"message":"My Performance and QUESTIONS"}"#),
        )
        .await;
        let text = reply_text(&body);
        assert!(text.contains(r#"{"name":"performance.json","content":"Correct: 7, Total: 10"}"#));
        assert!(text.contains(r#"{"name":"QBANK_CIA1.csv","content":"line1\nline2"}"#));
    }

    #[tokio::test]
    async fn test_missing_message_is_undefined() {
        let dir = fixture_dir();
        let state = test_state(&dir, |_| {});

        let (status, body) = send(&state, request(Method::POST, "/api/ai", "{}")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(reply_text(&body).starts_with("You said: \"undefined\"."));
        assert!(reply_text(&body).contains(
            r#"{"name":"QBANK_CIA1.csv","content":"File not found or unreadable"}"#
        ));

        let (status, body) = send(&state, request(Method::POST, "/api/ai", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(reply_text(&body).starts_with("You said: \"undefined\"."));
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let dir = fixture_dir();
        let state = test_state(&dir, |_| {});

        let (status, body) = send(&state, request(Method::POST, "/api/ai", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_wrong_method_and_unknown_path() {
        let dir = fixture_dir();
        let state = test_state(&dir, |_| {});

        let (status, _) = send(&state, request(Method::GET, "/api/ai", "")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = send(&state, request(Method::POST, "/api/other", "{}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let dir = fixture_dir();
        let state = test_state(&dir, |c| c.http.max_body_size = 8);
        let body = r#"{"message":"this is far too long"}"#;

        let (status, _) = send(&state, request(Method::POST, "/api/ai", body)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let mut req = request(Method::POST, "/api/ai", body);
        req.headers_mut()
            .insert("content-length", HeaderValue::from(body.len()));
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_lookup_error_policy_is_server_error() {
        let dir = fixture_dir();
        std::fs::write(dir.path().join("performance.json"), "{}").unwrap();
        let state = test_state(&dir, |c| {
            c.assistant.on_lookup_failure = LookupFailurePolicy::Error;
        });

        let (status, body) = send(
            &state,
            request(Method::POST, "/api/ai", r#"{"message":"performance"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Foundations of Internal Auditing"));
    }

    #[tokio::test]
    async fn test_health_and_options() {
        let dir = fixture_dir();
        let state = test_state(&dir, |c| c.http.enable_cors = true);

        let (status, body) = send(&state, request(Method::GET, "/healthz", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);

        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let resp = handle_request(request(Method::OPTIONS, "/api/ai", ""), Arc::clone(&state), peer)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(resp.headers()["Server"], "certify-assistant/0.1");
    }

    #[test]
    fn test_parse_message() {
        assert_eq!(parse_message(b"  ").unwrap(), None);
        assert_eq!(parse_message(b"[1]").unwrap(), None);
        assert_eq!(
            parse_message(br#"{"message": 5}"#).unwrap(),
            Some(serde_json::json!(5))
        );
        assert!(parse_message(b"{").is_err());
    }
}
