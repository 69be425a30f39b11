//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, Entry, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Bodies longer than this many characters are truncated in `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Fields whose values are never logged, in JSON and form bodies.
const REDACTED_FIELDS: [&str; 3] = ["password", "access_token", "refresh_token"];

/// Headers whose values are never logged.
const REDACTED_HEADERS: [HeaderName; 3] = [AUTHORIZATION, COOKIE, SET_COOKIE];

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Credential headers are never logged. Passwords and tokens are redacted from
/// JSON and form bodies, and any other body is logged by its length only.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let Ok(body_bytes) = to_bytes(body, usize::MAX).await else {
        tracing::warn!("Could not read request body for {} {}", parts.method, parts.uri);
        return StatusCode::BAD_REQUEST.into_response();
    };

    mark_sensitive_headers(&mut parts.headers);
    let request_body = display_body(&body_bytes, parts.headers.get(CONTENT_TYPE));
    log_request(&parts, &request_body);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let Ok(body_bytes) = to_bytes(body, usize::MAX).await else {
        tracing::error!("Could not read response body");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    mark_sensitive_headers(&mut parts.headers);
    let response_body = display_body(&body_bytes, parts.headers.get(CONTENT_TYPE));
    log_response(&parts, &response_body);

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Sensitive header values are printed as `Sensitive` by their debug format.
fn mark_sensitive_headers(headers: &mut HeaderMap) {
    for name in &REDACTED_HEADERS {
        if let Entry::Occupied(mut entry) = headers.entry(name) {
            entry.iter_mut().for_each(|value| value.set_sensitive(true));
        }
    }
}

fn is_form(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// The body as it should appear in the logs.
///
/// A body that parses as JSON is redacted whatever its content type claims.
fn display_body(body: &Bytes, content_type: Option<&HeaderValue>) -> String {
    if body.is_empty() {
        return String::new();
    }

    if let Ok(mut value) = serde_json::from_slice::<Value>(body) {
        redact(&mut value);
        return value.to_string();
    }

    if is_form(content_type) {
        return redact_form(&String::from_utf8_lossy(body));
    }

    format!("<{} bytes>", body.len())
}

/// Replace the values of [REDACTED_FIELDS] anywhere in `value`.
fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *field = Value::String(REDACTED.to_owned());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Replace the values of [REDACTED_FIELDS] in a URL encoded form.
fn redact_form(form_text: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if REDACTED_FIELDS.contains(&key) => format!("{key}={REDACTED}"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if the
/// body is short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        body::Bytes,
        http::{HeaderMap, HeaderValue, header::AUTHORIZATION},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{routing::build_router, test_utils::get_test_app_state};

    use super::{
        LOG_BODY_LENGTH_LIMIT, display_body, logging_middleware, mark_sensitive_headers,
        truncate,
    };

    const PASSWORD: &str = "averysafeandsecurepassword";

    /// Collects everything a `tracing` subscriber writes.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn redacts_passwords_and_tokens() {
        let body = Bytes::from(
            json!({
                "email": "foo@bar.baz",
                "password": "hunter2",
                "nested": { "refresh_token": "abc", "access_token": "def" },
            })
            .to_string(),
        );

        let display = display_body(&body, Some(&HeaderValue::from_static("application/json")));

        assert!(!display.contains("hunter2"), "got {display}");
        assert!(!display.contains("abc"), "got {display}");
        assert!(!display.contains("def"), "got {display}");
        assert!(display.contains("foo@bar.baz"), "got {display}");
    }

    #[test]
    fn redacts_json_sent_with_another_content_type() {
        let body = Bytes::from_static(br#"{"email":"foo@bar.baz","password":"hunter2"}"#);

        let display = display_body(&body, Some(&HeaderValue::from_static("text/plain")));

        assert!(!display.contains("hunter2"), "got {display}");
        assert!(display.contains("foo@bar.baz"), "got {display}");
    }

    #[test]
    fn redacts_form_fields() {
        let body = Bytes::from_static(b"email=foo%40bar.baz&password=hunter2&remember_me=on");
        let content_type = HeaderValue::from_static("application/x-www-form-urlencoded");

        assert_eq!(
            display_body(&body, Some(&content_type)),
            "email=foo%40bar.baz&password=********&remember_me=on"
        );
    }

    #[test]
    fn other_bodies_are_logged_by_length() {
        let body = Bytes::from_static(b"password hunter2");

        assert_eq!(
            display_body(&body, Some(&HeaderValue::from_static("text/plain"))),
            "<16 bytes>"
        );
        assert_eq!(display_body(&Bytes::new(), None), "");
    }

    #[test]
    fn authorization_header_is_not_printed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer secret.token.value"),
        );

        mark_sensitive_headers(&mut headers);

        let debug = format!("{headers:?}");
        assert!(!debug.contains("secret.token.value"), "got {debug}");
        assert_eq!(
            headers.get(AUTHORIZATION),
            Some(&HeaderValue::from_static("Bearer secret.token.value"))
        );
    }

    #[test]
    fn truncates_long_bodies_on_char_boundaries() {
        let short = "a".repeat(LOG_BODY_LENGTH_LIMIT);
        let long = "🍔".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        assert_eq!(truncate(&short), None);
        assert_eq!(
            truncate(&long).map(|text| text.chars().count()),
            Some(LOG_BODY_LENGTH_LIMIT)
        );
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");
        let body = json!({ "password": "averysafeandsecurepassword" });

        let response = server.post("/echo").json(&body).await;

        response.assert_json(&body);
    }

    #[tokio::test]
    async fn credentials_never_reach_the_logs() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let server = TestServer::new(build_router(get_test_app_state()))
            .expect("Could not create test server.");
        server
            .post("/api/users")
            .json(&json!({ "email": "foo@bar.baz", "password": PASSWORD }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        let tokens = server
            .post("/api/auth/log_in")
            .json(&json!({ "email": "foo@bar.baz", "password": PASSWORD }))
            .await
            .json::<Value>();
        let access_token = tokens["access_token"].as_str().unwrap().to_owned();
        let refresh_token = tokens["refresh_token"].as_str().unwrap().to_owned();
        server
            .get("/api/categories")
            .authorization_bearer(&access_token)
            .await
            .assert_status_ok();
        server
            .post("/api/auth/log_in")
            .text(json!({ "email": "foo@bar.baz", "password": PASSWORD }).to_string())
            .await;

        let logs = buffer.contents();
        assert!(logs.contains("/api/categories"), "nothing was logged");
        assert!(!logs.contains(PASSWORD), "password was logged");
        assert!(!logs.contains(&access_token), "access token was logged");
        assert!(!logs.contains(&refresh_token), "refresh token was logged");
    }
}
