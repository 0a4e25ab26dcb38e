//! Reqwest-backed JSON request client.
//!
//! This adapter owns transport details only: URL assembly, JSON encoding,
//! the per-call deadline, status classification and content negotiation on
//! the response. Every failure comes back as a [`RequestError`] value.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ports::RequestError;

/// Deadline applied when a call does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);
/// Deadline for the connection test.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
/// Path probed by [`RequestClient::health_check`].
pub const HEALTH_PATH: &str = "/health";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Per-call overrides.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::POST,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }
}

impl RequestOptions {
    /// Override the HTTP method, `POST` by default.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add or replace a header. Replacing `Content-Type` overrides the JSON
    /// default.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Override the client's default deadline for this call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Method the call will use.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Per-call deadline, if one was set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Successful response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The response declared a JSON content type.
    Json(Value),
    /// Any other payload, undecoded.
    Text(String),
}

impl ResponseBody {
    /// Require a JSON payload.
    pub fn into_json(self) -> Result<Value, RequestError> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Text(text) => Err(RequestError::decode(format!(
                "expected a JSON response, got text: {}",
                preview(&text)
            ))),
        }
    }

    /// Require a JSON payload of shape `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, RequestError> {
        let value = self.into_json()?;
        serde_json::from_value(value)
            .map_err(|error| RequestError::decode(format!("unexpected response shape: {error}")))
    }
}

/// JSON-over-HTTP client for one backend base address.
///
/// Stateless apart from the base address, so one instance can be shared
/// across concurrent callers. No call is ever retried.
pub struct RequestClient {
    http: Client,
    base_url: RwLock<Url>,
    default_timeout: Duration,
}

impl RequestClient {
    /// Build a client using [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Build a client whose calls default to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: RwLock::new(base_url),
            default_timeout: timeout,
        })
    }

    /// Base address calls are currently resolved against.
    pub fn base_url(&self) -> Url {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Point subsequent calls at a different backend.
    pub fn set_base_url(&self, base_url: Url) {
        *self
            .base_url
            .write()
            .unwrap_or_else(PoisonError::into_inner) = base_url;
    }

    /// Deadline for calls that do not set their own.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Send one request.
    ///
    /// `body`, when present, is sent as JSON. The deadline covers the whole
    /// exchange including reading the body; when it elapses the call is
    /// dropped and [`RequestError::Timeout`] is returned. The backend may
    /// still have acted on it.
    pub async fn send(
        &self,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> Result<ResponseBody, RequestError> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let url = join_url(&self.base_url(), path)?;
        debug!(%url, method = %options.method, ?timeout, "sending backend request");

        let mut request = self
            .http
            .request(options.method, url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = request.headers(options.headers);

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|error| map_transport_error(error, timeout))?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let bytes = response
                .bytes()
                .await
                .map_err(|error| map_transport_error(error, timeout))?;
            if !status.is_success() {
                return Err(RequestError::http(
                    status.as_u16(),
                    String::from_utf8_lossy(&bytes),
                ));
            }
            decode_body(content_type.as_deref(), &bytes)
        };

        let result = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(RequestError::timed_out_after(timeout)),
        };
        match &result {
            Ok(ResponseBody::Json(_)) => debug!(path, "backend answered with JSON"),
            Ok(ResponseBody::Text(_)) => debug!(path, "backend answered with text"),
            Err(error) => warn!(path, error = %error, "backend request failed"),
        }
        result
    }

    /// POST `body` to `path` with default options.
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<ResponseBody, RequestError> {
        self.send(path, body, RequestOptions::default()).await
    }

    /// [`send`](Self::send), reporting loading start and stop to `on_loading`.
    ///
    /// The stop notification fires on every exit, including when the
    /// returned future is dropped.
    pub async fn send_with_loading<F>(
        &self,
        path: &str,
        body: Option<&Value>,
        options: RequestOptions,
        on_loading: F,
    ) -> Result<ResponseBody, RequestError>
    where
        F: Fn(bool),
    {
        on_loading(true);
        let _loading = LoadingGuard(&on_loading);
        self.send(path, body, options).await
    }

    /// Check that the backend answers on [`HEALTH_PATH`].
    pub async fn health_check(&self) -> bool {
        self.health_check_at(HEALTH_PATH).await
    }

    /// Check that the backend answers on `path` within
    /// [`HEALTH_CHECK_TIMEOUT`].
    pub async fn health_check_at(&self, path: &str) -> bool {
        let options = RequestOptions::default().with_timeout(HEALTH_CHECK_TIMEOUT);
        match self.send(path, None, options).await {
            Ok(_) => true,
            Err(error) => {
                warn!(error = %error, "backend health check failed");
                false
            }
        }
    }
}

struct LoadingGuard<'a, F: Fn(bool)>(&'a F);

impl<F: Fn(bool)> Drop for LoadingGuard<'_, F> {
    fn drop(&mut self) {
        (self.0)(false);
    }
}

fn join_url(base: &Url, path: &str) -> Result<Url, RequestError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|error| RequestError::transport(format!("invalid request url {joined}: {error}")))
}

fn decode_body(content_type: Option<&str>, bytes: &[u8]) -> Result<ResponseBody, RequestError> {
    let is_json = content_type
        .is_some_and(|value| value.to_ascii_lowercase().contains(JSON_CONTENT_TYPE));
    if is_json {
        return serde_json::from_slice(bytes).map(ResponseBody::Json).map_err(|error| {
            RequestError::decode(format!("invalid JSON payload: {error}"))
        });
    }
    Ok(ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()))
}

fn map_transport_error(error: reqwest::Error, timeout: Duration) -> RequestError {
    if error.is_timeout() {
        RequestError::timed_out_after(timeout)
    } else {
        RequestError::transport(error.to_string())
    }
}

fn preview(text: &str) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network helpers.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Some("application/json"))]
    #[case(Some("application/json; charset=utf-8"))]
    #[case(Some("Application/JSON"))]
    fn json_content_types_are_parsed(#[case] content_type: Option<&str>) {
        let body = decode_body(content_type, br#"{"APIs":{}}"#).expect("valid JSON");
        assert_eq!(body, ResponseBody::Json(json!({"APIs": {}})));
    }

    #[rstest]
    #[case(Some("text/plain"))]
    #[case(Some("text/html; charset=utf-8"))]
    #[case(None)]
    fn other_content_types_stay_text(#[case] content_type: Option<&str>) {
        let body = decode_body(content_type, b"{\"not\":\"parsed\"}").expect("text body");
        assert_eq!(body, ResponseBody::Text("{\"not\":\"parsed\"}".to_owned()));
    }

    #[test]
    fn declared_json_that_does_not_parse_is_a_decode_error() {
        let error = decode_body(Some("application/json"), b"<html>").expect_err("bad JSON");
        assert!(matches!(error, RequestError::Decode { .. }));
    }

    #[rstest]
    #[case("http://localhost:8000", "/get_apis", "http://localhost:8000/get_apis")]
    #[case("http://localhost:8000/", "/get_apis", "http://localhost:8000/get_apis")]
    #[case("https://example.test/api", "/ping", "https://example.test/api/ping")]
    fn paths_are_appended_to_the_base(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("valid base");
        assert_eq!(join_url(&base, path).expect("valid url").as_str(), expected);
    }

    #[test]
    fn default_options_post_without_a_deadline_override() {
        let options = RequestOptions::default();
        assert_eq!(options.method(), &Method::POST);
        assert_eq!(options.timeout(), None);
    }

    #[test]
    fn text_bodies_do_not_decode_as_json() {
        let error = ResponseBody::Text("ok".to_owned())
            .into_json()
            .expect_err("text is not JSON");
        assert!(matches!(error, RequestError::Decode { .. }));
    }

    #[test]
    fn json_bodies_decode_into_types() {
        #[derive(serde::Deserialize)]
        struct Message {
            message: String,
        }
        let message: Message = ResponseBody::Json(json!({"message": "created"}))
            .decode()
            .expect("matching shape");
        assert_eq!(message.message, "created");
    }

    #[test]
    fn base_url_can_be_replaced() {
        let client =
            RequestClient::new(Url::parse("http://localhost:8000").expect("url")).expect("client");
        client.set_base_url(Url::parse("http://backend.test:9000").expect("url"));
        assert_eq!(client.base_url().as_str(), "http://backend.test:9000/");
        assert_eq!(client.default_timeout(), DEFAULT_TIMEOUT);
    }
}
