//! HTTP transport implementation using curl, plus the bounded retry loop.
//!
//! The gateway client talks to the network only through the [`Transport`]
//! trait. [`CurlTransport`] is the production implementation and opens a
//! fresh easy handle per attempt, so one transport can serve concurrent
//! callers without locking.

use crate::config::GatewayConfig;
use crate::constants;
use curl::easy::{Easy2, Handler, List, WriteError};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// An outbound POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Build a JSON POST with `Accept` and `Content-Type` set to `application/json`.
    pub fn json_post<T: Serialize + ?Sized>(
        url: impl Into<String>,
        payload: &T,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            url: url.into(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: serde_json::to_vec(payload)?,
        })
    }

    /// Set a header, replacing any existing value with the same name (case-insensitive).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Decode the request body as JSON.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status_code: u32,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status_code: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// 4xx or 5xx. These are retried and, on the last attempt, reported as failures.
    pub fn is_failure(&self) -> bool {
        self.status_code >= 400
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON. An empty body decodes to `null`.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&self.body)
    }

    /// Get a header value by name (case-insensitive).
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }
}

/// A request that never produced an HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

impl From<curl::Error> for TransportError {
    fn from(err: curl::Error) -> Self {
        let msg = err.to_string();
        if err.is_operation_timedout() {
            TransportError::Timeout(msg)
        } else if err.is_couldnt_connect()
            || err.is_couldnt_resolve_host()
            || err.is_couldnt_resolve_proxy()
            || err.is_ssl_connect_error()
        {
            TransportError::Connect(msg)
        } else {
            TransportError::Other(msg)
        }
    }
}

/// Sends one POST and returns whatever the server answered, whatever the status.
pub trait Transport: Send + Sync {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).post(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).post(request)
    }
}

struct ResponseHandler {
    data: Vec<u8>,
    headers: HashMap<String, String>,
}

impl ResponseHandler {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            headers: HashMap::new(),
        }
    }
}

impl Handler for ResponseHandler {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.data.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, header: &[u8]) -> bool {
        if let Ok(header_str) = std::str::from_utf8(header) {
            // Each followed redirect starts a fresh header block.
            if header_str.starts_with("HTTP/") {
                self.headers.clear();
            } else if let Some((key, value)) = header_str.split_once(':') {
                self.headers
                    .insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }
        true
    }
}

/// Builder for configuring a [`CurlTransport`].
#[must_use]
pub struct CurlTransportBuilder {
    verbose: bool,
    follow_redirects: bool,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
}

impl CurlTransportBuilder {
    pub fn new() -> Self {
        Self {
            verbose: false,
            follow_redirects: false,
            timeout: None,
            user_agent: None,
            headers: Vec::new(),
        }
    }

    /// Builder preloaded with the timeout and user agent from `config`,
    /// following gateway redirects.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let builder = Self::new()
            .timeout(config.timeout_secs)
            .follow_redirects(true);
        match config.user_agent {
            Some(ref ua) => builder.user_agent(ua),
            None => builder,
        }
    }

    /// Enable libcurl's verbose output on stderr.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Follow `Location` on 3xx replies, up to [`constants::MAX_REDIRECTS`] hops.
    ///
    /// libcurl turns the POST into a GET on 301/302/303, the way browsers do.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set request timeout in seconds. Zero means no timeout.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> CurlTransport {
        CurlTransport {
            verbose: self.verbose,
            follow_redirects: self.follow_redirects,
            timeout: self.timeout,
            user_agent: self
                .user_agent
                .unwrap_or_else(constants::default_user_agent),
            headers: self.headers,
        }
    }
}

impl Default for CurlTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking transport backed by libcurl.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    verbose: bool,
    follow_redirects: bool,
    timeout: Option<Duration>,
    user_agent: String,
    headers: Vec<(String, String)>,
}

impl CurlTransport {
    pub fn builder() -> CurlTransportBuilder {
        CurlTransportBuilder::new()
    }

    fn perform(&self, request: &HttpRequest) -> Result<HttpResponse, curl::Error> {
        let mut curl = Easy2::new(ResponseHandler::new());
        curl.url(&request.url)?;
        curl.post(true)?;
        curl.post_field_size(request.body.len() as u64)?;
        curl.post_fields_copy(&request.body)?;
        curl.useragent(&self.user_agent)?;
        curl.verbose(self.verbose)?;
        if self.follow_redirects {
            curl.follow_location(true)?;
            curl.max_redirections(constants::MAX_REDIRECTS)?;
        }
        if let Some(timeout) = self.timeout {
            curl.timeout(timeout)?;
        }

        let mut list = List::new();
        for (name, value) in self.headers.iter().chain(request.headers.iter()) {
            list.append(&format!("{name}: {value}"))?;
        }
        // Suppress `Expect: 100-continue`, the gateway answers the full request directly.
        list.append("Expect:")?;
        curl.http_headers(list)?;

        curl.perform()?;

        let status_code = curl.response_code()?;
        let handler = curl.get_mut();

        Ok(HttpResponse {
            status_code,
            headers: std::mem::take(&mut handler.headers),
            body: std::mem::take(&mut handler.data),
        })
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        CurlTransportBuilder::new().build()
    }
}

impl Transport for CurlTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.perform(request).map_err(TransportError::from)
    }
}

/// Fixed-delay retry policy: `attempts` total tries, `delay` between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_RETRY_ATTEMPTS,
            Duration::from_millis(constants::DEFAULT_RETRY_SLEEP_MS),
        )
    }
}

/// Why the final attempt of a request failed.
#[derive(Error, Debug)]
pub enum RequestFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP request returned status code {}", .0.status_code)]
    Status(HttpResponse),
}

impl RequestFailure {
    /// Status of the failing response, `0` when none was received.
    pub fn status_code(&self) -> u32 {
        match self {
            RequestFailure::Transport(_) => 0,
            RequestFailure::Status(response) => response.status_code,
        }
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            RequestFailure::Transport(_) => None,
            RequestFailure::Status(response) => Some(response),
        }
    }
}

/// Send `request`, retrying transport failures and 4xx/5xx responses.
///
/// Responses below 400 are returned as-is on the first attempt that gets one.
/// The body is never inspected to decide on a retry.
pub fn send_with_retry<T: Transport + ?Sized>(
    transport: &T,
    request: &HttpRequest,
    policy: &RetryPolicy,
) -> Result<HttpResponse, RequestFailure> {
    let mut attempt = 1;
    loop {
        tracing::debug!(url = %request.url, attempt, "sending gateway request");

        let outcome = match transport.post(request) {
            Ok(response) if response.is_failure() => Err(RequestFailure::Status(response)),
            Ok(response) => Ok(response),
            Err(err) => Err(RequestFailure::Transport(err)),
        };

        match outcome {
            Ok(response) => return Ok(response),
            Err(failure) if attempt < policy.attempts() => {
                tracing::warn!(
                    url = %request.url,
                    attempt,
                    max_attempts = policy.attempts(),
                    error = %failure,
                    "gateway request failed, retrying"
                );
                if !policy.delay().is_zero() {
                    std::thread::sleep(policy.delay());
                }
                attempt += 1;
            }
            Err(failure) => return Err(failure),
        }
    }
}
