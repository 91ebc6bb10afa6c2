//! Request identity, methods and per-call configuration.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// HTTP verbs supported by [`HttpClient`](crate::client::HttpClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether this verb carries a request body
    #[must_use]
    pub const fn takes_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a request's target resource.
///
/// The key is the JSON serialization of the resource, so `"todos/1"` (a
/// string) keys as `"\"todos/1\""`. Equal resources always produce equal
/// keys; requests sharing a key share a cancellation scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    /// Derive the key for any serializable resource.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the resource cannot be
    /// serialized to JSON (e.g. a map with non-string keys).
    pub fn from_resource<R: Serialize + ?Sized>(resource: &R) -> Result<Self, ApiError> {
        serde_json::to_string(resource)
            .map(Self)
            .map_err(|e| ApiError::InvalidRequest(format!("resource is not serializable: {e}")))
    }

    /// Derive the key for a URL.
    #[must_use]
    pub fn for_url(url: &str) -> Self {
        Self(Value::String(url.to_owned()).to_string())
    }

    /// The serialized key
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-call options merged into the transport call.
///
/// `signal` is how a transport learns about cancellation; the request
/// manager always overwrites it with the token for the request's key.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Extra headers for this call only
    pub headers: BTreeMap<String, String>,
    /// Query string pairs appended to the URL
    pub query: Vec<(String, String)>,
    /// Time limit for this call (overrides the client default)
    pub timeout: Option<Duration>,
    /// Cancellation signal observed by the transport
    pub signal: Option<CancellationToken>,
}

impl RequestConfig {
    /// Create an empty configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query pair
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the time limit
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a cancellation signal
    #[must_use]
    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// A request as the manager sees it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Verb
    pub method: Method,
    /// Target URL, absolute or relative to the client's base URL
    pub url: String,
    /// JSON body (POST/PUT)
    pub body: Option<Value>,
    /// Per-call options
    pub config: RequestConfig,
}

impl ApiRequest {
    /// Create a request without a body
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            config: RequestConfig::default(),
        }
    }

    /// GET `url`
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// POST `body` to `url`
    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, url).with_body(body)
    }

    /// PUT `body` to `url`
    #[must_use]
    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, url).with_body(body)
    }

    /// DELETE `url`
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Replace the per-call options
    #[must_use]
    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }

    /// Key of the resource this request targets
    #[must_use]
    pub fn key(&self) -> RequestKey {
        RequestKey::for_url(&self.url)
    }
}

/// Race `request` against `signal`.
///
/// Transports wrap their work in this to honor cancellation: an already
/// cancelled signal rejects without polling `request`, and a signal fired
/// mid-flight drops `request` and rejects with [`ApiError::Cancelled`].
///
/// # Errors
///
/// Returns `ApiError::Cancelled` when the signal fires, otherwise whatever
/// `request` resolves to.
pub async fn with_cancellation<F, T>(
    signal: Option<&CancellationToken>,
    request: F,
) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let Some(signal) = signal else {
        return request.await;
    };

    if signal.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    tokio::select! {
        biased;
        () = signal.cancelled() => Err(ApiError::Cancelled),
        result = request => result,
    }
}
