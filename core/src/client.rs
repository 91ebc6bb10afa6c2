//! HTTP client capability.
//!
//! The request manager never talks to the network itself. It hands every
//! call to an [`HttpClient`], attaching the key's cancellation token as
//! `config.signal`. Implementations are expected to honor that signal
//! (see [`with_cancellation`](crate::request::with_cancellation)).

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::request::{Method, RequestConfig};
use crate::response::ApiResponse;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by every [`HttpClient`] verb.
pub type ResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse, ApiError>> + Send + 'a>>;

/// Transport capability with the four verbs.
///
/// # Dyn Compatibility
///
/// Methods return [`ResponseFuture`] instead of using `async fn` so the
/// trait can be used as `Arc<dyn HttpClient>`. The returned future borrows
/// only `self`; implementations copy `url` before going async.
///
/// # Errors
///
/// Each verb's future rejects with an [`ApiError`]: `Cancelled` if the
/// signal fired, `Status` for non-2xx answers, `Network`/`Timeout`/`Decode`
/// when no usable response came back.
pub trait HttpClient: Send + Sync {
    /// GET `url`
    fn get(&self, url: &str, config: RequestConfig) -> ResponseFuture<'_>;

    /// POST `body` to `url`
    ///
    /// A missing body is passed through as-is; rejecting it is up to the
    /// implementation.
    fn post(&self, url: &str, body: Option<Value>, config: RequestConfig) -> ResponseFuture<'_>;

    /// PUT `body` to `url`
    fn put(&self, url: &str, body: Option<Value>, config: RequestConfig) -> ResponseFuture<'_>;

    /// DELETE `url`
    fn delete(&self, url: &str, config: RequestConfig) -> ResponseFuture<'_>;

    /// Dispatch on `method`. The body is dropped for GET and DELETE.
    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> ResponseFuture<'_> {
        match method {
            Method::Get => self.get(url, config),
            Method::Post => self.post(url, body, config),
            Method::Put => self.put(url, body, config),
            Method::Delete => self.delete(url, config),
        }
    }
}

/// Builds clients from API settings.
///
/// The API settings reducer uses this to (re)create its client whenever
/// the host, headers or timeout change.
pub trait ClientFactory: Send + Sync {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the settings cannot produce a client
    /// (unparseable base URL, invalid header name or value).
    fn build(&self, config: &ApiConfig) -> Result<Arc<dyn HttpClient>, ApiError>;
}
