//! Scripted in-memory HTTP client.
//!
//! Calls are recorded the moment a verb is invoked, before the returned
//! future is polled, so tests can inspect the attached signal of a request
//! that is still pending.

use fetchkit_core::{
    ApiError, ApiResponse, HttpClient, Method, RequestConfig, ResponseFuture, with_cancellation,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How a route answers
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Resolve with this response
    Respond(ApiResponse),
    /// Reject with this error
    Fail(ApiError),
    /// Never settle unless the signal fires
    Pending,
}

/// One invocation of a verb, as the client saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Verb
    pub method: Method,
    /// URL as passed in
    pub url: String,
    /// Body, for POST and PUT
    pub body: Option<Value>,
    /// Per-call headers
    pub headers: BTreeMap<String, String>,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Per-call timeout
    pub timeout: Option<Duration>,
    /// Attached cancellation signal
    pub signal: Option<CancellationToken>,
}

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<(Method, String), MockReply>,
    calls: Vec<RecordedCall>,
}

/// In-memory [`HttpClient`] answering from a route table.
///
/// Unrouted requests reject with a 404 `Status` error. Every reply honors
/// the attached signal, so a cancelled key rejects with
/// `ApiError::Cancelled` exactly like a real transport would.
///
/// # Example
///
/// ```
/// use fetchkit_core::{ApiResponse, Method};
/// use fetchkit_testing::{MockHttpClient, MockReply};
/// use serde_json::json;
///
/// let client = MockHttpClient::new()
///     .on(Method::Get, "todos/1", MockReply::Respond(ApiResponse::ok(json!({"id": 1}))))
///     .on(Method::Delete, "todos/1", MockReply::Pending);
/// assert_eq!(client.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    script: Arc<Mutex<Script>>,
}

impl MockHttpClient {
    /// Create a client with no routes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method url` with `reply`, replacing any earlier route
    #[must_use]
    pub fn on(self, method: Method, url: impl Into<String>, reply: MockReply) -> Self {
        self.script().routes.insert((method, url.into()), reply);
        self
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }

    /// Number of calls made so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.script().calls.len()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> ResponseFuture<'_> {
        let reply = {
            let mut script = self.script();
            script.calls.push(RecordedCall {
                method,
                url: url.to_string(),
                body,
                headers: config.headers,
                query: config.query,
                timeout: config.timeout,
                signal: config.signal.clone(),
            });
            script.routes.get(&(method, url.to_string())).cloned()
        };
        let signal = config.signal;

        Box::pin(async move {
            with_cancellation(signal.as_ref(), async move {
                match reply {
                    Some(MockReply::Respond(response)) => Ok(response),
                    Some(MockReply::Fail(error)) => Err(error),
                    Some(MockReply::Pending) => std::future::pending().await,
                    None => Err(ApiError::Status {
                        status: 404,
                        data: Value::Null,
                    }),
                }
            })
            .await
        })
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &str, config: RequestConfig) -> ResponseFuture<'_> {
        self.dispatch(Method::Get, url, None, config)
    }

    fn post(&self, url: &str, body: Option<Value>, config: RequestConfig) -> ResponseFuture<'_> {
        self.dispatch(Method::Post, url, body, config)
    }

    fn put(&self, url: &str, body: Option<Value>, config: RequestConfig) -> ResponseFuture<'_> {
        self.dispatch(Method::Put, url, body, config)
    }

    fn delete(&self, url: &str, config: RequestConfig) -> ResponseFuture<'_> {
        self.dispatch(Method::Delete, url, None, config)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_routed_reply() {
        let client = MockHttpClient::new()
            .on(Method::Get, "todos/1", MockReply::Respond(ApiResponse::ok(json!({"id": 1}))));

        let response = client.get("todos/1", RequestConfig::default()).await.unwrap();
        assert_eq!(response.data, json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_unrouted_is_not_found() {
        let client = MockHttpClient::new();
        let error = client.delete("missing", RequestConfig::default()).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
    }

    #[tokio::test]
    async fn test_records_before_polling() {
        let client = MockHttpClient::new();
        let config = RequestConfig::default()
            .with_header("X-Trace", "abc")
            .with_query("page", "2");

        let pending = client.post("todos", Some(json!({"title": "x"})), config);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::Post);
        assert_eq!(calls[0].body, Some(json!({"title": "x"})));
        assert_eq!(calls[0].headers.get("X-Trace").map(String::as_str), Some("abc"));
        assert_eq!(calls[0].query, vec![("page".to_string(), "2".to_string())]);
        drop(pending);
    }

    #[tokio::test]
    async fn test_pending_rejects_on_signal() {
        let client = MockHttpClient::new().on(Method::Get, "slow", MockReply::Pending);
        let token = CancellationToken::new();

        let pending = client.get("slow", RequestConfig::default().with_signal(token.clone()));
        token.cancel();

        assert_eq!(pending.await.unwrap_err(), ApiError::Cancelled);
    }
}
