//! Keyed cancellation registry and request issuing.
//!
//! # Registry
//!
//! Each request is keyed by the JSON serialization of its URL. A key's
//! token is created on first use and reused by every later request with
//! the same key, so cancelling a key cancels everything in flight for
//! that resource.
//!
//! Entries leave the registry only through [`RequestLifecycleManager::cancel`]
//! or [`RequestLifecycleManager::cancel_all`]. A request that settles on its
//! own leaves its key behind; the next request for that resource reuses it.

use crate::handler::handle_request;
use fetchkit_core::{ApiError, ApiRequest, HttpClient, RequestConfig, RequestKey};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

type Registry = HashMap<RequestKey, CancellationToken>;

/// Issues requests and owns their cancellation tokens.
///
/// Registry mutation happens synchronously inside each method; the lock is
/// never held across an await. The futures returned by the verb methods
/// borrow only the client, so a manager can be cancelled from elsewhere
/// while they are pending.
///
/// # Example
///
/// ```ignore
/// let manager = RequestLifecycleManager::new();
///
/// let first = manager.post("todos/1", json!({}), client, RequestConfig::default());
/// let second = manager.get("todos/1", client, RequestConfig::default());
///
/// // Same key, same token: both are cancelled
/// manager.cancel("todos/1");
/// ```
#[derive(Debug, Default)]
pub struct RequestLifecycleManager {
    registry: Mutex<Registry>,
}

impl RequestLifecycleManager {
    /// Create a manager with an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn token_for(&self, key: &RequestKey) -> CancellationToken {
        let mut registry = self.registry();
        let token = registry
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::trace!(key = %key, "Creating cancellation token");
                CancellationToken::new()
            })
            .clone();
        record_tracked(registry.len());
        token
    }

    /// Issue `request` through `client`.
    ///
    /// The key's token is registered before this returns and is attached to
    /// the call as `config.signal`, replacing any signal the caller set.
    ///
    /// # Errors
    ///
    /// The returned future rejects with whatever the client rejected with,
    /// including `ApiError::Cancelled` once the key is cancelled.
    pub fn issue<'a>(
        &self,
        request: ApiRequest,
        client: &'a dyn HttpClient,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send + use<'a> {
        let key = request.key();
        let token = self.token_for(&key);

        let ApiRequest {
            method,
            url,
            body,
            config,
        } = request;

        metrics::counter!("requests.issued", "method" => method.as_str()).increment(1);
        tracing::debug!(method = %method, key = %key, "Issuing request");

        handle_request(client.send(method, &url, body, config.with_signal(token)))
    }

    /// GET `url`
    ///
    /// # Errors
    ///
    /// See [`issue`](Self::issue).
    pub fn get<'a>(
        &self,
        url: &str,
        client: &'a dyn HttpClient,
        config: RequestConfig,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send + use<'a> {
        self.issue(ApiRequest::get(url).with_config(config), client)
    }

    /// POST `body` to `url`
    ///
    /// # Errors
    ///
    /// See [`issue`](Self::issue).
    pub fn post<'a>(
        &self,
        url: &str,
        body: Value,
        client: &'a dyn HttpClient,
        config: RequestConfig,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send + use<'a> {
        self.issue(ApiRequest::post(url, body).with_config(config), client)
    }

    /// PUT `body` to `url`
    ///
    /// # Errors
    ///
    /// See [`issue`](Self::issue).
    pub fn put<'a>(
        &self,
        url: &str,
        body: Value,
        client: &'a dyn HttpClient,
        config: RequestConfig,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send + use<'a> {
        self.issue(ApiRequest::put(url, body).with_config(config), client)
    }

    /// DELETE `url`
    ///
    /// # Errors
    ///
    /// See [`issue`](Self::issue).
    pub fn delete<'a>(
        &self,
        url: &str,
        client: &'a dyn HttpClient,
        config: RequestConfig,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send + use<'a> {
        self.issue(ApiRequest::delete(url).with_config(config), client)
    }

    /// Cancel every request keyed by `resource`.
    ///
    /// Returns `true` if a token was signalled. Unknown keys are a no-op.
    /// A resource that cannot be serialized can never have been issued, so
    /// it is treated as unknown.
    pub fn cancel<R: Serialize + ?Sized>(&self, resource: &R) -> bool {
        match RequestKey::from_resource(resource) {
            Ok(key) => self.cancel_key(&key),
            Err(error) => {
                tracing::warn!(error = %error, "Ignoring cancel for unserializable resource");
                false
            },
        }
    }

    /// Cancel every request under `key`. See [`cancel`](Self::cancel).
    pub fn cancel_key(&self, key: &RequestKey) -> bool {
        let removed = {
            let mut registry = self.registry();
            let removed = registry.remove(key);
            record_tracked(registry.len());
            removed
        };

        match removed {
            Some(token) => {
                token.cancel();
                metrics::counter!("requests.cancelled").increment(1);
                tracing::debug!(key = %key, "Cancelled request");
                true
            },
            None => {
                tracing::trace!(key = %key, "No request to cancel");
                false
            },
        }
    }

    /// Cancel everything and empty the registry.
    ///
    /// Returns how many keys were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained = {
            let mut registry = self.registry();
            let drained = std::mem::take(&mut *registry);
            record_tracked(0);
            drained
        };

        for token in drained.values() {
            token.cancel();
        }

        let count = drained.len();
        metrics::counter!("requests.cancelled").increment(count as u64);
        tracing::debug!(count, "Cancelled all requests");
        count
    }

    /// Whether `resource` currently has a registry entry
    #[must_use]
    pub fn is_tracked<R: Serialize + ?Sized>(&self, resource: &R) -> bool {
        RequestKey::from_resource(resource)
            .is_ok_and(|key| self.registry().contains_key(&key))
    }

    /// Number of registry entries
    #[must_use]
    pub fn tracked_len(&self) -> usize {
        self.registry().len()
    }

    /// Snapshot of the registered keys, sorted
    #[must_use]
    pub fn tracked_keys(&self) -> Vec<RequestKey> {
        let mut keys: Vec<_> = self.registry().keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn record_tracked(len: usize) {
    // Intentional cast for metrics - registry size is far below 2^53
    #[allow(clippy::cast_precision_loss)]
    metrics::gauge!("requests.tracked").set(len as f64);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

    use super::*;
    use fetchkit_core::{ApiResponse, Method};
    use fetchkit_testing::{MockHttpClient, MockReply};
    use serde_json::json;

    #[test]
    fn test_new_manager_is_empty() {
        let manager = RequestLifecycleManager::new();
        assert_eq!(manager.tracked_len(), 0);
        assert!(manager.tracked_keys().is_empty());
    }

    #[test]
    fn test_issue_registers_key_synchronously() {
        let client = MockHttpClient::new().on(Method::Get, "todos/1", MockReply::Pending);
        let manager = RequestLifecycleManager::new();

        let _pending = manager.get("todos/1", &client, RequestConfig::default());

        assert!(manager.is_tracked("todos/1"));
        assert_eq!(manager.tracked_keys(), vec![RequestKey::for_url("todos/1")]);
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn test_same_key_reuses_token() {
        let client = MockHttpClient::new().on(Method::Get, "todos/1", MockReply::Pending);
        let manager = RequestLifecycleManager::new();

        let _a = manager.get("todos/1", &client, RequestConfig::default());
        let _b = manager.put("todos/1", json!({}), &client, RequestConfig::default());

        assert_eq!(manager.tracked_len(), 1);
        let calls = client.calls();
        let signals: Vec<_> = calls.iter().filter_map(|c| c.signal.clone()).collect();
        assert_eq!(signals.len(), 2);

        manager.cancel("todos/1");
        assert!(signals.iter().all(CancellationToken::is_cancelled));
    }

    #[test]
    fn test_caller_signal_is_replaced() {
        let client = MockHttpClient::new().on(Method::Get, "todos/1", MockReply::Pending);
        let manager = RequestLifecycleManager::new();
        let own = CancellationToken::new();

        let _pending = manager.get(
            "todos/1",
            &client,
            RequestConfig::default().with_signal(own.clone()),
        );
        manager.cancel("todos/1");

        let signal = client.calls()[0].signal.clone().expect("signal attached");
        assert!(signal.is_cancelled());
        assert!(!own.is_cancelled());
    }

    #[test]
    fn test_cancel_unknown_key_is_noop() {
        let manager = RequestLifecycleManager::new();
        assert!(!manager.cancel("xyz"));
        assert!(!manager.cancel_key(&RequestKey::for_url("xyz")));
        assert_eq!(manager.cancel_all(), 0);
    }

    #[test]
    fn test_unserializable_resource_is_unknown() {
        let mut bad = HashMap::new();
        bad.insert((1, 2), ());
        let manager = RequestLifecycleManager::new();
        assert!(!manager.cancel(&bad));
        assert!(!manager.is_tracked(&bad));
    }

    #[tokio::test]
    async fn test_new_token_after_cancel() {
        let client = MockHttpClient::new()
            .on(Method::Get, "todos/1", MockReply::Respond(ApiResponse::ok(json!({"id": 1}))));
        let manager = RequestLifecycleManager::new();

        let cancelled = manager.get("todos/1", &client, RequestConfig::default());
        manager.cancel("todos/1");
        assert_eq!(cancelled.await, Err(ApiError::Cancelled));

        let fresh = manager.get("todos/1", &client, RequestConfig::default()).await;
        assert_eq!(fresh, Ok(json!({"id": 1})));
    }
}
