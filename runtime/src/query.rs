//! Query adapter returning data-or-error outcomes.
//!
//! Caching layers want a value back for every query instead of a
//! rejection. [`base_query`] issues a GET through the manager and folds the
//! result into a [`QueryOutcome`].

use crate::manager::RequestLifecycleManager;
use fetchkit_core::{ApiError, HttpClient, RequestConfig};
use serde_json::Value;

/// Result of a query, with failures as values.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The response body
    Data(Value),
    /// The error the request was rejected with
    Error(ApiError),
}

impl QueryOutcome {
    /// Body, if the query succeeded
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        match self {
            Self::Data(data) => Some(data),
            Self::Error(_) => None,
        }
    }

    /// Error, if the query failed
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Data(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Whether the query failed
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Back to a `Result`
    ///
    /// # Errors
    ///
    /// Returns the stored error for `QueryOutcome::Error`.
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Self::Data(data) => Ok(data),
            Self::Error(error) => Err(error),
        }
    }
}

impl From<Result<Value, ApiError>> for QueryOutcome {
    fn from(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Self::Data(data),
            Err(error) => Self::Error(error),
        }
    }
}

/// GET `url` through `manager`, never failing.
pub async fn base_query(
    manager: &RequestLifecycleManager,
    client: &dyn HttpClient,
    url: &str,
) -> QueryOutcome {
    base_query_with(manager, client, url, RequestConfig::default()).await
}

/// [`base_query`] with per-call options.
pub async fn base_query_with(
    manager: &RequestLifecycleManager,
    client: &dyn HttpClient,
    url: &str,
    config: RequestConfig,
) -> QueryOutcome {
    manager.get(url, client, config).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchkit_core::{ApiResponse, Method};
    use fetchkit_testing::{MockHttpClient, MockReply};
    use serde_json::json;

    #[tokio::test]
    async fn test_successful_query_wraps_data() {
        let client = MockHttpClient::new().on(
            Method::Get,
            "test/url",
            MockReply::Respond(ApiResponse::ok(json!("test data"))),
        );
        let manager = RequestLifecycleManager::new();

        let outcome = base_query(&manager, &client, "test/url").await;
        assert_eq!(outcome, QueryOutcome::Data(json!("test data")));
        assert_eq!(outcome.data(), Some(&json!("test data")));
    }

    #[tokio::test]
    async fn test_failed_query_wraps_error() {
        let error = ApiError::Network("Network Error".into());
        let client =
            MockHttpClient::new().on(Method::Get, "test/url", MockReply::Fail(error.clone()));
        let manager = RequestLifecycleManager::new();

        let outcome = base_query(&manager, &client, "test/url").await;
        assert!(outcome.is_error());
        assert_eq!(outcome.error(), Some(&error));
        assert_eq!(outcome.into_result(), Err(error));
    }

    #[tokio::test]
    async fn test_empty_body_is_still_data() {
        let client = MockHttpClient::new().on(
            Method::Get,
            "test/url",
            MockReply::Respond(ApiResponse::new(204, Value::Null)),
        );
        let manager = RequestLifecycleManager::new();

        let outcome = base_query(&manager, &client, "test/url").await;
        assert_eq!(outcome, QueryOutcome::Data(Value::Null));
    }

    #[tokio::test]
    async fn test_query_passes_config_through() {
        let client = MockHttpClient::new().on(
            Method::Get,
            "search",
            MockReply::Respond(ApiResponse::ok(json!([]))),
        );
        let manager = RequestLifecycleManager::new();

        let outcome = base_query_with(
            &manager,
            &client,
            "search",
            RequestConfig::new().with_query("q", "rust"),
        )
        .await;

        assert_eq!(outcome, QueryOutcome::Data(json!([])));
        assert_eq!(client.calls()[0].query, vec![("q".to_string(), "rust".to_string())]);
    }
}
