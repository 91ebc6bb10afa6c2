//! Response unwrapping and failure logging.

use fetchkit_core::{ApiError, ApiResponse, ErrorKind};
use serde_json::Value;
use std::future::Future;

/// Await a transport call and keep only the response body.
///
/// No recovery happens here: a rejection is logged by kind and handed
/// back unchanged.
///
/// # Errors
///
/// Returns exactly the error `request` rejected with.
pub async fn handle_request<F>(request: F) -> Result<Value, ApiError>
where
    F: Future<Output = Result<ApiResponse, ApiError>>,
{
    match request.await {
        Ok(response) => Ok(response.data),
        Err(error) => {
            log_failure(&error);
            Err(error)
        },
    }
}

fn log_failure(error: &ApiError) {
    match error.kind() {
        ErrorKind::Cancelled => tracing::debug!("Request cancelled"),
        ErrorKind::Response => tracing::warn!(
            status = error.status(),
            "Server responded with an error status"
        ),
        ErrorKind::NoResponse => tracing::warn!(error = %error, "No response received"),
        ErrorKind::Setup => tracing::error!(error = %error, "Request could not be sent"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_success_yields_data_only() {
        let response = ApiResponse::ok(json!({"id": 1})).with_header("etag", "v1");
        let data = handle_request(async { Ok(response) }).await;
        assert_eq!(data, Ok(json!({"id": 1})));
    }

    #[tokio::test]
    async fn test_errors_pass_through_unchanged() {
        let errors = [
            ApiError::Cancelled,
            ApiError::Status {
                status: 422,
                data: json!({"field": "title"}),
            },
            ApiError::Network("connection reset".into()),
            ApiError::InvalidRequest("bad url".into()),
        ];

        for error in errors {
            let expected = error.clone();
            let result = handle_request(async { Err(error) }).await;
            assert_eq!(result, Err(expected));
        }
    }
}
