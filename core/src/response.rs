//! Response envelope and timing metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Start/end stamps recorded around a request by an interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTiming {
    /// When the request left
    pub start_time: DateTime<Utc>,
    /// When the response (or error) came back
    pub end_time: DateTime<Utc>,
    /// `end_time - start_time` in milliseconds
    pub response_time_ms: i64,
}

impl RequestTiming {
    /// Timing for a request that just started
    #[must_use]
    pub const fn started(at: DateTime<Utc>) -> Self {
        Self {
            start_time: at,
            end_time: at,
            response_time_ms: 0,
        }
    }

    /// Close the timing window at `at`
    #[must_use]
    pub fn finish(self, at: DateTime<Utc>) -> Self {
        Self {
            start_time: self.start_time,
            end_time: at,
            response_time_ms: at.signed_duration_since(self.start_time).num_milliseconds(),
        }
    }
}

/// What a transport resolves with.
///
/// Callers of the request manager only ever see `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lower-case names)
    pub headers: BTreeMap<String, String>,
    /// Parsed body
    pub data: Value,
    /// Timing metadata, when an interceptor recorded it
    pub timing: Option<RequestTiming>,
}

impl ApiResponse {
    /// Create a response with no headers or timing
    #[must_use]
    pub const fn new(status: u16, data: Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            data,
            timing: None,
        }
    }

    /// A `200 OK` response carrying `data`
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self::new(200, data)
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach timing metadata
    #[must_use]
    pub const fn with_timing(mut self, timing: RequestTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    /// Drop the envelope, keeping the body
    #[must_use]
    pub fn into_data(self) -> Value {
        self.data
    }
}
