//! Request/response interceptors.
//!
//! Interceptors run in installation order around every call a
//! [`ReqwestClient`](crate::ReqwestClient) makes.

use chrono::{DateTime, Utc};
use fetchkit_core::environment::{Clock, SystemClock};
use fetchkit_core::{ApiError, ApiResponse, Method, RequestTiming};
use std::sync::Arc;

/// What an interceptor knows about the call in progress
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Verb
    pub method: Method,
    /// Resolved URL
    pub url: String,
    /// Set by [`TimingInterceptor`] when the request starts
    pub timing: Option<RequestTiming>,
}

impl RequestContext {
    /// Context for a call that has not started yet
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            timing: None,
        }
    }
}

/// Hook into the request pipeline.
///
/// All methods default to no-ops.
pub trait Interceptor: Send + Sync {
    /// Before the request is sent
    fn on_request(&self, _context: &mut RequestContext) {}

    /// After a successful response, before it is returned
    fn on_response(&self, _context: &RequestContext, _response: &mut ApiResponse) {}

    /// After the call failed, before the error is returned.
    ///
    /// The error is handed back unchanged; interceptors can observe it but
    /// not attach data to it.
    fn on_error(&self, _context: &RequestContext, _error: &ApiError) {}
}

/// Stamps request timing and logs each stage.
///
/// Successful responses carry the finished [`RequestTiming`]. For failed
/// calls the response time is only logged, since `ApiError` has no slot for it.
#[derive(Clone)]
pub struct TimingInterceptor {
    clock: Arc<dyn Clock>,
}

impl TimingInterceptor {
    /// Time requests with `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn finish(&self, context: &RequestContext) -> Option<RequestTiming> {
        context.timing.map(|timing| timing.finish(self.now()))
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for TimingInterceptor {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for TimingInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimingInterceptor").finish_non_exhaustive()
    }
}

impl Interceptor for TimingInterceptor {
    fn on_request(&self, context: &mut RequestContext) {
        let timing = RequestTiming::started(self.now());
        tracing::debug!(
            method = %context.method,
            url = %context.url,
            start_time = %timing.start_time,
            "Starting request"
        );
        context.timing = Some(timing);
    }

    fn on_response(&self, context: &RequestContext, response: &mut ApiResponse) {
        if let Some(timing) = self.finish(context) {
            tracing::debug!(
                method = %context.method,
                url = %context.url,
                status = response.status,
                response_time_ms = timing.response_time_ms,
                "Returning response"
            );
            response.timing = Some(timing);
        }
    }

    fn on_error(&self, context: &RequestContext, error: &ApiError) {
        let response_time_ms = self.finish(context).map(|timing| timing.response_time_ms);
        tracing::debug!(
            method = %context.method,
            url = %context.url,
            error = %error,
            response_time_ms,
            "Response returned with error"
        );
    }
}
