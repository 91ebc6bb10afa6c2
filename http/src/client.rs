//! Reqwest-backed [`HttpClient`].

use crate::interceptor::{Interceptor, RequestContext, TimingInterceptor};
use fetchkit_core::environment::{Clock, SystemClock};
use fetchkit_core::{
    ApiConfig, ApiError, ApiResponse, ClientFactory, HttpClient, Method, RequestConfig,
    ResponseFuture, with_cancellation,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client bound to one API's base URL and common headers
#[derive(Clone)]
pub struct ReqwestClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ReqwestClient {
    /// Build a client from API settings, timing requests with the system clock.
    ///
    /// A zero `timeout_ms` disables the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` for a header name or value that is not
    /// valid HTTP, or if the underlying client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`from_config`](Self::from_config), with the timing clock supplied.
    ///
    /// # Errors
    ///
    /// See [`from_config`](Self::from_config).
    pub fn from_config_with_clock(config: &ApiConfig, clock: Arc<dyn Clock>) -> Result<Self, ApiError> {
        let timeout = (config.timeout_ms > 0).then(|| config.timeout());

        let mut builder = Client::builder().default_headers(default_headers(config)?);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.host.trim().to_string(),
            timeout,
            interceptors: vec![Arc::new(TimingInterceptor::new(clock))],
        })
    }

    /// Append an interceptor; interceptors run in the order they were added
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Base URL relative requests are joined to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        config: RequestConfig,
    ) -> ResponseFuture<'_> {
        let target = resolve_url(&self.base_url, url);
        let mut context = RequestContext::new(method, target.clone());
        for interceptor in &self.interceptors {
            interceptor.on_request(&mut context);
        }

        let mut request = self.client.request(reqwest_method(method), &target);
        for (name, value) in &config.headers {
            request = request.header(name, value);
        }
        if !config.query.is_empty() {
            request = request.query(&config.query);
        }
        if let Some(timeout) = config.timeout {
            request = request.timeout(timeout);
        }
        if method.takes_body() {
            if let Some(body) = &body {
                request = request.json(body);
            }
        }

        let timeout = config.timeout.or(self.timeout);
        let signal = config.signal;

        Box::pin(async move {
            match with_cancellation(signal.as_ref(), dispatch(request, timeout)).await {
                Ok(mut response) => {
                    for interceptor in &self.interceptors {
                        interceptor.on_response(&context, &mut response);
                    }
                    Ok(response)
                },
                Err(error) => {
                    for interceptor in &self.interceptors {
                        interceptor.on_error(&context, &error);
                    }
                    Err(error)
                },
            }
        })
    }
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, config: RequestConfig) -> ResponseFuture<'_> {
        self.execute(Method::Get, url, None, config)
    }

    fn post(&self, url: &str, body: Option<Value>, config: RequestConfig) -> ResponseFuture<'_> {
        self.execute(Method::Post, url, body, config)
    }

    fn put(&self, url: &str, body: Option<Value>, config: RequestConfig) -> ResponseFuture<'_> {
        self.execute(Method::Put, url, body, config)
    }

    fn delete(&self, url: &str, config: RequestConfig) -> ResponseFuture<'_> {
        self.execute(Method::Delete, url, None, config)
    }
}

/// [`ClientFactory`] producing [`ReqwestClient`]s
#[derive(Clone)]
pub struct ReqwestClientFactory {
    clock: Arc<dyn Clock>,
}

impl ReqwestClientFactory {
    /// Factory whose clients time requests with `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for ReqwestClientFactory {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for ReqwestClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClientFactory").finish_non_exhaustive()
    }
}

impl ClientFactory for ReqwestClientFactory {
    fn build(&self, config: &ApiConfig) -> Result<Arc<dyn HttpClient>, ApiError> {
        let client = ReqwestClient::from_config_with_clock(config, Arc::clone(&self.clock))?;
        tracing::info!(base_url = %client.base_url(), "Built HTTP client");
        Ok(Arc::new(client))
    }
}

/// Join `url` onto `base` unless `url` is already absolute.
///
/// `scheme://...` and protocol-relative `//...` URLs are absolute. An empty
/// base or an empty `url` returns the other side untouched. At most two
/// trailing slashes are dropped from `base`; every leading slash is dropped
/// from `url`.
#[must_use]
pub fn resolve_url(base: &str, url: &str) -> String {
    if base.is_empty() || is_absolute_url(url) {
        return url.to_string();
    }
    if url.is_empty() {
        return base.to_string();
    }
    let base = base.strip_suffix('/').unwrap_or(base);
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{base}/{}", url.trim_start_matches('/'))
}

fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    rest.starts_with("//")
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn default_headers(config: &ApiConfig) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    for (name, value) in config.headers.iter().flatten() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Config(format!("Invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::Config(format!("Invalid value for header {name}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

const fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

async fn dispatch(request: RequestBuilder, timeout: Option<Duration>) -> Result<ApiResponse, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| map_error(&e, timeout))?;

    let status = response.status();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let text = response.text().await.map_err(|e| map_error(&e, timeout))?;
    let data = parse_body(&text);

    if status.is_success() {
        Ok(ApiResponse {
            status: status.as_u16(),
            headers,
            data,
            timing: None,
        })
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            data,
        })
    }
}

/// JSON if it parses, the raw text otherwise, `null` when empty
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn map_error(error: &reqwest::Error, timeout: Option<Duration>) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(timeout.unwrap_or_default())
    } else if error.is_builder() {
        ApiError::InvalidRequest(error.to_string())
    } else if error.is_decode() {
        ApiError::Decode(error.to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}
