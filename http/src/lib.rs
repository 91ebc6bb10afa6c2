//! # Fetchkit HTTP
//!
//! [`HttpClient`](fetchkit_core::HttpClient) implementation over `reqwest`.
//!
//! - Relative URLs are joined to the configured host; absolute URLs pass through
//! - Common headers and the default timeout come from [`ApiConfig`](fetchkit_core::ApiConfig)
//! - Non-2xx answers reject with `ApiError::Status` carrying the parsed body
//! - Every call honors `config.signal`
//!
//! ## Example
//!
//! ```ignore
//! use fetchkit_core::ApiConfig;
//! use fetchkit_http::ReqwestClient;
//! use fetchkit_runtime::RequestLifecycleManager;
//!
//! let client = ReqwestClient::from_config(&ApiConfig::from_env())?;
//! let manager = RequestLifecycleManager::new();
//! let todo = manager.get("todos/1", &client, Default::default()).await?;
//! ```

/// Reqwest client and factory
pub mod client;

/// Request/response hooks
pub mod interceptor;

pub use client::{ReqwestClient, ReqwestClientFactory, resolve_url};
pub use interceptor::{Interceptor, RequestContext, TimingInterceptor};
