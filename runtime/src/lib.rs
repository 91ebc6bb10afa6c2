//! # Fetchkit Runtime
//!
//! Request lifecycle management for keyed, cancellable HTTP calls.
//!
//! ## Core Components
//!
//! - **`RequestLifecycleManager`**: Maps request keys to cancellation tokens,
//!   issues calls through an `HttpClient`, cancels one key or all of them
//! - **`handle_request`**: Unwraps a transport response to its `data`, logging failures
//! - **`base_query`**: Adapter that folds a GET into a `QueryOutcome`
//! - **`ApisReducer`**: API settings container that rebuilds its client on change
//! - **`BackPressContext`** / **`AppContext`**: Explicitly passed back-press
//!   handlers and request manager
//!
//! ## Example
//!
//! ```ignore
//! use fetchkit_runtime::RequestLifecycleManager;
//! use fetchkit_core::RequestConfig;
//!
//! let manager = RequestLifecycleManager::new();
//! let pending = manager.get("todos/1", client.as_ref(), RequestConfig::default());
//!
//! // The user navigated away - abort it
//! manager.cancel("todos/1");
//! assert!(pending.await.unwrap_err().is_cancelled());
//! ```

/// API settings state container
pub mod apis;

/// Application context passed to call sites
pub mod context;

/// Response unwrapping and failure logging
pub mod handler;

/// Keyed cancellation registry and request issuing
pub mod manager;

/// Back-press handler stack
pub mod navigation;

/// Query adapter returning data-or-error outcomes
pub mod query;

/// Tracing subscriber setup
pub mod telemetry;

pub use apis::{ApisAction, ApisEnvironment, ApisReducer, ApisState};
pub use context::AppContext;
pub use handler::handle_request;
pub use manager::RequestLifecycleManager;
pub use navigation::{BackPressContext, BackPressOutcome, NavigationError, Navigator};
pub use query::{QueryOutcome, base_query, base_query_with};
pub use telemetry::init_tracing;
