//! # Fetchkit Core
//!
//! Core traits and types for issuing HTTP requests that can be cancelled by
//! the logical resource they target.
//!
//! This crate provides the abstractions every other fetchkit crate builds on:
//!
//! - **`HttpClient`**: The transport capability (GET/POST/PUT/DELETE)
//! - **`RequestKey`**: Deterministic identity of a request's target resource
//! - **`RequestConfig`**: Per-call options, including the cancellation signal
//! - **`ApiResponse`** / **`ApiError`**: What a transport resolves or rejects with
//! - **`ApiConfig`**: Environment-driven API settings
//! - **Reducer / Effect / Environment**: State containers with explicit effects
//!
//! ## Example
//!
//! ```ignore
//! use fetchkit_core::{client::HttpClient, request::RequestConfig};
//!
//! async fn load(client: &dyn HttpClient) -> Result<(), fetchkit_core::ApiError> {
//!     let response = client.get("todos/1", RequestConfig::default()).await?;
//!     println!("{}", response.data);
//!     Ok(())
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};
pub use tokio_util::sync::CancellationToken;

/// HTTP client capability and client factories
pub mod client;

/// Environment-driven configuration
pub mod config;

/// Error taxonomy shared by transports and the request manager
pub mod error;

/// Request identity, methods and per-call configuration
pub mod request;

/// Response envelope and timing metadata
pub mod response;

pub use client::{ClientFactory, HttpClient, ResponseFuture};
pub use config::{ApiConfig, AppEnv};
pub use error::{ApiError, ErrorKind};
pub use request::{ApiRequest, Method, RequestConfig, RequestKey, with_cancellation};
pub use response::{ApiResponse, RequestTiming};

/// Reducer module - state containers driven by actions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They hold the bookkeeping for settings such as the API host and headers,
/// and describe any I/O they need as effects instead of performing it.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for ApisReducer {
    ///     type State = ApisState;
    ///     type Action = ApisAction;
    ///     type Environment = ApisEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut ApisState,
    ///         action: ApisAction,
    ///         env: &ApisEnvironment,
    ///     ) -> SmallVec<[Effect<ApisAction>; 4]> {
    ///         match action {
    ///             ApisAction::UpdateHost(host) => {
    ///                 state.config.host = host;
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by whoever drives the reducer
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed outside the reducer.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the caller.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation whose result is fed back
        #[must_use]
        pub fn future<F>(future: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(future))
        }

        /// Check whether this effect does nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Run the effect and return the action it feeds back, if any
        pub async fn into_action(self) -> Option<Action> {
            match self {
                Effect::None => None,
                Effect::Future(future) => future.await,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Request timing metadata is stamped through this trait, so tests can
    /// pin or step time deterministically.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[tokio::test]
    async fn test_effect_into_action() {
        assert!(Effect::<u8>::None.is_none());
        assert_eq!(Effect::<u8>::None.into_action().await, None);

        let effect = Effect::future(async { Some(7u8) });
        assert!(!effect.is_none());
        assert_eq!(effect.into_action().await, Some(7));
    }
}
