//! API settings state container.
//!
//! Holds the host, common headers and timeout for an API, plus the client
//! built from them. Whenever a setting changes and the settings are ready,
//! the reducer emits an effect that builds a replacement client through the
//! environment's [`ClientFactory`]; the effect feeds back `ClientReady` or
//! `ClientFailed`.

use fetchkit_core::effect::Effect;
use fetchkit_core::reducer::Reducer;
use fetchkit_core::{ApiConfig, ApiError, ClientFactory, HttpClient, SmallVec, smallvec};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Current API settings and the client built from them.
#[derive(Clone, Default)]
pub struct ApisState {
    /// Host, headers and timeout
    pub config: ApiConfig,
    /// Client for `config`, once built
    pub client: Option<Arc<dyn HttpClient>>,
    /// Why the last build failed
    pub last_error: Option<ApiError>,
}

impl ApisState {
    /// State for the given settings, without a client
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: None,
            last_error: None,
        }
    }
}

impl std::fmt::Debug for ApisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApisState")
            .field("config", &self.config)
            .field("client", &self.client.as_ref().map(|_| "<client>"))
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Actions accepted by [`ApisReducer`].
#[derive(Clone)]
pub enum ApisAction {
    /// Replace the host
    UpdateHost(String),
    /// Replace the common headers (`None` withdraws them)
    UpdateHeaders(Option<BTreeMap<String, String>>),
    /// Add or overwrite one common header
    AddHeader {
        /// Header name
        key: String,
        /// Header value
        value: String,
    },
    /// Replace the default timeout
    UpdateTimeout(Duration),
    /// A client was built for the current settings
    ClientReady(Arc<dyn HttpClient>),
    /// Building a client failed
    ClientFailed(ApiError),
}

impl std::fmt::Debug for ApisAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdateHost(host) => f.debug_tuple("UpdateHost").field(host).finish(),
            Self::UpdateHeaders(headers) => f.debug_tuple("UpdateHeaders").field(headers).finish(),
            Self::AddHeader { key, value } => f
                .debug_struct("AddHeader")
                .field("key", key)
                .field("value", value)
                .finish(),
            Self::UpdateTimeout(timeout) => f.debug_tuple("UpdateTimeout").field(timeout).finish(),
            Self::ClientReady(_) => write!(f, "ClientReady(<client>)"),
            Self::ClientFailed(error) => f.debug_tuple("ClientFailed").field(error).finish(),
        }
    }
}

/// Dependencies for [`ApisReducer`].
#[derive(Clone)]
pub struct ApisEnvironment {
    factory: Arc<dyn ClientFactory>,
}

impl ApisEnvironment {
    /// Create an environment that builds clients with `factory`
    #[must_use]
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self { factory }
    }

    /// The client factory
    #[must_use]
    pub fn factory(&self) -> Arc<dyn ClientFactory> {
        Arc::clone(&self.factory)
    }
}

/// Reducer for API settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApisReducer;

impl ApisReducer {
    /// Create the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn rebuild_client(
        state: &ApisState,
        env: &ApisEnvironment,
    ) -> SmallVec<[Effect<ApisAction>; 4]> {
        if !state.config.is_ready() {
            tracing::debug!(host = %state.config.host, "API settings incomplete, not building client");
            return smallvec![Effect::None];
        }

        let factory = env.factory();
        let config = state.config.clone();

        smallvec![Effect::future(async move {
            Some(match factory.build(&config) {
                Ok(client) => ApisAction::ClientReady(client),
                Err(error) => ApisAction::ClientFailed(error),
            })
        })]
    }
}

impl Reducer for ApisReducer {
    type State = ApisState;
    type Action = ApisAction;
    type Environment = ApisEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ApisAction::UpdateHost(host) => {
                state.config.host = host;
                Self::rebuild_client(state, env)
            },
            ApisAction::UpdateHeaders(headers) => {
                state.config.headers = headers;
                Self::rebuild_client(state, env)
            },
            ApisAction::AddHeader { key, value } => {
                state
                    .config
                    .headers
                    .get_or_insert_with(BTreeMap::new)
                    .insert(key, value);
                Self::rebuild_client(state, env)
            },
            ApisAction::UpdateTimeout(timeout) => {
                state.config = std::mem::take(&mut state.config).with_timeout(timeout);
                Self::rebuild_client(state, env)
            },
            ApisAction::ClientReady(client) => {
                tracing::info!(host = %state.config.host, "API client ready");
                state.client = Some(client);
                state.last_error = None;
                smallvec![Effect::None]
            },
            ApisAction::ClientFailed(error) => {
                tracing::error!(host = %state.config.host, error = %error, "Failed to build API client");
                state.last_error = Some(error);
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)] // Test code

    use super::*;
    use fetchkit_testing::reducer_test::assertions;
    use fetchkit_testing::{MockHttpClient, ReducerTest};

    struct MockFactory {
        fail: bool,
    }

    impl ClientFactory for MockFactory {
        fn build(&self, config: &ApiConfig) -> Result<Arc<dyn HttpClient>, ApiError> {
            if self.fail {
                Err(ApiError::Config(format!("cannot use host {}", config.host)))
            } else {
                Ok(Arc::new(MockHttpClient::new()))
            }
        }
    }

    fn apis_test(fail: bool) -> ReducerTest<ApisReducer> {
        ReducerTest::new(
            ApisReducer::new(),
            ApisEnvironment::new(Arc::new(MockFactory { fail })),
        )
    }

    #[test]
    fn test_update_host_without_headers_does_not_build() {
        apis_test(false)
            .given_state(ApisState::new(ApiConfig {
                headers: None,
                ..ApiConfig::default()
            }))
            .when_action(ApisAction::UpdateHost("https://api.example.com".into()))
            .then_state(|state| {
                assert_eq!(state.config.host, "https://api.example.com");
                assert!(state.client.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_update_host_with_headers_schedules_build() {
        apis_test(false)
            .when_action(ApisAction::UpdateHost("https://api.example.com".into()))
            .then_effects(assertions::assert_single_future)
            .run();
    }

    #[test]
    fn test_add_header_creates_header_map() {
        apis_test(false)
            .given_state(ApisState::new(ApiConfig {
                host: "https://api.example.com".into(),
                headers: None,
                ..ApiConfig::default()
            }))
            .when_action(ApisAction::AddHeader {
                key: "x-api-key".into(),
                value: "secret".into(),
            })
            .then_state(|state| {
                let headers = state.config.headers.as_ref().expect("headers provided");
                assert_eq!(headers.get("x-api-key").map(String::as_str), Some("secret"));
            })
            .then_effects(assertions::assert_single_future)
            .run();
    }

    #[test]
    fn test_withdrawing_headers_stops_rebuilds() {
        apis_test(false)
            .given_state(ApisState::new(ApiConfig::new("https://api.example.com")))
            .when_action(ApisAction::UpdateHeaders(None))
            .then_state(|state| assert!(!state.config.is_ready()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn test_build_effect_feeds_back_client_ready() {
        let settled = apis_test(false)
            .when_action(ApisAction::UpdateTimeout(Duration::from_secs(3)))
            .when_action(ApisAction::UpdateHost("https://api.example.com".into()))
            .then_effects(assertions::assert_single_future)
            .run_to_completion()
            .await;

        assert!(matches!(settled.fed_back[..], [ApisAction::ClientReady(_)]));
        assert_eq!(settled.state.config.timeout_ms, 3000);
        assert!(settled.state.client.is_some());
        assert!(settled.state.last_error.is_none());
    }

    #[tokio::test]
    async fn test_build_failure_is_recorded() {
        let settled = apis_test(true)
            .when_action(ApisAction::UpdateHost("not a url".into()))
            .run_to_completion()
            .await;

        assert!(matches!(
            settled.fed_back[..],
            [ApisAction::ClientFailed(ApiError::Config(_))]
        ));
        assert!(settled.state.client.is_none());
        assert!(matches!(settled.state.last_error, Some(ApiError::Config(_))));
    }
}
