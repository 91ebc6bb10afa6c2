//! # Fetchkit Testing
//!
//! Testing utilities and helpers for fetchkit.
//!
//! This crate provides:
//! - Deterministic clocks (`FixedClock`, `AdvancingClock`)
//! - `MockHttpClient`: scripted transport that honors cancellation
//! - `ReducerTest`: Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use fetchkit_testing::{MockHttpClient, MockReply};
//! use fetchkit_runtime::RequestLifecycleManager;
//!
//! #[tokio::test]
//! async fn test_cancel() {
//!     let client = MockHttpClient::new().on(Method::Get, "todos/1", MockReply::Pending);
//!     let manager = RequestLifecycleManager::new();
//!
//!     let pending = manager.get("todos/1", &client, RequestConfig::default());
//!     manager.cancel("todos/1");
//!
//!     assert!(pending.await.unwrap_err().is_cancelled());
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use fetchkit_core::environment::Clock;

/// Scripted HTTP client
pub mod mock_client;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use fetchkit_testing::mocks::FixedClock;
    /// use fetchkit_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that moves forward by `step` every time it is read
    ///
    /// The first read returns the start time. Useful for asserting
    /// non-zero response times without sleeping.
    #[derive(Debug)]
    pub struct AdvancingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl AdvancingClock {
        /// Create a clock starting at `start`
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for AdvancingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// 2025-01-01 00:00:00 UTC
    ///
    /// # Panics
    ///
    /// Never in practice; the timestamp is hardcoded.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }
}

// Re-export commonly used items
pub use mock_client::{MockHttpClient, MockReply, RecordedCall};
pub use mocks::{AdvancingClock, FixedClock, test_clock, test_epoch};
pub use reducer_test::ReducerTest;
