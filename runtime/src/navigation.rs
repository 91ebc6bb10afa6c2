//! Back-press handler stack.
//!
//! Screens that want to intercept "back" (a modal closing itself, a wizard
//! stepping back) push a handler. A back press runs the most recent
//! handler; with none registered it falls through to the [`Navigator`].
//!
//! The context is owned by [`AppContext`](crate::context::AppContext) and
//! passed to whoever needs it. There is no process-wide handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// A one-shot back-press handler
pub type BackHandler = Box<dyn FnOnce() + Send>;

/// Future returned by [`Navigator::back`]
pub type NavigationFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NavigationError>> + Send + 'a>>;

/// Errors from history navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// There is no previous entry to go back to
    #[error("No history to go back to")]
    NoHistory,

    /// The navigator failed
    #[error("Navigation failed: {0}")]
    Failed(String),
}

/// History navigation used when no handler is registered.
pub trait Navigator: Send + Sync {
    /// Go back one entry.
    ///
    /// # Errors
    ///
    /// Returns a [`NavigationError`] if the navigation could not happen.
    fn back(&self) -> NavigationFuture<'_>;
}

/// What a back press did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackPressOutcome {
    /// The top handler was popped and run
    HandlerInvoked,
    /// No handler; the navigator went back
    Navigated,
    /// No handler; the navigator failed
    NavigationFailed(NavigationError),
}

/// Stack of back-press handlers plus the fallback navigator.
pub struct BackPressContext {
    stack: Mutex<Vec<BackHandler>>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for BackPressContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackPressContext")
            .field("handlers", &self.len())
            .finish_non_exhaustive()
    }
}

impl BackPressContext {
    /// Create an empty stack falling back to `navigator`
    #[must_use]
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            stack: Mutex::new(Vec::new()),
            navigator,
        }
    }

    fn stack(&self) -> MutexGuard<'_, Vec<BackHandler>> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a handler for the next back press
    pub fn push<F>(&self, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut stack = self.stack();
        stack.push(Box::new(handler));
        tracing::trace!(depth = stack.len(), "Pushed back-press handler");
    }

    /// Handle a back press.
    ///
    /// The handler runs after the stack lock is released, so it may push
    /// or clear handlers itself.
    pub async fn handle_back_press(&self) -> BackPressOutcome {
        let handler = self.stack().pop();

        if let Some(handler) = handler {
            handler();
            return BackPressOutcome::HandlerInvoked;
        }

        match self.navigator.back().await {
            Ok(()) => {
                tracing::info!("Back navigation succeeded");
                BackPressOutcome::Navigated
            },
            Err(error) => {
                tracing::error!(error = %error, "Back navigation failed");
                BackPressOutcome::NavigationFailed(error)
            },
        }
    }

    /// Drop every handler
    pub fn clear(&self) {
        let mut stack = self.stack();
        if !stack.is_empty() {
            tracing::trace!(dropped = stack.len(), "Cleared back-press handlers");
            stack.clear();
        }
    }

    /// Number of registered handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack().len()
    }

    /// Whether no handler is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
