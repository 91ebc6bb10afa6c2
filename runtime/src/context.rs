//! Application context passed to call sites.

use crate::manager::RequestLifecycleManager;
use crate::navigation::{BackPressContext, Navigator};
use std::sync::Arc;

/// Shared handles a screen needs: the request manager and the back-press
/// stack. Clone it into whatever needs them.
#[derive(Debug, Clone)]
pub struct AppContext {
    requests: Arc<RequestLifecycleManager>,
    back_press: Arc<BackPressContext>,
}

impl AppContext {
    /// Create a context with a fresh request manager
    #[must_use]
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self::with_manager(Arc::new(RequestLifecycleManager::new()), navigator)
    }

    /// Create a context around an existing request manager
    #[must_use]
    pub fn with_manager(requests: Arc<RequestLifecycleManager>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            requests,
            back_press: Arc::new(BackPressContext::new(navigator)),
        }
    }

    /// The request manager
    #[must_use]
    pub fn requests(&self) -> &RequestLifecycleManager {
        &self.requests
    }

    /// The back-press stack
    #[must_use]
    pub fn back_press(&self) -> &BackPressContext {
        &self.back_press
    }

    /// Tear down: cancel every tracked request and drop every handler.
    ///
    /// Returns how many request keys were cancelled.
    pub fn shutdown(&self) -> usize {
        self.back_press.clear();
        let cancelled = self.requests.cancel_all();
        tracing::info!(cancelled, "Application context shut down");
        cancelled
    }
}
