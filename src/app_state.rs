use std::sync::Arc;

use crate::context::AgentContext;
use crate::services::poller::PollLoop;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub poller: Arc<PollLoop>,
}

impl AppState {
    pub fn new(poller: PollLoop) -> Self {
        Self {
            poller: Arc::new(poller),
        }
    }

    pub fn context(&self) -> &Arc<AgentContext> {
        self.poller.context()
    }
}
