//! What every tool handler gets: the shared session state and the loaded config.

use crate::config::Config;
use crate::state::{AppState, StateView};
use crate::worker::SharedState;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct ServerContext {
    state: SharedState,
    config: Arc<Config>,
}

impl ServerContext {
    pub fn new(config: Config) -> Self {
        Self {
            state: Arc::new(RwLock::new(AppState::new(&config))),
            config: Arc::new(config),
        }
    }

    /// Wrap an existing state, e.g. one already holding a snapshot.
    pub fn with_state(state: SharedState, config: Arc<Config>) -> Self {
        Self { state, config }
    }

    pub const fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Query view of the current state; the lock is released on return.
    pub async fn view(&self) -> StateView {
        self.state.read().await.view()
    }
}
