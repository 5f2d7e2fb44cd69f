//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::imaging::decoder::HeifDecoder;
use crate::session::SessionStore;

/// State shared across all HTTP handlers and the session sweeper.
///
/// The session store and the decoder are held here rather than reached as
/// globals, so router tests assemble an isolated state per scenario with a
/// mock decoder and a fresh store.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub decoder: Box<dyn HeifDecoder>,
}

impl AppState {
    pub fn new(config: Config, decoder: impl HeifDecoder + 'static) -> Arc<Self> {
        let sessions = SessionStore::new(config.history.capacity, config.session_ttl());
        Arc::new(Self {
            config,
            sessions,
            decoder: Box::new(decoder),
        })
    }
}
