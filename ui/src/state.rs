//! Shared application state for the web server.

use crate::store::SessionStore;
use rag_client::BackendClient;
use std::sync::Arc;

/// Shared state injected into every handler.
pub struct AppState {
    pub client: BackendClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(client: BackendClient) -> Self {
        Self::with_sessions(client, SessionStore::default())
    }

    pub fn with_sessions(client: BackendClient, sessions: SessionStore) -> Self {
        Self { client, sessions }
    }
}

pub type SharedState = Arc<AppState>;
