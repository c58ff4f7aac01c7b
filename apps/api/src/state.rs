use std::sync::Arc;

use crate::advisor::requester::RecommendationRequester;
use crate::config::Config;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub advisor: RecommendationRequester,
    /// Essay drafts per wizard session. Default: InMemorySessionStore.
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}
