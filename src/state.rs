use std::sync::Arc;

use crate::auth::events::SessionContext;
use crate::auth::rate_limit::RateLimiter;
use crate::config::AppConfig;
use crate::storage::ObjectStorage;
use crate::store::Stores;

/// Everything handlers share, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub stores: Stores,
    pub storage: Arc<dyn ObjectStorage>,
    pub sessions: SessionContext,
    pub limiter: RateLimiter,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(stores: Stores, storage: Arc<dyn ObjectStorage>, config: AppConfig) -> Self {
        Self {
            stores,
            storage,
            sessions: SessionContext::default(),
            limiter: RateLimiter::default(),
            config,
        }
    }
}
