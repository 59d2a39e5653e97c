use std::sync::Arc;

use crate::database::session_store::SessionStore;
use crate::middleware::tenant::TenantResolver;
use crate::services::{MaterializerSettings, SessionMaterializer};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub tenants: Arc<dyn TenantResolver>,
    pub materializer: Arc<SessionMaterializer>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        tenants: Arc<dyn TenantResolver>,
        settings: MaterializerSettings,
    ) -> Self {
        let materializer = Arc::new(SessionMaterializer::new(store.clone(), settings));
        Self {
            store,
            tenants,
            materializer,
        }
    }
}
