use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{protected::sessions, public};
use crate::state::AppState;

/// Full application router. CORS is layered on by the server binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(session_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_routes() -> Router<AppState> {
    Router::new()
        // Tenant taken from the token (or X-Tenant-Id for superadmins)
        .route("/api/sessions/ensure", post(sessions::ensure_date))
        .route("/api/sessions/ensure-range", post(sessions::ensure_range))
        // Tenant named in the path
        .route("/api/tenants/:tenant/sessions/ensure", post(sessions::ensure_date_for_tenant))
        .route("/api/tenants/:tenant/sessions/ensure-range", post(sessions::ensure_range_for_tenant))
}
