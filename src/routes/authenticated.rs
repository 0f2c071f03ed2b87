use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for callers holding a valid web-realm session. The guard is applied
/// as a `route_layer` in `create_router`; handlers additionally receive the
/// resolved `WebIdentity` as an explicit argument.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /me
        // The authenticated end-user's own record.
        .route("/me", get(handlers::get_me))
}
