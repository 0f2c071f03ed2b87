use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints accessible to any client, anonymous or logged-in. This module
/// carries the gateway functions of both realms: the liveness probe and the
/// end-user login. The admin login lives in the admin module so the whole
/// `/admin` path tree is assembled in one place, but it is equally unguarded.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness endpoint for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // End-user ("web" realm) credential exchange. Issues a web-realm
        // session token; grants nothing in the admin realm.
        .route("/login", post(handlers::web_login))
}
