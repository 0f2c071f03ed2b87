use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::{AdminIdentity, WebIdentity};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point (main.rs).
pub use config::AppConfig;
pub use error::AppError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the application
/// from the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` annotations.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::admin_login, handlers::web_login, handlers::get_me,
        handlers::list_categories, handlers::create_category, handlers::update_category,
        handlers::delete_category, handlers::category_restaurants,
        handlers::list_restaurants, handlers::create_restaurant,
        handlers::update_restaurant, handlers::delete_restaurant,
        handlers::list_users, handlers::show_user, handlers::create_user,
        handlers::update_user, handlers::delete_user,
    ),
    components(
        schemas(
            models::Category, models::Restaurant, models::User,
            models::Page<models::Category>, models::Page<models::Restaurant>,
            models::Page<models::User>,
            models::CreateCategoryRequest, models::UpdateCategoryRequest,
            models::CreateRestaurantRequest, models::UpdateRestaurantRequest,
            models::CreateUserRequest, models::UpdateUserRequest,
            models::LoginRequest, models::LoginResponse,
        )
    ),
    tags(
        (name = "resto-portal", description = "Restaurant Directory Admin API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding the application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access behind the trait object.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These let the identity extractors pull exactly the components they need from
// the shared AppState instead of taking the whole state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// admin_guard
///
/// The access-control check for the `/admin` resource subtree, applied as a
/// `route_layer` so it runs before any controller logic and covers every
/// administrative route.
///
/// *Mechanism*: resolving `AdminIdentity` performs the full check (bearer
/// token extraction, signature/expiry validation, realm comparison, and the
/// `admins` row lookup). On any failure the extractor rejects with a redirect
/// to /admin/login and the handler never executes.
async fn admin_guard(_admin: AdminIdentity, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// web_auth_guard
///
/// The web-realm counterpart of `admin_guard`, protecting the authenticated
/// end-user routes.
async fn web_auth_guard(_identity: WebIdentity, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Admin Subtree Assembly
    // The guard wraps the resource routes only; the login endpoint is merged
    // in afterwards so the guard's redirect target stays reachable.
    let admin_router = admin::admin_resource_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard))
        .merge(admin::admin_auth_routes());

    // 3. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Authenticated routes: protected by the web-realm guard.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                web_auth_guard,
            )),
        )
        // Admin routes: nested under '/admin', guarded above.
        .nest("/admin", admin_router)
        // Apply the unified state to all routes.
        .with_state(state);

    // 4. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request tracing: wraps the request/response lifecycle in a
                // span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the tracing span created per request: includes the propagated
/// `x-request-id` so every log line of a request is correlated by one ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
