use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Admin Router Module
///
/// The resource-management surface: list/search, create, update, and delete
/// for categories, restaurants, and users.
///
/// Access Control:
/// `admin_resource_routes` is wrapped by the admin guard middleware in
/// `create_router`, which resolves `AdminIdentity` before any handler runs.
/// Every failure mode (no session, expired session, web-realm session,
/// deleted admin) produces the same redirect to /admin/login. The login
/// endpoint itself is kept in `admin_auth_routes` and merged in after the
/// guard layer so it stays reachable.
pub fn admin_resource_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /admin/categories
        // Paginated keyword search and creation.
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        // PATCH/DELETE /admin/categories/{id}
        .route(
            "/categories/{id}",
            patch(handlers::update_category).delete(handlers::delete_category),
        )
        // GET /admin/categories/{id}/restaurants
        // The join-table accessor: restaurants associated with one category.
        .route(
            "/categories/{id}/restaurants",
            get(handlers::category_restaurants),
        )
        // GET/POST /admin/restaurants
        .route(
            "/restaurants",
            get(handlers::list_restaurants).post(handlers::create_restaurant),
        )
        // PATCH/DELETE /admin/restaurants/{id}
        .route(
            "/restaurants/{id}",
            patch(handlers::update_restaurant).delete(handlers::delete_restaurant),
        )
        // GET/POST /admin/users
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        // GET/PATCH/DELETE /admin/users/{id}
        .route(
            "/users/{id}",
            get(handlers::show_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
}

/// Unguarded companion to the resource routes: the admin credential exchange.
pub fn admin_auth_routes() -> Router<AppState> {
    // POST /admin/login
    Router::new().route("/login", post(handlers::admin_login))
}
