use crate::{
    AppState,
    auth::{self, AdminIdentity, Realm, WebIdentity},
    error::AppError,
    models::{
        Category, CreateCategoryRequest, CreateRestaurantRequest, CreateUserRequest, ListQuery,
        LoginRequest, LoginResponse, Page, Restaurant, UpdateCategoryRequest,
        UpdateRestaurantRequest, UpdateUserRequest, User,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
};
use validator::Validate;

// --- Shared Helpers ---

/// flash_redirect
///
/// The response every successful mutation returns: a 303 redirect to the
/// resource's index plus a short-lived one-shot `flash_notice` cookie. The
/// cookie carries a stable notice token; turning it into localized wording is
/// the presentation layer's job.
fn flash_redirect(location: &'static str, notice: &'static str) -> impl IntoResponse {
    let cookie = format!("flash_notice={notice}; Path=/admin; Max-Age=60; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], Redirect::to(location))
}

/// Normalizes the keyword parameter: an explicitly supplied empty string is
/// treated the same as an absent keyword (match all).
fn applied_keyword(query: &ListQuery) -> Option<String> {
    query.keyword.clone().filter(|k| !k.is_empty())
}

// --- Authentication Handlers ---

/// admin_login
///
/// [Public Route] Verifies credentials against the `admins` table and mints an
/// admin-realm session token. This endpoint sits outside the guarded subtree;
/// it is the target of the guard's redirect.
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Admin session token", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let admin = state
        .repo
        .find_admin_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, &admin.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = auth::issue_token(admin.id, Realm::Admin, &state.config)?;
    tracing::info!(admin_id = admin.id, "admin login");
    Ok(Json(LoginResponse { token }))
}

/// web_login
///
/// [Public Route] The end-user counterpart of `admin_login`: same payload,
/// different credential table, web-realm token. The two realms never share a
/// session.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "End-user session token", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn web_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    payload.validate()?;

    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = auth::issue_token(user.id, Realm::Web, &state.config)?;
    tracing::info!(user_id = user.id, "user login");
    Ok(Json(LoginResponse { token }))
}

/// get_me
///
/// [Authenticated Route] Returns the authenticated end-user's own record. The
/// identity arrives as an explicit extractor value, not an ambient lookup.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Own profile", body = User))
)]
pub async fn get_me(
    identity: WebIdentity,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = state
        .repo
        .find_user(identity.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

// --- Category Handlers ---

/// list_categories
///
/// [Admin Route] Paginated listing with optional keyword search on the name.
/// Read-only; reflects the database state at call time.
#[utoipa::path(
    get,
    path = "/admin/categories",
    params(ListQuery),
    responses((status = 200, description = "Category page", body = Page<Category>))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Category>>, AppError> {
    let keyword = applied_keyword(&query);
    let page = state
        .repo
        .list_categories(keyword, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// create_category
///
/// [Admin Route] Validates the payload, persists one new row, and redirects to
/// the category index with a success notice.
#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 303, description = "Created; redirect to index"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_category(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = state.repo.create_category(payload.name).await?;
    tracing::info!(admin_id = admin.id, category_id = category.id, "category created");
    Ok(flash_redirect("/admin/categories", "category-created"))
}

/// update_category
///
/// [Admin Route] Resolves the target by id (404 before any mutation), applies
/// the same validation as create, and mutates the row in place.
#[utoipa::path(
    patch,
    path = "/admin/categories/{id}",
    request_body = UpdateCategoryRequest,
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 303, description = "Updated; redirect to index"),
        (status = 404, description = "No such category"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_category(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    state
        .repo
        .update_category(id, payload.name)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(admin_id = admin.id, category_id = id, "category updated");
    Ok(flash_redirect("/admin/categories", "category-updated"))
}

/// delete_category
///
/// [Admin Route] Deletes the row. A stale or unknown id fails with 404 rather
/// than succeeding silently.
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 303, description = "Deleted; redirect to index"),
        (status = 404, description = "No such category")
    )
)]
pub async fn delete_category(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.repo.delete_category(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(admin_id = admin.id, category_id = id, "category deleted");
    Ok(flash_redirect("/admin/categories", "category-deleted"))
}

/// category_restaurants
///
/// [Admin Route] The explicit many-to-many accessor: restaurants currently
/// associated with the category, resolved through the join table.
#[utoipa::path(
    get,
    path = "/admin/categories/{id}/restaurants",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Associated restaurants", body = [Restaurant]),
        (status = 404, description = "No such category")
    )
)]
pub async fn category_restaurants(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Restaurant>>, AppError> {
    state
        .repo
        .find_category(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let restaurants = state.repo.restaurants_for_category(id).await?;
    Ok(Json(restaurants))
}

// --- Restaurant Handlers ---

/// list_restaurants
///
/// [Admin Route] Same listing contract as categories.
#[utoipa::path(
    get,
    path = "/admin/restaurants",
    params(ListQuery),
    responses((status = 200, description = "Restaurant page", body = Page<Restaurant>))
)]
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Restaurant>>, AppError> {
    let keyword = applied_keyword(&query);
    let page = state
        .repo
        .list_restaurants(keyword, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// create_restaurant
///
/// [Admin Route] Persists the restaurant and its category associations in one
/// transaction, then redirects with a notice.
#[utoipa::path(
    post,
    path = "/admin/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 303, description = "Created; redirect to index"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_restaurant(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let restaurant = state.repo.create_restaurant(payload).await?;
    tracing::info!(
        admin_id = admin.id,
        restaurant_id = restaurant.id,
        "restaurant created"
    );
    Ok(flash_redirect("/admin/restaurants", "restaurant-created"))
}

/// update_restaurant
///
/// [Admin Route] Full-row update plus association sync; 404 before any
/// mutation when the id is unknown.
#[utoipa::path(
    patch,
    path = "/admin/restaurants/{id}",
    request_body = UpdateRestaurantRequest,
    params(("id" = i64, Path, description = "Restaurant ID")),
    responses(
        (status = 303, description = "Updated; redirect to index"),
        (status = 404, description = "No such restaurant"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_restaurant(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRestaurantRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    state
        .repo
        .update_restaurant(id, payload)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(admin_id = admin.id, restaurant_id = id, "restaurant updated");
    Ok(flash_redirect("/admin/restaurants", "restaurant-updated"))
}

/// delete_restaurant
///
/// [Admin Route] Deletes the row; join rows go with it via the cascade.
#[utoipa::path(
    delete,
    path = "/admin/restaurants/{id}",
    params(("id" = i64, Path, description = "Restaurant ID")),
    responses(
        (status = 303, description = "Deleted; redirect to index"),
        (status = 404, description = "No such restaurant")
    )
)]
pub async fn delete_restaurant(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.repo.delete_restaurant(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(admin_id = admin.id, restaurant_id = id, "restaurant deleted");
    Ok(flash_redirect("/admin/restaurants", "restaurant-deleted"))
}

// --- User Handlers ---

/// list_users
///
/// [Admin Route] Listing contract as above; the keyword matches name or email.
#[utoipa::path(
    get,
    path = "/admin/users",
    params(ListQuery),
    responses((status = 200, description = "User page", body = Page<User>))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<User>>, AppError> {
    let keyword = applied_keyword(&query);
    let page = state
        .repo
        .list_users(keyword, query.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

/// show_user
///
/// [Admin Route] Single-record fetch. The password hash never serializes.
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User record", body = User),
        (status = 404, description = "No such user")
    )
)]
pub async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = state.repo.find_user(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

/// create_user
///
/// [Admin Route] Hashes the submitted password, rejects duplicate emails with
/// a field-level validation error, persists, and redirects with a notice.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 303, description = "Created; redirect to index"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_user(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if state.repo.find_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state.repo.create_user(payload, password_hash).await?;
    tracing::info!(admin_id = admin.id, user_id = user.id, "user created");
    Ok(flash_redirect("/admin/users", "user-created"))
}

/// update_user
///
/// [Admin Route] In-place update; a new password, when supplied, is re-hashed,
/// otherwise the stored hash is kept.
#[utoipa::path(
    patch,
    path = "/admin/users/{id}",
    request_body = UpdateUserRequest,
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 303, description = "Updated; redirect to index"),
        (status = 404, description = "No such user"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_user(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let password_hash = match &payload.password {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };

    state
        .repo
        .update_user(id, payload, password_hash)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(admin_id = admin.id, user_id = id, "user updated");
    Ok(flash_redirect("/admin/users", "user-updated"))
}

/// delete_user
///
/// [Admin Route] Removes the account; its outstanding web-realm tokens die
/// with it at the next guard lookup.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 303, description = "Deleted; redirect to index"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !state.repo.delete_user(id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(admin_id = admin.id, user_id = id, "user deleted");
    Ok(flash_redirect("/admin/users", "user-deleted"))
}
