use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Fixed page size for every resource listing.
pub const PAGE_SIZE: i64 = 15;

// --- Core Application Schemas (Mapped to Database) ---

/// Category
///
/// A restaurant category row from the `categories` table. Categories relate to
/// restaurants many-to-many through the `category_restaurant` join table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Restaurant
///
/// A restaurant row from the `restaurants` table. The price range and the
/// opening window are plain scalar columns; only presence is enforced on input,
/// there is no cross-field validation between them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub lowest_price: i32,
    pub highest_price: i32,
    pub postal_code: String,
    pub address: String,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "10:00:00")]
    pub opening_time: NaiveTime,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "21:30:00")]
    pub closing_time: NaiveTime,
    pub seating_capacity: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// User
///
/// An end-user account from the `users` table, the credential store of the
/// "web" realm. The password hash travels with the row internally but is never
/// serialized into a response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2 hash. Excluded from every serialized representation.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password: String,
    pub name: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Admin
///
/// An administrator account from the `admins` table, the credential store of
/// the "admin" realm. Kept strictly separate from `User`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Admin {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Listing Envelope ---

/// Page
///
/// The pagination envelope every resource listing returns: the current slice,
/// the full unpaginated match count, the page coordinates, and the keyword that
/// produced the result set (`None` when listing everything).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub keyword: Option<String>,
}

/// ListQuery
///
/// Accepted query parameters for every listing endpoint. A missing `page`
/// defaults to the first page; keyword semantics are resolved by the handler.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Substring to match against the resource's name (users: name or email).
    pub keyword: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateCategoryRequest
///
/// Input payload for POST /admin/categories. The name is the only field and it
/// must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

/// UpdateCategoryRequest
///
/// Input payload for PATCH /admin/categories/{id}. Validated identically to
/// create; the row keeps its identifier.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

/// CreateRestaurantRequest
///
/// Input payload for POST /admin/restaurants. `category_ids` replaces the
/// restaurant's join-table associations wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateRestaurantRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    pub lowest_price: i32,
    pub highest_price: i32,
    pub postal_code: String,
    pub address: String,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "10:00:00")]
    pub opening_time: NaiveTime,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "21:30:00")]
    pub closing_time: NaiveTime,
    pub seating_capacity: i32,
    /// Categories to associate. Missing means "no associations".
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

/// UpdateRestaurantRequest
///
/// Full-payload update for PATCH /admin/restaurants/{id}; same shape and
/// validation as create. Partial updates are not part of the contract.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateRestaurantRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: String,
    pub lowest_price: i32,
    pub highest_price: i32,
    pub postal_code: String,
    pub address: String,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "10:00:00")]
    pub opening_time: NaiveTime,
    #[ts(type = "string")]
    #[schema(value_type = String, example = "21:30:00")]
    pub closing_time: NaiveTime,
    pub seating_capacity: i32,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

/// CreateUserRequest
///
/// Input payload for POST /admin/users. The plaintext password is hashed before
/// it reaches the repository and is never persisted or logged as-is.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// UpdateUserRequest
///
/// PATCH /admin/users/{id}. Name and email follow the create rules; the
/// password is optional and, when present, replaces the stored hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

// --- Authentication Payloads ---

/// LoginRequest
///
/// Shared payload for POST /login (web realm) and POST /admin/login (admin
/// realm); the route determines which credential table is consulted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// LoginResponse
///
/// A freshly minted realm-scoped session token, presented back as
/// `Authorization: Bearer <token>` on subsequent requests.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
}
