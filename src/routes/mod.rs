/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the module boundary (via Axum
/// layers in `create_router`), so no protected endpoint can be reached without
/// passing its guard first.
///
/// The three modules map directly to the three caller roles.

/// Routes accessible to all callers (health, realm logins).
pub mod public;

/// Routes requiring a web-realm session.
pub mod authenticated;

/// Routes restricted to the admin realm; everything under `/admin` except the
/// login endpoint.
pub mod admin;
