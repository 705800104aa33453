pub mod devices;
pub mod frames;
pub mod status;

use axum::http::StatusCode;

/// Method fallback for the `/api` routes. The API only speaks GET, POST, PUT
/// and DELETE; anything else is answered with 501 rather than the default
/// 405.
pub async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}
