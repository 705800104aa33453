use axum::{http::Method, Json};
use serde_json::{json, Value};

/// Landing page, reachable with GET and POST alike. Answers 200 with a small
/// status document so that the Sigfox backend's connectivity probe succeeds.
pub async fn index(method: Method) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "method": method.as_str(),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
