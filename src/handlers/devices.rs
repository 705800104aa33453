use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use crate::models::DeviceRecord;
use crate::{storage, AppState};

/// List the tracked devices.
pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeviceRecord>>, StatusCode> {
    let devices = storage::list_devices(&state.db).await.map_err(|e| {
        error!("Failed to fetch devices: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(devices))
}
