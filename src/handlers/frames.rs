use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, error};

use crate::models::{FrameRecord, RawFrame};
use crate::{storage, AppState};

/// List every stored frame.
pub async fn list_frames(
    State(state): State<AppState>,
) -> Result<Json<Vec<FrameRecord>>, StatusCode> {
    let frames = storage::list_frames(&state.db, None).await.map_err(|e| {
        error!("Failed to fetch frames: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(frames))
}

/// List the frames reported by one device. Unknown devices yield an empty
/// array, not a 404.
pub async fn list_device_frames(
    State(state): State<AppState>,
    Path(device): Path<String>,
) -> Result<Json<Vec<FrameRecord>>, StatusCode> {
    let frames = storage::list_frames(&state.db, Some(&device))
        .await
        .map_err(|e| {
            error!("Failed to fetch frames for {}: {}", device, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(frames))
}

/// Ingest one frame from the Sigfox backend callback.
///
/// The payload normally travels in the request body, but a non-empty query
/// string takes precedence (the backend can be configured to send GET-style
/// callbacks). The backend does not set a Content-Type header, so the payload
/// is read as raw bytes rather than through the JSON extractor.
///
/// Responds 201 when the device asked for an acknowledgment, 204 otherwise,
/// and 400 when no frame could be decoded.
pub async fn ingest_frame(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> StatusCode {
    let payload: &[u8] = match &query {
        Some(q) if !q.is_empty() => q.as_bytes(),
        _ => body.as_ref(),
    };

    let frame: RawFrame = match serde_json::from_slice(payload) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Rejecting unparseable frame: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    let (frame, data_hex) = match frame.normalize() {
        Ok(normalized) => normalized,
        Err(e) => {
            debug!("Rejecting frame from {}: {}", frame_id(payload), e);
            return StatusCode::BAD_REQUEST;
        }
    };

    if let Err(e) = storage::insert_frame(&state.db, &frame, &data_hex).await {
        error!("Failed to store frame from {}: {}", frame.id_modem, e);
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    debug!(
        "Stored frame from {} (seq {}, ack {})",
        frame.id_modem, frame.seq_number, frame.ack
    );

    if frame.ack {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    }
}

/// Drop every frame reported by one device.
pub async fn delete_device_frames(
    State(state): State<AppState>,
    Path(device): Path<String>,
) -> StatusCode {
    match storage::delete_frames(&state.db, &device).await {
        Ok(0) => StatusCode::NOT_FOUND,
        Ok(deleted) => {
            debug!("Deleted {} frames from {}", deleted, device);
            StatusCode::OK
        }
        Err(e) => {
            error!("Failed to delete frames from {}: {}", device, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Best-effort modem id for log lines about rejected payloads.
fn frame_id(payload: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(payload)
        .ok()
        .and_then(|v| v.get("id_modem").and_then(|id| id.as_str().map(String::from)))
        .unwrap_or_else(|| "<unknown>".to_string())
}
