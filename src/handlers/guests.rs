use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::db::queries;
use crate::errors::ApiError;
use crate::state::AppState;

// GET /api/guests/by-email/:email
pub async fn get_guest_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let guest = {
        let db = state.db.lock().unwrap();
        queries::get_guest_by_email(&db, &email)?
    };
    let guest = guest.ok_or(ApiError::NotFound("guest"))?;

    Ok(Json(json!({ "success": true, "data": guest })))
}

// GET /api/guests/:id/bookings
pub async fn get_guest_bookings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_bookings_by_guest(&db, &id)?
    };

    Ok(Json(json!({ "success": true, "data": bookings })))
}
