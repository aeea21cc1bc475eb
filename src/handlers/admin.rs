use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::db::queries;
use crate::errors::ApiError;
use crate::services::booking as booking_service;
use crate::state::AppState;

// GET /api/admin/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_booking_stats(&db)?
    };

    Ok(Json(json!({ "success": true, "data": stats })))
}

// GET /api/admin/bookings/date-range?startDate&endDate
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: String,
    pub end_date: String,
}

pub async fn bookings_in_date_range(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let start = booking_service::parse_date_input(&query.start_date)?;
    let end = booking_service::parse_date_input(&query.end_date)?;

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_bookings_in_date_range(&db, start, end)?
    };

    Ok(Json(json!({ "success": true, "data": bookings })))
}
