use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::db::queries;
use crate::errors::ApiError;
use crate::models::{BookingInput, BookingStatus, GuestInput};
use crate::services::booking as booking_service;
use crate::services::pricing;
use crate::state::AppState;

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub guest: GuestInput,
    pub booking: BookingInput,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (guest, booking) = {
        let db = state.db.lock().unwrap();
        booking_service::create_booking_with_guest(&db, &body.guest, &body.booking)?
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": { "guest": guest, "booking": booking },
            "message": "booking created successfully",
        })),
    ))
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db, limit, offset)?
    };

    Ok(Json(json!({
        "success": true,
        "data": bookings,
        "pagination": { "limit": limit, "offset": offset },
    })))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking_with_guest(&db, &id)?
    };
    let booking = booking.ok_or(ApiError::NotFound("booking"))?;

    Ok(Json(json!({ "success": true, "data": booking })))
}

// PATCH /api/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = BookingStatus::try_parse(&body.status).ok_or_else(|| {
        ApiError::Validation(format!("invalid booking status: {}", body.status))
    })?;

    let booking = {
        let db = state.db.lock().unwrap();
        booking_service::update_booking_status(&db, &id, status)?
    };

    Ok(Json(json!({
        "success": true,
        "data": booking,
        "message": format!("booking {} successfully", status.as_str()),
    })))
}

// DELETE /api/bookings/:id (logical cancel, not a row delete)
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let booking = {
        let db = state.db.lock().unwrap();
        booking_service::cancel_booking(&db, &id)?
    };

    Ok(Json(json!({
        "success": true,
        "data": booking,
        "message": "booking cancelled successfully",
    })))
}

// POST /api/bookings/check-availability
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeRequest {
    pub check_in_date: String,
    pub check_out_date: String,
}

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DateRangeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let check_in = booking_service::parse_date_input(&body.check_in_date)?;
    let check_out = booking_service::parse_date_input(&body.check_out_date)?;

    let available = {
        let db = state.db.lock().unwrap();
        booking_service::check_availability(&db, check_in, check_out)?
    };

    Ok(Json(json!({
        "success": true,
        "data": {
            "available": available,
            "checkInDate": check_in,
            "checkOutDate": check_out,
        },
    })))
}

// POST /api/bookings/pricing-estimate
pub async fn pricing_estimate(
    Json(body): Json<DateRangeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let check_in = booking_service::parse_date_input(&body.check_in_date)?;
    let check_out = booking_service::parse_date_input(&body.check_out_date)?;
    booking_service::validate_date_range(check_in, check_out)?;

    let quote = pricing::compute_pricing(check_in, check_out)?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "checkInDate": check_in,
            "checkOutDate": check_out,
            "numberOfNights": quote.number_of_nights,
            "basePrice": quote.base_price,
            "taxes": quote.taxes,
            "fees": quote.fees,
            "totalPrice": quote.total_price,
        },
    })))
}
