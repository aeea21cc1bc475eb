use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::ApiError;
use crate::models::{Payment, PaymentInput};
use crate::state::AppState;

// POST /api/payments
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let method = body.validate()?;

    let db = state.db.lock().unwrap();
    if !queries::booking_exists(&db, &body.booking_id)? {
        return Err(ApiError::Validation(format!(
            "unknown booking: {}",
            body.booking_id
        )));
    }

    let payment = Payment {
        id: Uuid::new_v4().to_string(),
        booking_id: body.booking_id.clone(),
        amount: body.amount.clone(),
        currency: body.currency.clone().unwrap_or_else(|| "USD".to_string()),
        payment_method: method,
        transaction_id: body.transaction_id.clone(),
        status: body.status.clone().unwrap_or_else(|| "pending".to_string()),
        processed_at: None,
        created_at: Utc::now().naive_utc(),
    };
    queries::insert_payment(&db, &payment)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": payment,
            "message": "payment created successfully",
        })),
    ))
}

// PATCH /api/payments/:id/status
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub status: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

pub async fn update_payment_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<PaymentStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().unwrap();
    let now = Utc::now().naive_utc();

    let payment = queries::set_payment_status(&db, &id, &body.status, body.transaction_id.as_deref(), now)?
        .ok_or(ApiError::NotFound("payment"))?;

    // A completed payment also flips the owning booking's paid flag.
    if payment.status == "completed" {
        queries::mark_booking_paid(&db, &payment.booking_id, now)?;
    }

    Ok(Json(json!({
        "success": true,
        "data": payment,
        "message": "payment status updated successfully",
    })))
}
