use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::ApiError;
use crate::models::{Review, ReviewInput};
use crate::state::AppState;

// POST /api/reviews
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReviewInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    body.validate()?;

    let db = state.db.lock().unwrap();
    if !queries::booking_exists(&db, &body.booking_id)? {
        return Err(ApiError::Validation(format!(
            "unknown booking: {}",
            body.booking_id
        )));
    }
    if !queries::guest_exists(&db, &body.guest_id)? {
        return Err(ApiError::Validation(format!(
            "unknown guest: {}",
            body.guest_id
        )));
    }

    let review = Review {
        id: Uuid::new_v4().to_string(),
        booking_id: body.booking_id.clone(),
        guest_id: body.guest_id.clone(),
        rating: body.rating,
        title: body.title.clone(),
        comment: body.comment.clone(),
        is_public: body.is_public.unwrap_or(true),
        created_at: Utc::now().naive_utc(),
    };
    queries::insert_review(&db, &review)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": review,
            "message": "review created successfully",
        })),
    ))
}

// GET /api/reviews/public
#[derive(Deserialize)]
pub struct PublicReviewsQuery {
    pub limit: Option<i64>,
}

pub async fn get_public_reviews(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PublicReviewsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query.limit.unwrap_or(10);

    let reviews = {
        let db = state.db.lock().unwrap();
        queries::get_public_reviews(&db, limit)?
    };

    Ok(Json(json!({ "success": true, "data": reviews })))
}
