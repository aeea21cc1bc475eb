use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod bookings;
pub mod guests;
pub mod health;
pub mod payments;
pub mod reviews;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route(
            "/api/bookings/check-availability",
            post(bookings::check_availability),
        )
        .route(
            "/api/bookings/pricing-estimate",
            post(bookings::pricing_estimate),
        )
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking).delete(bookings::cancel_booking),
        )
        .route(
            "/api/bookings/:id/status",
            patch(bookings::update_booking_status),
        )
        .route("/api/guests/by-email/:email", get(guests::get_guest_by_email))
        .route("/api/guests/:id/bookings", get(guests::get_guest_bookings))
        .route("/api/payments", post(payments::create_payment))
        .route(
            "/api/payments/:id/status",
            patch(payments::update_payment_status),
        )
        .route("/api/reviews", post(reviews::create_review))
        .route("/api/reviews/public", get(reviews::get_public_reviews))
        .route("/api/admin/stats", get(admin::get_stats))
        .route(
            "/api/admin/bookings/date-range",
            get(admin::bookings_in_date_range),
        )
        .with_state(state)
}
