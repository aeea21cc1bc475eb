use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::ApiError;

/// Nightly rate for the whole house.
pub const NIGHTLY_RATE: f64 = 250.0;
/// Tax rate applied to the base price.
pub const TAX_RATE: f64 = 0.12;
/// Flat cleaning fee per stay, independent of length and party size.
pub const FLAT_FEE: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuote {
    pub number_of_nights: i32,
    pub base_price: String,
    pub taxes: String,
    pub fees: String,
    pub total_price: String,
}

/// Derive the price breakdown for a stay. Nights are the day span between
/// check-in and check-out, rounded up for partial days. Monetary fields are
/// formatted to two decimals (round half to even).
pub fn compute_pricing(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<PricingQuote, ApiError> {
    let seconds = (check_out - check_in).num_seconds();
    let nights = (seconds as f64 / 86_400.0).ceil() as i64;

    if nights <= 0 {
        return Err(ApiError::DateRange(
            "check-out date must be after check-in date".to_string(),
        ));
    }

    let base = nights as f64 * NIGHTLY_RATE;
    let taxes = base * TAX_RATE;
    let total = base + taxes + FLAT_FEE;

    Ok(PricingQuote {
        number_of_nights: nights as i32,
        base_price: format!("{base:.2}"),
        taxes: format!("{taxes:.2}"),
        fees: format!("{FLAT_FEE:.2}"),
        total_price: format!("{total:.2}"),
    })
}
