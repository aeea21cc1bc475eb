use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Guest, Payment};

/// A reservation of the whole house for a contiguous date range.
/// All price fields are server-computed decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub guest_id: String,
    pub check_in_date: NaiveDateTime,
    pub check_out_date: NaiveDateTime,
    pub number_of_guests: i32,
    pub number_of_nights: i32,
    pub base_price: String,
    pub taxes: String,
    pub fees: String,
    pub total_price: String,
    pub status: BookingStatus,
    pub is_paid: bool,
    pub notes: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
}

/// Booking joined with its guest and most recent payment, for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithGuest {
    #[serde(flatten)]
    pub booking: Booking,
    pub guest: Guest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Strict parse for client input.
    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Lenient parse for stored rows.
    pub fn parse(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(BookingStatus::Pending)
    }
}

/// What the client may send when creating a booking. Pricing fields are
/// server-computed and deliberately absent from this type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub check_in_date: String,
    pub check_out_date: String,
    pub number_of_guests: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::try_parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_try_parse_rejects_unknown() {
        assert_eq!(BookingStatus::try_parse("archived"), None);
        assert_eq!(BookingStatus::try_parse("Confirmed"), None);
        assert_eq!(BookingStatus::try_parse(""), None);
    }

    #[test]
    fn test_lenient_parse_defaults_to_pending() {
        assert_eq!(BookingStatus::parse("garbage"), BookingStatus::Pending);
    }
}
