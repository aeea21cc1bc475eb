use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub booking_id: String,
    pub guest_id: String,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub is_public: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub booking_id: String,
    pub guest_id: String,
    pub rating: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl ReviewInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ApiError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(rating: i32) -> ReviewInput {
        ReviewInput {
            booking_id: "bk-1".to_string(),
            guest_id: "g-1".to_string(),
            rating,
            title: None,
            comment: None,
            is_public: None,
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(input(1).validate().is_ok());
        assert!(input(5).validate().is_ok());
        assert!(input(0).validate().is_err());
        assert!(input(6).validate().is_err());
        assert!(input(-3).validate().is_err());
    }
}
