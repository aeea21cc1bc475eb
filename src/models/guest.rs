use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// A person who books the house, deduplicated by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub special_requests: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl GuestInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.first_name.trim().is_empty() {
            return Err(ApiError::Validation("first name is required".to_string()));
        }
        if self.last_name.trim().is_empty() {
            return Err(ApiError::Validation("last name is required".to_string()));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        Ok(())
    }
}

fn is_valid_email(s: &str) -> bool {
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
