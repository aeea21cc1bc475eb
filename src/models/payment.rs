use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// A payment record for a booking. No gateway is called; records track
/// externally processed money. Status is free-form, `completed` is the
/// value that marks the owning booking paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub amount: String,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub status: String,
    pub processed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "credit_card" => Some(PaymentMethod::CreditCard),
            "paypal" => Some(PaymentMethod::Paypal),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "cash" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }

    /// Lenient parse for stored rows; inserts are validated upstream.
    pub fn parse(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(PaymentMethod::Cash)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub booking_id: String,
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
    pub payment_method: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PaymentInput {
    pub fn validate(&self) -> Result<PaymentMethod, ApiError> {
        let method = PaymentMethod::try_parse(&self.payment_method).ok_or_else(|| {
            ApiError::Validation(format!("invalid payment method: {}", self.payment_method))
        })?;
        if !is_valid_amount(&self.amount) {
            return Err(ApiError::Validation(format!(
                "invalid amount format: {}",
                self.amount
            )));
        }
        Ok(method)
    }
}

// Accepts whole amounts ("890") or exactly two decimals ("890.00").
fn is_valid_amount(s: &str) -> bool {
    match s.split_once('.') {
        None => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
        Some((whole, frac)) => {
            !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.len() == 2
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}
