use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub const NO_EMAIL: &str = "No email";
pub const UNKNOWN_COUNTRY: &str = "Unknown";
pub const NO_VAT_NUMBER: &str = "Not available";

/// A settled payment with its customer and VAT details resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTransaction {
    pub id: String,
    /// Major units, signed
    pub amount: Decimal,
    pub currency: String,
    pub created: DateTime<Utc>,
    pub email: Option<String>,
    pub status: String,
    /// ISO-3166 alpha-2 country of the applied tax rate
    pub country: Option<String>,
    pub vat_number: Option<String>,
    pub vat_applied: bool,
    /// Major units
    pub fee: Decimal,
}

impl EnrichedTransaction {
    pub fn email_display(&self) -> &str {
        self.email.as_deref().unwrap_or(NO_EMAIL)
    }

    pub fn country_display(&self) -> &str {
        self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
    }

    pub fn vat_number_display(&self) -> &str {
        self.vat_number.as_deref().unwrap_or(NO_VAT_NUMBER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Refund {
    pub id: String,
    /// Major units, always positive
    pub amount: Decimal,
    pub currency: String,
    pub created: DateTime<Utc>,
}

/// A payment left out of the buckets because a lookup failed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTransaction {
    pub id: String,
    pub reason: String,
}
