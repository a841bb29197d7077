//! Subset of the Stripe object model read by the report

use serde::Deserialize;

/// One page of a list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// A reference that is either a bare id or the expanded object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

/// Objects that can be used as a pagination cursor
pub trait HasId {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: i64,
    #[serde(default)]
    pub fee: i64,
    pub currency: String,
    pub created: i64,
    #[serde(default)]
    pub source: Option<Expandable<BalanceSource>>,
}

/// The expanded `source` of a balance transaction. Only charges carry the
/// customer and payment references, other objects leave them empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceSource {
    #[allow(dead_code)]
    pub id: String,
    pub object: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub invoice: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    pub created: i64,
    pub status: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub invoice: Option<String>,
    #[serde(default)]
    pub balance_transaction: Option<Expandable<BalanceTransaction>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub created: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    #[allow(dead_code)]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Invoice {
    #[allow(dead_code)]
    pub id: String,
    #[serde(default)]
    pub total_taxes: Option<Vec<InvoiceTax>>,
    #[serde(default)]
    pub customer_tax_ids: Option<Vec<CustomerTaxId>>,
}

impl Invoice {
    pub fn taxes(&self) -> &[InvoiceTax] {
        self.total_taxes.as_deref().unwrap_or_default()
    }

    pub fn tax_ids(&self) -> &[CustomerTaxId] {
        self.customer_tax_ids.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceTax {
    pub amount: i64,
    #[serde(default)]
    pub tax_rate_details: Option<TaxRateDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxRateDetails {
    pub tax_rate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerTaxId {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxRate {
    #[allow(dead_code)]
    pub id: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoicePayment {
    pub id: String,
    pub invoice: String,
}

/// Error envelope returned with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

macro_rules! impl_has_id {
    ($($ty:ty),*) => {
        $(impl HasId for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_has_id!(BalanceTransaction, Charge, Refund, InvoicePayment);
