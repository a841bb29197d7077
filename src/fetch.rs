//! Listing of the month's payments and refunds from the processor

use crate::period::{from_timestamp, ReportPeriod};
use crate::stripe::types::{BalanceTransaction, Expandable};
use crate::stripe::{ApiError, Created, StripeApi};

/// Charges can settle several days after they are created
pub const SETTLEMENT_LOOKBACK_DAYS: i64 = 7;

/// How the month's records are selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Balance transactions created within the month
    #[default]
    Balance,
    /// Charges created up to a week before the month whose settlement falls inside it,
    /// plus refunds created within the month
    Charges,
}

/// A payment as listed, amounts in minor units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayment {
    pub id: String,
    pub amount: i64,
    pub fee: i64,
    pub currency: String,
    pub created: i64,
    pub status: String,
    pub customer: Option<String>,
    pub payment_intent: Option<String>,
    pub invoice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRefund {
    pub id: String,
    /// Minor units, may be negative as listed on the ledger
    pub amount: i64,
    pub currency: String,
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Payment(RawPayment),
    Refund(RawRefund),
    /// A listed record whose settlement could not be read
    Unresolved { id: String, reason: String },
}

/// List every record of the period, draining all pages before returning
pub fn fetch_records<A>(
    api: &A,
    period: &ReportPeriod,
    strategy: Strategy,
) -> Result<Vec<RawRecord>, ApiError>
where
    A: StripeApi + ?Sized,
{
    match strategy {
        Strategy::Balance => fetch_settled(api, period),
        Strategy::Charges => fetch_charges(api, period),
    }
}

fn fetch_settled<A>(api: &A, period: &ReportPeriod) -> Result<Vec<RawRecord>, ApiError>
where
    A: StripeApi + ?Sized,
{
    let created = Created {
        gte: period.start().timestamp(),
        lte: period.end().timestamp(),
    };
    let transactions = api.list_balance_transactions(created)?;
    log::info!("Fetched {} balance transactions", transactions.len());

    Ok(transactions
        .into_iter()
        .filter_map(|txn| {
            if matches!(txn.kind.as_str(), "charge" | "payment") {
                Some(RawRecord::Payment(settled_payment(txn)))
            } else if matches!(txn.kind.as_str(), "refund" | "payment_refund") {
                Some(RawRecord::Refund(RawRefund {
                    id: txn.id,
                    amount: txn.amount,
                    currency: txn.currency,
                    created: txn.created,
                }))
            } else {
                log::debug!("Skipping balance transaction {} of type {}", txn.id, txn.kind);
                None
            }
        })
        .collect())
}

fn settled_payment(txn: BalanceTransaction) -> RawPayment {
    let charge = match txn.source {
        Some(Expandable::Object(source)) if source.object == "charge" => Some(*source),
        _ => None,
    };
    let (customer, payment_intent, invoice, status) = match charge {
        Some(c) => (c.customer, c.payment_intent, c.invoice, c.status),
        None => (None, None, None, None),
    };
    RawPayment {
        id: txn.id,
        amount: txn.amount,
        fee: txn.fee,
        currency: txn.currency,
        created: txn.created,
        status: status.unwrap_or_else(|| "succeeded".to_string()),
        customer,
        payment_intent,
        invoice,
    }
}

/// Only the listings can fail the fetch. A charge whose settlement cannot be
/// read is carried as `Unresolved`.
fn fetch_charges<A>(api: &A, period: &ReportPeriod) -> Result<Vec<RawRecord>, ApiError>
where
    A: StripeApi + ?Sized,
{
    let charges = api.list_charges(Created {
        gte: period.lookback(SETTLEMENT_LOOKBACK_DAYS).timestamp(),
        lte: period.end().timestamp(),
    })?;
    log::info!(
        "Fetched {} charges (including {} days before the period)",
        charges.len(),
        SETTLEMENT_LOOKBACK_DAYS
    );

    let mut records = Vec::new();
    for charge in charges {
        let settlement = match charge.balance_transaction {
            Some(Expandable::Object(txn)) => *txn,
            Some(Expandable::Id(id)) => match api.retrieve_balance_transaction(&id) {
                Ok(txn) => txn,
                Err(err) => {
                    records.push(unresolved(charge.id, err));
                    continue;
                }
            },
            None => {
                log::debug!("Skipping unsettled charge {} ({})", charge.id, charge.status);
                continue;
            }
        };
        let settled = match from_timestamp(settlement.created) {
            Ok(settled) => settled,
            Err(err) => {
                records.push(unresolved(charge.id, err));
                continue;
            }
        };
        if !period.contains(settled) {
            continue;
        }
        records.push(RawRecord::Payment(RawPayment {
            id: charge.id,
            amount: settlement.amount,
            fee: settlement.fee,
            currency: settlement.currency,
            created: charge.created,
            status: charge.status,
            customer: charge.customer,
            payment_intent: charge.payment_intent,
            invoice: charge.invoice,
        }));
    }

    let refunds = api.list_refunds(Created {
        gte: period.start().timestamp(),
        lte: period.end().timestamp(),
    })?;
    log::info!("Fetched {} refunds", refunds.len());
    records.extend(refunds.into_iter().map(|refund| {
        RawRecord::Refund(RawRefund {
            id: refund.id,
            amount: refund.amount,
            currency: refund.currency,
            created: refund.created,
        })
    }));

    Ok(records)
}

fn unresolved(id: String, err: impl std::fmt::Display) -> RawRecord {
    log::warn!("Error retrieving settlement of charge {}: {}", id, err);
    RawRecord::Unresolved {
        id,
        reason: err.to_string(),
    }
}
