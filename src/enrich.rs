//! Resolution of customer and VAT details for listed payments

use crate::fetch::{RawPayment, RawRecord, RawRefund};
use crate::money::{self, normalize_currency};
use crate::period::{from_timestamp, PeriodError};
use crate::progress::Progress;
use crate::stripe::types::{Invoice, InvoiceTax};
use crate::stripe::{ApiError, StripeApi};
use crate::transaction::{EnrichedTransaction, Refund, SkippedTransaction};
use crate::vat::VatReport;

/// Why a single record could not be turned into a report line
#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Time(#[from] PeriodError),
}

/// VAT facts read from an invoice's tax lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxDetails {
    pub vat_applied: bool,
    pub country: Option<String>,
}

/// Enrich every record in order and collect the results into `report`.
///
/// A payment whose lookups fail is recorded as skipped and the run goes on.
pub fn build_report<A>(
    api: &A,
    records: Vec<RawRecord>,
    report: &mut VatReport,
    progress: &mut dyn Progress,
) where
    A: StripeApi + ?Sized,
{
    let total = records.len();
    progress.start(total);

    for (i, record) in records.into_iter().enumerate() {
        progress.advance(i + 1, total);
        match record {
            RawRecord::Refund(refund) => match refund_record(&refund) {
                Ok(record) => report.push_refund(record),
                Err(err) => skip(report, refund.id, err),
            },
            RawRecord::Payment(payment) => match enrich_payment(api, &payment) {
                Ok(transaction) => {
                    let bucket = report.push_payment(transaction);
                    log::trace!("{} -> {}", payment.id, bucket);
                }
                Err(err) => skip(report, payment.id, err),
            },
            RawRecord::Unresolved { id, reason } => {
                report.push_skipped(SkippedTransaction { id, reason })
            }
        }
    }

    progress.finish();
}

fn skip(report: &mut VatReport, id: String, err: impl std::fmt::Display) {
    log::warn!("Error retrieving details for transaction {}: {}", id, err);
    report.push_skipped(SkippedTransaction {
        id,
        reason: err.to_string(),
    });
}

fn refund_record(refund: &RawRefund) -> Result<Refund, PeriodError> {
    Ok(Refund {
        id: refund.id.clone(),
        amount: money::amount(refund.amount, &refund.currency).abs(),
        currency: normalize_currency(&refund.currency),
        created: from_timestamp(refund.created)?,
    })
}

pub fn enrich_payment<A>(api: &A, payment: &RawPayment) -> Result<EnrichedTransaction, EnrichError>
where
    A: StripeApi + ?Sized,
{
    let email = match &payment.customer {
        Some(id) => api.retrieve_customer(id)?.email,
        None => None,
    };

    let (tax, vat_number) = match find_invoice(api, payment)? {
        Some(invoice) => {
            let tax = resolve_tax_details(invoice.taxes(), |rate_id| {
                Ok(api.retrieve_tax_rate(rate_id)?.country)
            })?;
            (tax, eu_vat_number(&invoice))
        }
        None => (TaxDetails::default(), None),
    };

    Ok(EnrichedTransaction {
        id: payment.id.clone(),
        amount: money::amount(payment.amount, &payment.currency),
        currency: normalize_currency(&payment.currency),
        created: from_timestamp(payment.created)?,
        email,
        status: payment.status.clone(),
        country: tax.country.map(|c| c.trim().to_uppercase()),
        vat_number,
        vat_applied: tax.vat_applied,
        fee: money::amount(payment.fee, &payment.currency),
    })
}

/// Invoice paid by this payment, if any. A missing invoice is not an error.
fn find_invoice<A>(api: &A, payment: &RawPayment) -> Result<Option<Invoice>, ApiError>
where
    A: StripeApi + ?Sized,
{
    let invoice_id = match (&payment.invoice, &payment.payment_intent) {
        (Some(invoice), _) => Some(invoice.clone()),
        (None, Some(intent)) => absent_if_not_found(api.find_invoice_payment(intent))?
            .flatten()
            .map(|p| p.invoice),
        (None, None) => None,
    };
    match invoice_id {
        Some(id) => absent_if_not_found(api.retrieve_invoice(&id)),
        None => Ok(None),
    }
}

fn absent_if_not_found<T>(result: Result<T, ApiError>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Fold an invoice's tax lines into VAT facts.
///
/// Any line with a positive amount marks VAT as applied. Each line linked to a
/// tax rate contributes that rate's country; the last non-empty country wins.
pub fn resolve_tax_details<F>(
    taxes: &[InvoiceTax],
    mut rate_country: F,
) -> Result<TaxDetails, ApiError>
where
    F: FnMut(&str) -> Result<Option<String>, ApiError>,
{
    taxes.iter().try_fold(TaxDetails::default(), |acc, tax| {
        let country = match &tax.tax_rate_details {
            Some(details) => rate_country(&details.tax_rate)?.filter(|c| !c.trim().is_empty()),
            None => None,
        };
        Ok(TaxDetails {
            vat_applied: acc.vat_applied || tax.amount > 0,
            country: country.or(acc.country),
        })
    })
}

/// First EU VAT number among the customer's tax ids
pub fn eu_vat_number(invoice: &Invoice) -> Option<String> {
    invoice
        .tax_ids()
        .iter()
        .find(|id| id.kind == "eu_vat")
        .and_then(|id| id.value.clone())
}
