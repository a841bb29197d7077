use crate::money::normalize_currency;
use crate::transaction::{EnrichedTransaction, Refund, SkippedTransaction};
use crate::vat::{classify, Bucket};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Payments for one month keyed by VAT bucket, plus refunds and skipped payments
#[derive(Debug, Clone)]
pub struct VatReport {
    home_country: String,
    currency: String,
    buckets: BTreeMap<Bucket, Vec<EnrichedTransaction>>,
    refunds: Vec<Refund>,
    skipped: Vec<SkippedTransaction>,
}

impl VatReport {
    pub fn new(home_country: &str, currency: &str) -> Self {
        VatReport {
            home_country: home_country.trim().to_uppercase(),
            currency: normalize_currency(currency),
            buckets: Bucket::ALL.into_iter().map(|b| (b, Vec::new())).collect(),
            refunds: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn home_country(&self) -> &str {
        &self.home_country
    }

    /// Reporting currency used for labels. Amounts are summed without conversion.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Classify and append, keeping arrival order within the bucket
    pub fn push_payment(&mut self, transaction: EnrichedTransaction) -> Bucket {
        let bucket = classify(
            transaction.country.as_deref(),
            transaction.vat_applied,
            &self.home_country,
        );
        self.buckets.entry(bucket).or_default().push(transaction);
        bucket
    }

    pub fn push_refund(&mut self, refund: Refund) {
        self.refunds.push(refund);
    }

    pub fn push_skipped(&mut self, skipped: SkippedTransaction) {
        self.skipped.push(skipped);
    }

    pub fn bucket(&self, bucket: Bucket) -> &[EnrichedTransaction] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or_default()
    }

    /// All buckets in report order, empty ones included
    pub fn buckets(&self) -> impl Iterator<Item = (Bucket, &[EnrichedTransaction])> {
        self.buckets.iter().map(|(b, txs)| (*b, txs.as_slice()))
    }

    pub fn payments(&self) -> impl Iterator<Item = (Bucket, &EnrichedTransaction)> {
        self.buckets()
            .flat_map(|(b, txs)| txs.iter().map(move |tx| (b, tx)))
    }

    pub fn refunds(&self) -> &[Refund] {
        &self.refunds
    }

    pub fn skipped(&self) -> &[SkippedTransaction] {
        &self.skipped
    }

    pub fn payment_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn payment_total(&self) -> Decimal {
        self.payments().map(|(_, tx)| tx.amount).sum()
    }

    pub fn fee_total(&self) -> Decimal {
        self.payments().map(|(_, tx)| tx.fee).sum()
    }

    pub fn bucket_total(&self, bucket: Bucket) -> Decimal {
        self.bucket(bucket).iter().map(|tx| tx.amount).sum()
    }

    pub fn refund_total(&self) -> Decimal {
        self.refunds.iter().map(|r| r.amount).sum()
    }

    /// Currencies seen that differ from the reporting currency
    pub fn foreign_currencies(&self) -> BTreeSet<&str> {
        self.payments()
            .map(|(_, tx)| tx.currency.as_str())
            .chain(self.refunds.iter().map(|r| r.currency.as_str()))
            .filter(|c| !c.eq_ignore_ascii_case(&self.currency))
            .collect()
    }
}
