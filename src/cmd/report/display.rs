use crate::cmd::period::PeriodOutput;
use crate::money::display_amount;
use crate::period::ReportPeriod;
use crate::transaction::{EnrichedTransaction, Refund, SkippedTransaction};
use crate::vat::{Bucket, VatReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Tabled)]
struct BucketRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Payments")]
    count: usize,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Fees")]
    fees: String,
}

/// One payment per row for CSV output
#[derive(Debug, Serialize)]
struct PaymentRow<'a> {
    bucket: Bucket,
    id: &'a str,
    date: String,
    amount: String,
    currency: &'a str,
    email: &'a str,
    status: &'a str,
    country: &'a str,
    vat_number: &'a str,
    vat_applied: bool,
    fee: String,
}

#[derive(Debug, Serialize)]
struct ReportOutput<'a> {
    period: PeriodOutput,
    home_country: &'a str,
    currency: &'a str,
    payment_count: usize,
    payment_total: String,
    fee_total: String,
    buckets: Vec<BucketOutput<'a>>,
    refunds: RefundsOutput<'a>,
    skipped: &'a [SkippedTransaction],
}

#[derive(Debug, Serialize)]
struct BucketOutput<'a> {
    bucket: Bucket,
    title: &'static str,
    count: usize,
    total: String,
    transactions: &'a [EnrichedTransaction],
}

#[derive(Debug, Serialize)]
struct RefundsOutput<'a> {
    count: usize,
    total: String,
    items: &'a [Refund],
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn write_text<W>(report: &VatReport, period: &ReportPeriod, out: &mut W) -> anyhow::Result<()>
where
    W: Write,
{
    let currency = report.currency();

    writeln!(out, "VAT REPORT {} ({})", period, report.home_country())?;
    writeln!(out)?;
    writeln!(out, "Summary:")?;
    writeln!(out, "Number of payments: {}", report.payment_count())?;
    writeln!(out, "Total: {} {}", display_amount(report.payment_total()), currency)?;
    writeln!(out, "Total Stripe fees: {} {}", display_amount(report.fee_total()), currency)?;
    writeln!(out)?;

    let rows: Vec<BucketRow> = report
        .buckets()
        .map(|(bucket, txs)| BucketRow {
            category: bucket.short_name().to_string(),
            count: txs.len(),
            total: display_amount(report.bucket_total(bucket)),
            fees: display_amount(txs.iter().map(|tx| tx.fee).sum()),
        })
        .collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    writeln!(out, "{}", table)?;

    for (bucket, txs) in report.buckets() {
        writeln!(out)?;
        writeln!(
            out,
            "{}: {} | Total: {} {}",
            bucket.title(),
            txs.len(),
            display_amount(report.bucket_total(bucket)),
            currency
        )?;
        for (i, tx) in txs.iter().enumerate() {
            writeln!(
                out,
                concat!(
                    " {}. Amount: {} {} - Date: {} - Email: {} - Status: {}",
                    " - Country: {} - TVA: {} - Fees: {} {}",
                ),
                i + 1,
                display_amount(tx.amount),
                tx.currency,
                format_date(&tx.created),
                tx.email_display(),
                tx.status,
                tx.country_display(),
                tx.vat_number_display(),
                display_amount(tx.fee),
                tx.currency
            )?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Refunded transactions: {} | Total: {} {}",
        report.refunds().len(),
        display_amount(report.refund_total()),
        currency
    )?;
    for (i, refund) in report.refunds().iter().enumerate() {
        writeln!(
            out,
            "  {}. Amount: {} {} - Date: {}",
            i + 1,
            display_amount(refund.amount),
            refund.currency,
            format_date(&refund.created)
        )?;
    }

    if !report.skipped().is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Skipped transactions (not included in totals): {}",
            report.skipped().len()
        )?;
        for (i, skipped) in report.skipped().iter().enumerate() {
            writeln!(out, "  {}. {} - {}", i + 1, skipped.id, skipped.reason)?;
        }
    }

    Ok(())
}

pub fn write_json<W>(report: &VatReport, period: &ReportPeriod, out: &mut W) -> anyhow::Result<()>
where
    W: Write,
{
    let output = ReportOutput {
        period: PeriodOutput::from(period),
        home_country: report.home_country(),
        currency: report.currency(),
        payment_count: report.payment_count(),
        payment_total: format!("{:.2}", report.payment_total()),
        fee_total: format!("{:.2}", report.fee_total()),
        buckets: report
            .buckets()
            .map(|(bucket, txs)| BucketOutput {
                bucket,
                title: bucket.title(),
                count: txs.len(),
                total: format!("{:.2}", report.bucket_total(bucket)),
                transactions: txs,
            })
            .collect(),
        refunds: RefundsOutput {
            count: report.refunds().len(),
            total: format!("{:.2}", report.refund_total()),
            items: report.refunds(),
        },
        skipped: report.skipped(),
    };

    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_csv<W: Write>(report: &VatReport, out: &mut W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for (bucket, tx) in report.payments() {
        wtr.serialize(PaymentRow {
            bucket,
            id: &tx.id,
            date: format_date(&tx.created),
            amount: format!("{:.2}", tx.amount),
            currency: &tx.currency,
            email: tx.email_display(),
            status: &tx.status,
            country: tx.country_display(),
            vat_number: tx.vat_number_display(),
            vat_applied: tx.vat_applied,
            fee: format!("{:.2}", tx.fee),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
