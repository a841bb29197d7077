//! Report command - fetch, classify and print the month's VAT report

mod display;

use crate::cmd::period::PeriodArgs;
use crate::config::Config;
use crate::enrich::build_report;
use crate::fetch::{fetch_records, Strategy};
use crate::progress::{ConsoleProgress, Silent};
use crate::stripe::Client;
use crate::vat::VatReport;
use clap::{Args, ValueEnum};
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ReportCommand {
    #[command(flatten)]
    period: PeriodArgs,

    /// Company's home country (ISO-3166 alpha-2)
    #[arg(short, long, default_value = "FR", value_parser = parse_country)]
    country: String,

    /// How the month's payments are selected
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Balance)]
    strategy: StrategyArg,

    /// Currency label for totals (amounts are not converted)
    #[arg(long, default_value = "EUR")]
    currency: String,

    /// Output as JSON instead of formatted text
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output payments as CSV
    #[arg(long)]
    csv: bool,

    /// Do not show progress while transactions are processed
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum StrategyArg {
    /// Settled balance transactions of the month
    #[default]
    Balance,
    /// Charges settled during the month, with a 7 day lookback
    Charges,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Balance => Strategy::Balance,
            StrategyArg::Charges => Strategy::Charges,
        }
    }
}

fn parse_country(s: &str) -> Result<String, String> {
    let code = s.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_uppercase())
    } else {
        Err(format!("'{}' is not a two-letter country code", s))
    }
}

impl ReportCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let period = self.period.resolve()?;
        let config = Config::load()?;
        let client = Client::new(&config);

        log::info!("Fetch transactions from {} to {}", period.first_day(), period.last_day());
        let records = fetch_records(&client, &period, self.strategy.into())?;

        let mut report = VatReport::new(&self.country, &self.currency);
        if self.quiet {
            build_report(&client, records, &mut report, &mut Silent);
        } else {
            build_report(&client, records, &mut report, &mut ConsoleProgress::stderr());
        }

        for currency in report.foreign_currencies() {
            log::warn!(
                "{} amounts are summed with {} totals without conversion",
                currency,
                report.currency()
            );
        }
        if !report.skipped().is_empty() {
            log::warn!(
                "{} payment(s) could not be enriched and are excluded from the totals",
                report.skipped().len()
            );
        }

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.json {
            display::write_json(&report, &period, &mut out)?;
        } else if self.csv {
            display::write_csv(&report, &mut out)?;
        } else {
            display::write_text(&report, &period, &mut out)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_codes_are_upper_cased() {
        assert_eq!(parse_country("fr"), Ok("FR".to_string()));
        assert_eq!(parse_country(" de "), Ok("DE".to_string()));
        assert!(parse_country("FRA").is_err());
        assert!(parse_country("F1").is_err());
    }
}
