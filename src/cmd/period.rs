//! Period command - show the UTC range a report covers

use crate::period::{PeriodError, ReportPeriod, PARIS_STANDARD_OFFSET_HOURS};
use clap::Args;
use serde::Serialize;

/// Month selection shared by the commands
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Year of the report (defaults to the year of the previous month)
    #[arg(short, long)]
    year: Option<i32>,

    /// Month of the report, 1-12 (defaults to the previous month)
    #[arg(short, long)]
    month: Option<u32>,

    /// UTC offset of the company's civil calendar, in hours
    #[arg(long, default_value_t = PARIS_STANDARD_OFFSET_HOURS, allow_hyphen_values = true)]
    utc_offset: i32,
}

impl PeriodArgs {
    pub fn resolve(&self) -> Result<ReportPeriod, PeriodError> {
        let today = chrono::Local::now().date_naive();
        ReportPeriod::resolve(self.year, self.month, self.utc_offset, today)
    }
}

#[derive(Args, Debug)]
pub struct PeriodCommand {
    #[command(flatten)]
    period: PeriodArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
pub struct PeriodOutput {
    pub year: i32,
    pub month: u32,
    pub first_day: String,
    pub last_day: String,
    pub days: i64,
    pub start: String,
    pub end: String,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
}

impl From<&ReportPeriod> for PeriodOutput {
    fn from(period: &ReportPeriod) -> Self {
        PeriodOutput {
            year: period.year(),
            month: period.month(),
            first_day: period.first_day().to_string(),
            last_day: period.last_day().to_string(),
            days: period.days(),
            start: period.start().to_rfc3339(),
            end: period.end().to_rfc3339(),
            start_timestamp: period.start().timestamp(),
            end_timestamp: period.end().timestamp(),
        }
    }
}

impl PeriodCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let period = self.period.resolve()?;
        let output = PeriodOutput::from(&period);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Period: {} ({} days)", period, output.days);
            println!("  Start: {} ({})", output.start, output.start_timestamp);
            println!("  End:   {} ({})", output.end, output.end_timestamp);
        }
        Ok(())
    }
}
