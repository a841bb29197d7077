use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use std::fmt;

/// Standard (winter) offset of the Europe/Paris civil calendar, in hours.
pub const PARIS_STANDARD_OFFSET_HOURS: i32 = 1;

const MIN_YEAR: i32 = 2000;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("invalid month {0}: expected 1-12")]
    InvalidMonth(u32),
    #[error("invalid year {0}: expected 2000-9999")]
    InvalidYear(i32),
    #[error("invalid UTC offset {0}h: expected -12 to +14")]
    InvalidOffset(i32),
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

/// A calendar month in a fixed-offset civil timezone.
///
/// Both bounds use the same standard offset, daylight saving time is not
/// applied. For Europe/Paris this means summer months are shifted by one hour
/// relative to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    first: NaiveDate,
    next: NaiveDate,
    offset: FixedOffset,
}

impl ReportPeriod {
    pub fn new(year: i32, month: u32, offset_hours: i32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PeriodError::InvalidYear(year));
        }
        let offset = (-12..=14)
            .contains(&offset_hours)
            .then(|| FixedOffset::east_opt(offset_hours * 3600))
            .flatten()
            .ok_or(PeriodError::InvalidOffset(offset_hours))?;
        let first =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::InvalidYear(year))?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or(PeriodError::InvalidYear(year))?;
        Ok(ReportPeriod { first, next, offset })
    }

    /// Month in the Europe/Paris calendar at its standard offset
    #[cfg(test)]
    pub fn paris(year: i32, month: u32) -> Result<Self, PeriodError> {
        Self::new(year, month, PARIS_STANDARD_OFFSET_HOURS)
    }

    /// Resolve optional CLI arguments against today's date.
    ///
    /// With no arguments the previous month is used. An explicit month without
    /// a year is taken in the current year.
    pub fn resolve(
        year: Option<i32>,
        month: Option<u32>,
        offset_hours: i32,
        today: NaiveDate,
    ) -> Result<Self, PeriodError> {
        let (prev_year, prev_month) = previous_month(today);
        let year = year.unwrap_or(if month.is_some() { today.year() } else { prev_year });
        let month = month.unwrap_or(prev_month);
        Self::new(year, month, offset_hours)
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next - Duration::days(1)
    }

    /// Number of calendar days in the month
    pub fn days(&self) -> i64 {
        (self.next - self.first).num_days()
    }

    /// Midnight of day 1, local time, as a UTC instant
    pub fn start(&self) -> DateTime<Utc> {
        self.local_midnight_utc(self.first)
    }

    /// 23:59:59 of the last day, local time, as a UTC instant
    pub fn end(&self) -> DateTime<Utc> {
        self.local_midnight_utc(self.next) - Duration::seconds(1)
    }

    /// Inclusive on both bounds
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start() && instant <= self.end()
    }

    /// Period start moved back by `days`, for records that settle after creation
    pub fn lookback(&self, days: i64) -> DateTime<Utc> {
        self.start() - Duration::days(days)
    }

    fn local_midnight_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::default());
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.first_day(), self.last_day())
    }
}

/// The month before `today`, rolling the year back in January
pub fn previous_month(today: NaiveDate) -> (i32, u32) {
    match today.month() {
        1 => (today.year() - 1, 12),
        m => (today.year(), m - 1),
    }
}

/// Convert a unix timestamp from the API into a UTC instant
pub fn from_timestamp(secs: i64) -> Result<DateTime<Utc>, PeriodError> {
    DateTime::from_timestamp(secs, 0).ok_or(PeriodError::InvalidTimestamp(secs))
}
