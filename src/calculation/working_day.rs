//! Working day detection and adjustment.
//!
//! This module determines whether a date is a working day in England and
//! Wales and moves dates that land on a weekend or bank holiday to the
//! nearest working day in a given direction.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::BankHolidayCalendar;
use crate::error::{EngineError, EngineResult};

/// Represents the type of day for working day adjustment.
///
/// # Example
///
/// ```
/// use release_date_engine::calculation::DayType;
///
/// let day_type = DayType::Weekend;
/// assert_eq!(day_type.to_string(), "Weekend");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday, not a bank holiday.
    WorkingDay,
    /// Saturday or Sunday.
    Weekend,
    /// A weekday listed in the bank holiday calendar.
    BankHoliday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::WorkingDay => write!(f, "WorkingDay"),
            DayType::Weekend => write!(f, "Weekend"),
            DayType::BankHoliday => write!(f, "BankHoliday"),
        }
    }
}

/// A date moved to a working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustedDay {
    /// The date before adjustment.
    pub original: NaiveDate,
    /// The working day reached.
    pub date: NaiveDate,
    /// Why the original date was not a working day, if it was moved.
    pub reason: Option<DayType>,
}

impl AdjustedDay {
    /// Returns true when the date had to move.
    pub fn was_adjusted(&self) -> bool {
        self.date != self.original
    }
}

/// Answers working day questions against a bank holiday calendar.
///
/// Built once per engine from the configured calendar; cheap to share.
///
/// # Example
///
/// ```
/// use release_date_engine::calculation::WorkingDayService;
/// use chrono::NaiveDate;
/// use std::collections::BTreeSet;
///
/// let christmas = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
/// let boxing_day = NaiveDate::from_ymd_opt(2025, 12, 26).unwrap();
/// let service = WorkingDayService::new(BTreeSet::from([christmas, boxing_day]));
///
/// // Saturday 27 December 2025 walks back past the two bank holidays.
/// let saturday = NaiveDate::from_ymd_opt(2025, 12, 27).unwrap();
/// let adjusted = service.previous_working_day(saturday).unwrap();
/// assert_eq!(adjusted.date, NaiveDate::from_ymd_opt(2025, 12, 24).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkingDayService {
    bank_holidays: BTreeSet<NaiveDate>,
}

impl WorkingDayService {
    /// Creates a service over a set of bank holidays.
    pub fn new(bank_holidays: BTreeSet<NaiveDate>) -> Self {
        Self { bank_holidays }
    }

    /// Creates a service from the configured calendar.
    pub fn from_calendar(calendar: &BankHolidayCalendar) -> Self {
        Self::new(calendar.dates.clone())
    }

    /// Determines the day type for a date.
    pub fn day_type(&self, date: NaiveDate) -> DayType {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ if self.bank_holidays.contains(&date) => DayType::BankHoliday,
            _ => DayType::WorkingDay,
        }
    }

    /// Returns true for a weekday that is not a bank holiday.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.day_type(date) == DayType::WorkingDay
    }

    /// Moves a date back to the nearest working day on or before it.
    pub fn previous_working_day(&self, date: NaiveDate) -> EngineResult<AdjustedDay> {
        self.walk(date, |d| d.checked_sub_days(Days::new(1)))
    }

    fn walk(
        &self,
        original: NaiveDate,
        step: impl Fn(NaiveDate) -> Option<NaiveDate>,
    ) -> EngineResult<AdjustedDay> {
        let reason = match self.day_type(original) {
            DayType::WorkingDay => None,
            other => Some(other),
        };

        let mut date = original;
        while !self.is_working_day(date) {
            date = step(date).ok_or_else(|| {
                EngineError::invariant(format!("no working day reachable from {original}"))
            })?;
        }

        Ok(AdjustedDay {
            original,
            date,
            reason,
        })
    }
}
