//! Calendar-anchored durations.
//!
//! A [`Duration`] is a bag of calendar units, not a day count. Its length in
//! days only exists relative to an anchor date because months and years vary
//! in length, so every conversion walks the calendar from the anchor.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar unit that a [`Duration`] can be expressed in.
///
/// The declaration order is the order units are applied in when a duration
/// is anchored: years, then months, then weeks, then days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    /// Calendar years.
    Years,
    /// Calendar months.
    Months,
    /// Weeks of seven days.
    Weeks,
    /// Days.
    Days,
}

/// A mapping from calendar unit to a non-negative count.
///
/// # Example
///
/// ```
/// use release_date_engine::models::Duration;
/// use chrono::NaiveDate;
///
/// let one_month = Duration::months(1);
/// let anchor = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
///
/// // 15 March to 15 April is 31 days; 15 February 2024 to 15 March is 29.
/// assert_eq!(one_month.length_in_days(anchor).unwrap(), 31);
/// let february = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
/// assert_eq!(one_month.length_in_days(february).unwrap(), 29);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration {
    units: BTreeMap<DurationUnit, u32>,
}

impl Duration {
    /// Creates an empty (zero-length) duration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this duration with `count` of `unit` added.
    pub fn with(mut self, unit: DurationUnit, count: u32) -> Self {
        if count > 0 {
            *self.units.entry(unit).or_insert(0) += count;
        }
        self
    }

    /// A duration of `count` days.
    pub fn days(count: u32) -> Self {
        Self::new().with(DurationUnit::Days, count)
    }

    /// A duration of `count` weeks.
    pub fn weeks(count: u32) -> Self {
        Self::new().with(DurationUnit::Weeks, count)
    }

    /// A duration of `count` months.
    pub fn months(count: u32) -> Self {
        Self::new().with(DurationUnit::Months, count)
    }

    /// A duration of `count` years.
    pub fn years(count: u32) -> Self {
        Self::new().with(DurationUnit::Years, count)
    }

    /// Returns the count held for `unit` (zero when absent).
    pub fn get(&self, unit: DurationUnit) -> u32 {
        self.units.get(&unit).copied().unwrap_or(0)
    }

    /// Returns true when every unit count is zero.
    pub fn is_zero(&self) -> bool {
        self.units.values().all(|count| *count == 0)
    }

    /// Returns the date reached by advancing `anchor` by this duration.
    ///
    /// Units are applied years first, then months, weeks and days. Month
    /// arithmetic clamps to the end of the month, so 31 January plus one
    /// month is the last day of February.
    pub fn end_date(&self, anchor: NaiveDate) -> EngineResult<NaiveDate> {
        let overflow = || EngineError::invariant(format!("duration {self} overflows from {anchor}"));

        let mut date = anchor;
        let years = self.get(DurationUnit::Years);
        if years > 0 {
            let months = years.checked_mul(12).ok_or_else(overflow)?;
            date = date
                .checked_add_months(Months::new(months))
                .ok_or_else(overflow)?;
        }
        let months = self.get(DurationUnit::Months);
        if months > 0 {
            date = date
                .checked_add_months(Months::new(months))
                .ok_or_else(overflow)?;
        }
        let weeks = self.get(DurationUnit::Weeks);
        if weeks > 0 {
            date = date
                .checked_add_days(Days::new(u64::from(weeks) * 7))
                .ok_or_else(overflow)?;
        }
        let days = self.get(DurationUnit::Days);
        if days > 0 {
            date = date
                .checked_add_days(Days::new(u64::from(days)))
                .ok_or_else(overflow)?;
        }
        Ok(date)
    }

    /// Returns the number of days this duration spans when anchored at `anchor`.
    pub fn length_in_days(&self, anchor: NaiveDate) -> EngineResult<i64> {
        Ok((self.end_date(anchor)? - anchor).num_days())
    }

    /// Returns the years/months/days period from `start` up to (not including) `end`.
    ///
    /// An `end` on or before `start` gives a zero duration.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        if end <= start {
            return Self::new();
        }

        let mut whole_months = (end.year() - start.year()) * 12 + end.month() as i32
            - start.month() as i32;
        let overshoots = |months: i32| {
            start
                .checked_add_months(Months::new(months.max(0) as u32))
                .is_none_or(|date| date > end)
        };
        while whole_months > 0 && overshoots(whole_months) {
            whole_months -= 1;
        }
        let whole_months = whole_months.max(0) as u32;
        let month_anchor = start
            .checked_add_months(Months::new(whole_months))
            .unwrap_or(start);
        let days = (end - month_anchor).num_days().max(0) as u32;

        Self::new()
            .with(DurationUnit::Years, whole_months / 12)
            .with(DurationUnit::Months, whole_months % 12)
            .with(DurationUnit::Days, days)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0 days");
        }
        let parts: Vec<String> = self
            .units
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(unit, count)| {
                let name = match unit {
                    DurationUnit::Years => "years",
                    DurationUnit::Months => "months",
                    DurationUnit::Weeks => "weeks",
                    DurationUnit::Days => "days",
                };
                format!("{count} {name}")
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Adds a signed number of days to a date.
pub(crate) fn plus_days(date: NaiveDate, days: i64) -> EngineResult<NaiveDate> {
    let result = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    result.ok_or_else(|| EngineError::invariant(format!("adding {days} days to {date} overflows")))
}

/// Returns the last day of a `days`-long period starting on `start`.
///
/// Day one is `start` itself. Counts of zero or less clamp to `start`.
pub(crate) fn inclusive_end_date(start: NaiveDate, days: i64) -> EngineResult<NaiveDate> {
    plus_days(start, (days - 1).max(0))
}
