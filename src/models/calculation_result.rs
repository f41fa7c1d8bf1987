//! Booking-level calculation output.
//!
//! A [`CalculationResult`] is produced once per calculation pass. Two exist
//! transiently while the early and standard passes are merged; the merged
//! value is what callers receive.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Duration, ReleaseDateCalculationBreakdown, ReleaseDateType, SdsEarlyReleaseTranche};

/// The calculated release dates for a booking.
///
/// # Example
///
/// ```
/// use release_date_engine::models::{CalculationResult, ReleaseDateType};
///
/// let result = CalculationResult::default();
/// assert!(result.date(ReleaseDateType::Crd).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The booking's release dates by type.
    pub dates: BTreeMap<ReleaseDateType, NaiveDate>,
    /// Breakdown for each date in `dates`.
    pub breakdown_by_release_date_type: BTreeMap<ReleaseDateType, ReleaseDateCalculationBreakdown>,
    /// Dates used for cross-checks only, never primary outputs.
    pub other_dates: BTreeMap<ReleaseDateType, NaiveDate>,
    /// The overall length of the booking from first sentencing to effective end.
    pub effective_sentence_length: Duration,
    /// The early release tranche allocated to the booking.
    pub sds_early_release_tranche: SdsEarlyReleaseTranche,
}

impl CalculationResult {
    /// The date calculated for a type.
    pub fn date(&self, date_type: ReleaseDateType) -> Option<NaiveDate> {
        self.dates.get(&date_type).copied()
    }

    /// The breakdown recorded for a type.
    pub fn breakdown(&self, date_type: ReleaseDateType) -> Option<&ReleaseDateCalculationBreakdown> {
        self.breakdown_by_release_date_type.get(&date_type)
    }

    /// Records a date and its breakdown.
    pub fn record(&mut self, date_type: ReleaseDateType, breakdown: ReleaseDateCalculationBreakdown) {
        self.dates.insert(date_type, breakdown.release_date);
        self.breakdown_by_release_date_type.insert(date_type, breakdown);
    }

    /// Removes a date and its breakdown.
    pub fn remove(&mut self, date_type: ReleaseDateType) {
        self.dates.remove(&date_type);
        self.breakdown_by_release_date_type.remove(&date_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CalculationRule;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_and_remove_keep_maps_in_step() {
        let mut result = CalculationResult::default();
        result.record(
            ReleaseDateType::Hdced,
            ReleaseDateCalculationBreakdown::new(date(2020, 2, 5), date(2020, 2, 5))
                .with_rule(CalculationRule::HdcedGeMinPeriodLtMidpoint),
        );

        assert_eq!(result.date(ReleaseDateType::Hdced), Some(date(2020, 2, 5)));
        assert!(result.breakdown(ReleaseDateType::Hdced).is_some());

        result.remove(ReleaseDateType::Hdced);
        assert!(result.dates.is_empty());
        assert!(result.breakdown_by_release_date_type.is_empty());
    }

    #[test]
    fn test_serializes_with_snake_case_keys() {
        let mut result = CalculationResult::default();
        result.record(
            ReleaseDateType::Sled,
            ReleaseDateCalculationBreakdown::new(date(2020, 5, 19), date(2020, 5, 19)),
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["dates"]["sled"], "2020-05-19");
        assert_eq!(json["sds_early_release_tranche"], "tranche_0");
    }
}
