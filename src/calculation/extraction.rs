//! Booking-level extraction.
//!
//! Reduces the per-unit calculations of one pass to a single set of booking
//! dates. Units are visited in timeline order; when two units give the same
//! date the first one's breakdown is kept.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationResult, CalculationRule, Duration, ReleaseDateCalculationBreakdown,
    ReleaseDateType, SentenceCalculation, plus_days,
};

use super::hdced::HdcedVariant;

/// Extracts the booking dates from per-unit calculations.
///
/// # Errors
///
/// Returns `InvariantViolation` when there are no calculations or a unit has
/// no expiry date.
pub fn extract(calculations: &[SentenceCalculation]) -> EngineResult<CalculationResult> {
    let earliest = calculations
        .iter()
        .map(|calculation| calculation.sentenced_at)
        .min()
        .ok_or_else(|| EngineError::invariant("no sentence calculations to extract"))?;

    let mut result = CalculationResult::default();

    let expiry = latest(calculations, &[ReleaseDateType::Sled, ReleaseDateType::Sed])
        .ok_or_else(|| EngineError::invariant("no unit has an expiry date"))?;
    let licence_expiry = latest(calculations, &[ReleaseDateType::Sled, ReleaseDateType::Led]);
    match licence_expiry {
        Some(licence) if licence.release_date == expiry.release_date => {
            result.record(ReleaseDateType::Sled, expiry.clone());
        }
        Some(licence) => {
            result.record(ReleaseDateType::Sed, expiry.clone());
            result.record(ReleaseDateType::Led, licence.clone());
        }
        None => result.record(ReleaseDateType::Sed, expiry.clone()),
    }
    let booking_expiry = expiry.release_date;

    let crd = latest(calculations, &[ReleaseDateType::Crd]);
    let ard = latest(calculations, &[ReleaseDateType::Ard]);
    let release = match (crd, ard) {
        (Some(crd), Some(ard)) if ard.release_date > crd.release_date => {
            Some((ReleaseDateType::Ard, ard))
        }
        (Some(crd), _) => Some((ReleaseDateType::Crd, crd)),
        (None, Some(ard)) => Some((ReleaseDateType::Ard, ard)),
        (None, None) => None,
    };
    if let Some((date_type, breakdown)) = release {
        result.record(date_type, breakdown.clone());
    }
    let booking_release = release.map(|(_, breakdown)| breakdown.release_date);

    if let Some(ped) = latest(calculations, &[ReleaseDateType::Ped]) {
        let ped = raise_to_concurrent_release(
            calculations,
            ReleaseDateType::Ped,
            ped,
            CalculationRule::PedAdjustedToConcurrentConditionalRelease,
        );
        result.record(ReleaseDateType::Ped, ped);
    }

    for variant in [HdcedVariant::Hdced, HdcedVariant::FourPlus] {
        let date_type = variant.date_type();
        let Some(hdced) = latest(calculations, &[date_type]) else {
            continue;
        };
        let hdced = raise_to_concurrent_release(
            calculations,
            date_type,
            hdced,
            variant.concurrent_release_rule(),
        );
        if before(hdced.release_date, booking_release) {
            result.record(date_type, hdced);
        } else {
            debug!(date_type = %date_type, date = %hdced.release_date, "Dropped eligibility date on or after release");
        }
    }

    if let Some(ersed) = latest(calculations, &[ReleaseDateType::Ersed])
        && before(ersed.release_date, booking_release)
    {
        result.record(ReleaseDateType::Ersed, ersed.clone());
    }

    if let Some(tused) = latest(calculations, &[ReleaseDateType::Tused])
        && tused.release_date > booking_expiry
    {
        result.record(ReleaseDateType::Tused, tused.clone());
    }

    if let Some(prrd) = latest(calculations, &[ReleaseDateType::Prrd]) {
        result.record(ReleaseDateType::Prrd, prrd.clone());
    }

    let esed = calculations
        .iter()
        .filter_map(SentenceCalculation::unadjusted_expiry_date)
        .max()
        .ok_or_else(|| EngineError::invariant("no unit has an unadjusted expiry date"))?;
    result.other_dates.insert(ReleaseDateType::Esed, esed);
    result.effective_sentence_length = Duration::between(earliest, plus_days(esed, 1)?);

    Ok(result)
}

/// The breakdown with the latest date among `types`, taking the first of
/// `types` each unit has. Ties keep the earlier unit.
fn latest<'a>(
    calculations: &'a [SentenceCalculation],
    types: &[ReleaseDateType],
) -> Option<&'a ReleaseDateCalculationBreakdown> {
    let mut latest: Option<&ReleaseDateCalculationBreakdown> = None;
    for calculation in calculations {
        let Some(breakdown) = types
            .iter()
            .find_map(|date_type| calculation.breakdown_by_release_date_type.get(date_type))
        else {
            continue;
        };
        if latest.is_none_or(|current| breakdown.release_date > current.release_date) {
            latest = Some(breakdown);
        }
    }
    latest
}

/// Raises a date to the latest release date of any unit without that date type.
fn raise_to_concurrent_release(
    calculations: &[SentenceCalculation],
    date_type: ReleaseDateType,
    breakdown: &ReleaseDateCalculationBreakdown,
    rule: CalculationRule,
) -> ReleaseDateCalculationBreakdown {
    let concurrent_release = calculations
        .iter()
        .filter(|calculation| calculation.date(date_type).is_none())
        .filter_map(SentenceCalculation::release_date)
        .max();

    match concurrent_release {
        Some(release) if release > breakdown.release_date => raise(breakdown, release, rule),
        _ => breakdown.clone(),
    }
}

/// A copy of `original` moved to `to`, keeping its unadjusted date and rules.
pub(crate) fn raise(
    original: &ReleaseDateCalculationBreakdown,
    to: NaiveDate,
    rule: CalculationRule,
) -> ReleaseDateCalculationBreakdown {
    let mut raised = ReleaseDateCalculationBreakdown::new(to, original.unadjusted_date);
    raised.rules = original.rules.clone();
    raised.rule_adjustments = original.rule_adjustments.clone();
    raised.add_rule_with_adjustment(rule, (to - original.release_date).num_days());
    raised
}

fn before(date: NaiveDate, release: Option<NaiveDate>) -> bool {
    release.is_none_or(|release| date < release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppliedAdjustments;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calculation(sentenced_at: NaiveDate, dates: &[(ReleaseDateType, NaiveDate)]) -> SentenceCalculation {
        let mut calculation = SentenceCalculation {
            identifier: Uuid::new_v4(),
            sentenced_at,
            number_of_days_to_sentence_expiry: 0,
            number_of_days_to_determinate_release: 0,
            number_of_days_to_parole_eligibility: None,
            extra_days_for_sds_consecutive_to_botus: 0,
            adjustments: AppliedAdjustments::default(),
            adjusted_days_to_sentence_expiry: 0,
            adjusted_days_to_determinate_release: 0,
            has_licence: true,
            dates: BTreeMap::new(),
            breakdown_by_release_date_type: BTreeMap::new(),
        };
        for (date_type, date) in dates {
            calculation.record(*date_type, ReleaseDateCalculationBreakdown::new(*date, *date));
        }
        calculation
    }

    // ==========================================================================
    // EX-001: Latest dates across concurrent units
    // ==========================================================================
    #[test]
    fn test_ex_001_latest_expiry_and_release() {
        let first = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2021, 1, 1)),
                (ReleaseDateType::Crd, date(2020, 7, 1)),
            ],
        );
        let second = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2022, 1, 1)),
                (ReleaseDateType::Crd, date(2020, 6, 1)),
            ],
        );

        let result = extract(&[first, second]).unwrap();
        assert_eq!(result.date(ReleaseDateType::Sled), Some(date(2022, 1, 1)));
        assert_eq!(result.date(ReleaseDateType::Crd), Some(date(2020, 7, 1)));
        assert_eq!(result.other_dates[&ReleaseDateType::Esed], date(2022, 1, 1));
    }

    #[test]
    fn test_ex_002_ties_keep_first_unit() {
        let mut first = calculation(date(2020, 1, 1), &[(ReleaseDateType::Sled, date(2021, 1, 1))]);
        first.record(
            ReleaseDateType::Crd,
            ReleaseDateCalculationBreakdown::new(date(2020, 7, 1), date(2020, 7, 11)),
        );
        let second = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2021, 1, 1)),
                (ReleaseDateType::Crd, date(2020, 7, 1)),
            ],
        );

        let result = extract(&[first, second]).unwrap();
        assert_eq!(
            result.breakdown(ReleaseDateType::Crd).unwrap().unadjusted_date,
            date(2020, 7, 11)
        );
    }

    // ==========================================================================
    // EX-003: SED and LED split when they differ
    // ==========================================================================
    #[test]
    fn test_ex_003_separate_sed_and_led() {
        let no_licence = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sed, date(2021, 6, 1)),
                (ReleaseDateType::Ard, date(2020, 9, 1)),
            ],
        );
        let licence = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2021, 3, 1)),
                (ReleaseDateType::Crd, date(2020, 8, 1)),
            ],
        );

        let result = extract(&[no_licence, licence]).unwrap();
        assert_eq!(result.date(ReleaseDateType::Sed), Some(date(2021, 6, 1)));
        assert_eq!(result.date(ReleaseDateType::Led), Some(date(2021, 3, 1)));
        assert!(result.date(ReleaseDateType::Sled).is_none());
        // The later release type is kept.
        assert_eq!(result.date(ReleaseDateType::Ard), Some(date(2020, 9, 1)));
        assert!(result.date(ReleaseDateType::Crd).is_none());
    }

    // ==========================================================================
    // EX-004: Eligibility dates against concurrent release
    // ==========================================================================
    #[test]
    fn test_ex_004_hdced_raised_to_concurrent_release() {
        let eligible = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2021, 1, 1)),
                (ReleaseDateType::Crd, date(2020, 6, 1)),
                (ReleaseDateType::Hdced, date(2020, 3, 1)),
            ],
        );
        let ineligible = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2020, 10, 1)),
                (ReleaseDateType::Crd, date(2020, 5, 1)),
            ],
        );

        let result = extract(&[eligible, ineligible]).unwrap();
        assert_eq!(result.date(ReleaseDateType::Hdced), Some(date(2020, 5, 1)));
        let breakdown = result.breakdown(ReleaseDateType::Hdced).unwrap();
        assert_eq!(breakdown.unadjusted_date, date(2020, 3, 1));
        assert_eq!(
            breakdown.rules,
            vec![CalculationRule::HdcedAdjustedToConcurrentConditionalRelease]
        );
    }

    #[test]
    fn test_ex_005_hdced_dropped_on_or_after_release() {
        let eligible = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2021, 1, 1)),
                (ReleaseDateType::Crd, date(2020, 6, 1)),
                (ReleaseDateType::Hdced, date(2020, 3, 1)),
                (ReleaseDateType::Ersed, date(2020, 3, 1)),
            ],
        );
        let ineligible = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2021, 1, 1)),
                (ReleaseDateType::Crd, date(2020, 7, 1)),
            ],
        );

        let result = extract(&[eligible, ineligible]).unwrap();
        assert_eq!(result.date(ReleaseDateType::Crd), Some(date(2020, 7, 1)));
        assert!(result.date(ReleaseDateType::Hdced).is_none());
        assert_eq!(result.date(ReleaseDateType::Ersed), Some(date(2020, 3, 1)));
    }

    #[test]
    fn test_ex_006_ped_raised_to_concurrent_release() {
        let extended = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2030, 1, 1)),
                (ReleaseDateType::Crd, date(2026, 1, 1)),
                (ReleaseDateType::Ped, date(2024, 1, 1)),
            ],
        );
        let standard = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2029, 1, 1)),
                (ReleaseDateType::Crd, date(2024, 7, 1)),
            ],
        );

        let result = extract(&[extended, standard]).unwrap();
        assert_eq!(result.date(ReleaseDateType::Ped), Some(date(2024, 7, 1)));
        assert_eq!(
            result.breakdown(ReleaseDateType::Ped).unwrap().rule_adjustments
                [&CalculationRule::PedAdjustedToConcurrentConditionalRelease],
            182
        );
    }

    #[test]
    fn test_ex_007_tused_dropped_unless_after_expiry() {
        let short = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2020, 6, 1)),
                (ReleaseDateType::Crd, date(2020, 3, 1)),
                (ReleaseDateType::Tused, date(2021, 3, 1)),
            ],
        );
        let long = calculation(
            date(2020, 1, 1),
            &[
                (ReleaseDateType::Sled, date(2022, 1, 1)),
                (ReleaseDateType::Crd, date(2021, 1, 1)),
            ],
        );

        let result = extract(&[short.clone()]).unwrap();
        assert_eq!(result.date(ReleaseDateType::Tused), Some(date(2021, 3, 1)));

        let result = extract(&[short, long]).unwrap();
        assert!(result.date(ReleaseDateType::Tused).is_none());
    }

    // ==========================================================================
    // EX-008: Effective sentence length runs to ESED inclusive
    // ==========================================================================
    #[test]
    fn test_ex_008_effective_sentence_length() {
        let mut unit = calculation(date(2020, 1, 1), &[(ReleaseDateType::Crd, date(2020, 7, 1))]);
        unit.record(
            ReleaseDateType::Sled,
            ReleaseDateCalculationBreakdown::new(date(2021, 12, 1), date(2021, 12, 31)),
        );

        let result = extract(&[unit]).unwrap();
        assert_eq!(result.other_dates[&ReleaseDateType::Esed], date(2021, 12, 31));
        assert_eq!(result.effective_sentence_length, Duration::years(2));
    }

    #[test]
    fn test_extract_nothing_is_invariant_violation() {
        let result = extract(&[]);
        assert!(matches!(result, Err(EngineError::InvariantViolation { .. })));
    }
}
