//! Adjustment totals for a calculation unit.

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentEffect, Adjustments, AppliedAdjustments, Sentence};

/// Totals the booking's adjustments that apply to a unit.
///
/// An entry applies when the unit's sentencing date falls in its range and,
/// if it names a sentence, that sentence is one of the unit's components.
/// Additional days awarded are netted against restorations and never go
/// below zero. Informational entries are ignored.
///
/// # Example
///
/// ```
/// use release_date_engine::calculation::applied_adjustments;
/// use release_date_engine::models::{AdjustmentEntry, AdjustmentType, Adjustments, Sentence};
///
/// let sentence: Sentence = serde_json::from_str(r#"{
///     "type": "standard", "identifier": "00000000-0000-0000-0000-000000000001",
///     "case_sequence": 1, "line_sequence": 1, "sentenced_at": "2020-01-01",
///     "offence": { "committed_at": "2019-12-01", "offence_code": "TH68010" },
///     "duration": { "days": 140 }
/// }"#).unwrap();
/// let adjustments = Adjustments::new()
///     .with(AdjustmentType::Remand, AdjustmentEntry::days(25))
///     .with(AdjustmentType::UnusedDeductions, AdjustmentEntry::days(10));
///
/// let applied = applied_adjustments(&adjustments, &sentence).unwrap();
/// assert_eq!(applied.deducted_days, 25);
/// assert_eq!(applied.release_days(), -25);
/// ```
pub fn applied_adjustments(
    adjustments: &Adjustments,
    unit: &Sentence,
) -> EngineResult<AppliedAdjustments> {
    let sentenced_at = unit
        .sentenced_at()
        .ok_or_else(|| EngineError::invariant("sentence has no sentencing date"))?;
    let sequences = unit.sequences();

    let mut applied = AppliedAdjustments::default();
    let mut awarded = 0;
    let mut restored = 0;
    for (adjustment_type, _) in adjustments.iter() {
        let days = adjustments.total_days(*adjustment_type, sentenced_at, &sequences);
        match adjustment_type.effect() {
            AdjustmentEffect::Deduction => applied.deducted_days += days,
            AdjustmentEffect::SentenceExtension => applied.sentence_extension_days += days,
            AdjustmentEffect::ReleaseExtension => awarded += days,
            AdjustmentEffect::ReleaseRestoration => restored += days,
            AdjustmentEffect::Informational => {}
        }
    }
    applied.release_extension_days = (awarded - restored).max(0);

    debug!(
        identifier = ?unit.identifier(),
        deducted = applied.deducted_days,
        sentence_extension = applied.sentence_extension_days,
        release_extension = applied.release_extension_days,
        "Applied adjustments"
    );
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AdjustmentEntry, AdjustmentType, ConsecutiveSentence, Duration, EarlyReleaseExclusion,
        Offence, OffenceIndicators, RecallType, SentenceDetails, StandardSentence,
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard(line: u32) -> Sentence {
        in_case(1, line)
    }

    fn in_case(case: u32, line: u32) -> Sentence {
        Sentence::Standard(StandardSentence {
            details: SentenceDetails {
                identifier: Uuid::new_v4(),
                case_sequence: case,
                line_sequence: line,
                sentenced_at: date(2020, 1, 1),
                offence: Offence {
                    committed_at: date(2019, 12, 1),
                    offence_code: "TH68010".to_string(),
                    indicators: OffenceIndicators::default(),
                },
                recall_type: RecallType::None,
                consecutive_to: None,
                identification_track: None,
            },
            duration: Duration::days(140),
            is_sds_plus: false,
            is_section_250: false,
            early_release_exclusion: EarlyReleaseExclusion::None,
        })
    }

    #[test]
    fn test_effects_are_totalled_separately() {
        let adjustments = Adjustments::new()
            .with(AdjustmentType::Remand, AdjustmentEntry::days(10))
            .with(AdjustmentType::TaggedBail, AdjustmentEntry::days(5))
            .with(AdjustmentType::UnlawfullyAtLarge, AdjustmentEntry::days(7))
            .with(AdjustmentType::AdditionalDaysAwarded, AdjustmentEntry::days(12));

        let applied = applied_adjustments(&adjustments, &standard(1)).unwrap();
        assert_eq!(applied.deducted_days, 15);
        assert_eq!(applied.sentence_extension_days, 7);
        assert_eq!(applied.release_extension_days, 12);
        assert_eq!(applied.custody_days(), -8);
        assert_eq!(applied.release_days(), 4);
    }

    #[test]
    fn test_restoration_never_makes_additional_days_negative() {
        let adjustments = Adjustments::new()
            .with(AdjustmentType::AdditionalDaysAwarded, AdjustmentEntry::days(5))
            .with(
                AdjustmentType::RestorationOfAdditionalDaysAwarded,
                AdjustmentEntry::days(8),
            );

        let applied = applied_adjustments(&adjustments, &standard(1)).unwrap();
        assert_eq!(applied.release_extension_days, 0);
    }

    #[test]
    fn test_sentence_specific_entries_follow_chain_components() {
        let adjustments = Adjustments::new()
            .with(AdjustmentType::Remand, AdjustmentEntry::days(10).for_sentence(2))
            .with(AdjustmentType::Remand, AdjustmentEntry::days(4).for_sentence(9));
        let chain = Sentence::Consecutive(ConsecutiveSentence {
            components: vec![standard(1), standard(2)],
            identification_track: None,
        });

        let applied = applied_adjustments(&adjustments, &chain).unwrap();
        assert_eq!(applied.deducted_days, 10);
    }

    #[test]
    fn test_sentence_specific_entries_match_case_and_line() {
        let adjustments = Adjustments::new()
            .with(AdjustmentType::Remand, AdjustmentEntry::days(10).for_sentence(1).in_case(1))
            .with(AdjustmentType::Remand, AdjustmentEntry::days(6).for_sentence(1).in_case(2));

        let first = applied_adjustments(&adjustments, &in_case(1, 1)).unwrap();
        let second = applied_adjustments(&adjustments, &in_case(2, 1)).unwrap();
        assert_eq!(first.deducted_days, 10);
        assert_eq!(second.deducted_days, 6);
    }

    #[test]
    fn test_unused_deductions_are_informational() {
        let adjustments =
            Adjustments::new().with(AdjustmentType::UnusedDeductions, AdjustmentEntry::days(30));

        let applied = applied_adjustments(&adjustments, &standard(1)).unwrap();
        assert_eq!(applied, AppliedAdjustments::default());
    }
}
