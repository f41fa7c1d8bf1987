//! Per-unit sentence calculation.
//!
//! Produces the [`SentenceCalculation`] for one calculation unit: the
//! unadjusted day counts, the adjusted counts, and the expiry and release
//! point dates. The specialised eligibility calculators then add their dates
//! to the same value.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AppliedAdjustments, CalculationRule, Duration, ReleaseDateCalculationBreakdown,
    ReleaseDateType, Sentence, SentenceCalculation, SentenceIdentificationTrack,
    inclusive_end_date,
};

use super::aggregation::aggregate;
use super::release_point::{ReleasePointMultiplierLookup, ceil_days, days_at_fraction};

/// Calculates the expiry and release point dates for a classified unit.
///
/// Dates use inclusive counting: day one is the sentencing date, so a count of
/// `n` days ends on `sentenced_at + (n - 1)`. A count that adjustments bring to
/// zero or below means immediate release on the sentencing date.
///
/// # Arguments
///
/// * `unit` - A standalone sentence or consecutive chain, already classified
/// * `adjustments` - The adjustment totals applying to the unit
/// * `recall_anchor` - The return to custody date, for recalled units
/// * `config` - The engine configuration
///
/// # Errors
///
/// - `UnsupportedCalculation` for a fixed-term recall without a return to custody date
/// - `MultiplierNotConfigured` when a component's track has no multiplier
/// - `InvariantViolation` for an unclassified unit or date overflow
pub fn calculate_sentence(
    unit: &Sentence,
    adjustments: AppliedAdjustments,
    recall_anchor: Option<NaiveDate>,
    config: &EngineConfig,
) -> EngineResult<SentenceCalculation> {
    let track = unit
        .identification_track()
        .ok_or_else(|| EngineError::invariant("sentence calculated before classification"))?;
    let aggregate = aggregate(unit)?;
    let sentenced_at = aggregate.sentenced_at;
    let lookup = ReleasePointMultiplierLookup::new(config);

    let days_to_expiry = aggregate.total_days;
    let days_to_release = if track == SentenceIdentificationTrack::Recall {
        days_to_expiry
    } else {
        let mut served = Decimal::ZERO;
        for part in &aggregate.parts {
            let part_track = part
                .track
                .ok_or_else(|| EngineError::invariant("chain component calculated before classification"))?;
            served += Decimal::from(part.custodial_days) * lookup.multiplier_for(part_track)?;
        }
        ceil_days(served)?
    };
    let days_to_parole_eligibility = match lookup.parole_eligibility_multiplier_for(track) {
        Some(multiplier) => {
            let custodial_days = aggregate.parts.iter().map(|part| part.custodial_days).sum();
            Some(days_at_fraction(custodial_days, multiplier)?)
        }
        None => None,
    };

    let has_licence = match track {
        SentenceIdentificationTrack::Botus => false,
        SentenceIdentificationTrack::Recall
        | SentenceIdentificationTrack::EdsAutomaticRelease
        | SentenceIdentificationTrack::EdsDiscretionaryRelease => true,
        SentenceIdentificationTrack::SdsStandardRelease
        | SentenceIdentificationTrack::SdsEarlyRelease
        | SentenceIdentificationTrack::SdsPlusRelease => {
            let threshold = Duration::months(config.release_points().licence_threshold_months)
                .length_in_days(sentenced_at)?;
            let ora = config.commencement_dates().ora;
            days_to_expiry >= threshold
                || unit
                    .offences()
                    .iter()
                    .any(|offence| offence.committed_at >= ora)
        }
    };

    let mut calculation = SentenceCalculation {
        identifier: unit
            .identifier()
            .ok_or_else(|| EngineError::invariant("sentence has no identifier"))?,
        sentenced_at,
        number_of_days_to_sentence_expiry: days_to_expiry,
        number_of_days_to_determinate_release: days_to_release,
        number_of_days_to_parole_eligibility: days_to_parole_eligibility,
        extra_days_for_sds_consecutive_to_botus: aggregate.botus_days_before_sds(),
        adjustments,
        adjusted_days_to_sentence_expiry: days_to_expiry + adjustments.custody_days(),
        adjusted_days_to_determinate_release: days_to_release + adjustments.release_days(),
        has_licence,
        dates: BTreeMap::new(),
        breakdown_by_release_date_type: BTreeMap::new(),
    };

    let (expiry_type, release_type) = if has_licence {
        (ReleaseDateType::Sled, ReleaseDateType::Crd)
    } else {
        (ReleaseDateType::Sed, ReleaseDateType::Ard)
    };
    calculation.record(
        expiry_type,
        inclusive_breakdown(
            sentenced_at,
            days_to_expiry,
            calculation.adjusted_days_to_sentence_expiry,
        )?,
    );

    if track == SentenceIdentificationTrack::Recall {
        let prrd = post_recall_release(unit, &calculation, recall_anchor)?;
        calculation.record(ReleaseDateType::Prrd, prrd);
    } else {
        calculation.record(
            release_type,
            inclusive_breakdown(
                sentenced_at,
                days_to_release,
                calculation.adjusted_days_to_determinate_release,
            )?,
        );
        if let Some(ped_days) = days_to_parole_eligibility {
            calculation.record(
                ReleaseDateType::Ped,
                inclusive_breakdown(sentenced_at, ped_days, ped_days + adjustments.release_days())?,
            );
        }
    }

    debug!(
        identifier = %calculation.identifier,
        track = %track,
        days_to_expiry,
        days_to_release,
        has_licence,
        "Calculated sentence"
    );
    Ok(calculation)
}

/// Builds the breakdown for an inclusively counted date.
///
/// Adjusted counts at or below zero clamp to the start date with the
/// immediate release rule.
pub(crate) fn inclusive_breakdown(
    start: NaiveDate,
    unadjusted_days: i64,
    adjusted_days: i64,
) -> EngineResult<ReleaseDateCalculationBreakdown> {
    let unadjusted = inclusive_end_date(start, unadjusted_days)?;
    let release = inclusive_end_date(start, adjusted_days)?;
    let mut breakdown = ReleaseDateCalculationBreakdown::new(release, unadjusted);
    if adjusted_days <= 0 {
        breakdown.add_rule(CalculationRule::ImmediateRelease);
    }
    Ok(breakdown)
}

fn post_recall_release(
    unit: &Sentence,
    calculation: &SentenceCalculation,
    recall_anchor: Option<NaiveDate>,
) -> EngineResult<ReleaseDateCalculationBreakdown> {
    let licence_expiry = calculation
        .licence_expiry_date()
        .ok_or_else(|| EngineError::invariant("recall calculated without licence expiry"))?;

    let Some(fixed_term_days) = unit.recall_type().fixed_term_days() else {
        return Ok(ReleaseDateCalculationBreakdown::new(licence_expiry, licence_expiry));
    };

    let returned = recall_anchor.ok_or_else(|| {
        EngineError::unsupported("fixed-term recall without a return to custody date")
    })?;
    let release = inclusive_end_date(returned, fixed_term_days)?;
    if release > licence_expiry {
        let mut breakdown = ReleaseDateCalculationBreakdown::new(licence_expiry, release)
            .with_rule(CalculationRule::FixedTermRecall);
        breakdown.add_rule_with_adjustment(
            CalculationRule::PrrdCappedAtLicenceExpiry,
            (licence_expiry - release).num_days(),
        );
        Ok(breakdown)
    } else {
        Ok(ReleaseDateCalculationBreakdown::new(release, release)
            .with_rule(CalculationRule::FixedTermRecall))
    }
}
