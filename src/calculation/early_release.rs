//! Merge of the standard and early release passes.

use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{
    CalculationResult, CalculationRule, ReleaseDateCalculationBreakdown, ReleaseDateType,
    SdsEarlyReleaseTranche,
};

/// Combines the results of both passes under the allocated tranche.
///
/// `Tranche0` returns the standard result. Otherwise each early release
/// sensitive date type takes the early value if it falls on or after the
/// tranche commencement date, else the standard value if that does, else the
/// commencement date itself. A type present in only one pass is held to the
/// same floor. Every other field comes from the standard pass.
pub fn merge(
    standard: &CalculationResult,
    early: &CalculationResult,
    tranche: SdsEarlyReleaseTranche,
    config: &EngineConfig,
) -> CalculationResult {
    let mut merged = standard.clone();
    merged.sds_early_release_tranche = tranche;

    let Some(commencement) = config.early_release().commencement_for(tranche) else {
        return merged;
    };

    for date_type in ReleaseDateType::EARLY_RELEASE_SENSITIVE {
        let early_breakdown = early.breakdown(date_type);
        if let Some(breakdown) = early_breakdown
            && breakdown.release_date >= commencement
        {
            merged.record(date_type, breakdown.clone());
            continue;
        }
        let standard_date = standard.date(date_type);
        if standard_date.is_some_and(|date| date >= commencement) {
            continue;
        }

        let Some(held) = early_breakdown
            .map(|breakdown| breakdown.release_date)
            .or(standard_date)
        else {
            continue;
        };
        debug!(
            date_type = %date_type,
            held = %held,
            commencement = %commencement,
            "Held early release date to tranche commencement"
        );
        merged.record(
            date_type,
            ReleaseDateCalculationBreakdown::new(commencement, held)
                .with_rule(CalculationRule::SdsEarlyReleaseAdjustedToTrancheCommencement),
        );
    }
    merged
}
