//! SDS early release tranche allocation.

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::models::{
    CalculationResult, Duration, ReleaseDateType, SdsEarlyReleaseTranche, Sentence,
    SentenceIdentificationTrack,
};

use super::aggregation::aggregate;

/// Allocates the booking to an early release tranche.
///
/// `early_units` are the units of the early-assumption pass and `standard` is
/// the result of the standard pass. A booking with no early release
/// component, or one whose standard release date falls before the first
/// tranche commenced, is `Tranche0`. Otherwise it is `Tranche2` when any unit
/// with an early release component reaches the configured threshold length,
/// and `Tranche1` when every such unit is shorter.
///
/// # Example
///
/// ```no_run
/// use release_date_engine::calculation::allocate_tranche;
/// use release_date_engine::config::ConfigLoader;
/// use release_date_engine::models::SdsEarlyReleaseTranche;
///
/// let loader = ConfigLoader::load("./config/england_and_wales")?;
/// let tranche = allocate_tranche(&[], &Default::default(), loader.config())?;
/// assert_eq!(tranche, SdsEarlyReleaseTranche::Tranche0);
/// # Ok::<(), release_date_engine::error::EngineError>(())
/// ```
pub fn allocate_tranche(
    early_units: &[Sentence],
    standard: &CalculationResult,
    config: &EngineConfig,
) -> EngineResult<SdsEarlyReleaseTranche> {
    let early_release = config.early_release();
    let released_before_scheme = [ReleaseDateType::Crd, ReleaseDateType::Ard]
        .into_iter()
        .find_map(|date_type| standard.date(date_type))
        .is_some_and(|release| release < early_release.tranche_one_commencement_date);
    if released_before_scheme {
        debug!("Standard release precedes the early release scheme");
        return Ok(SdsEarlyReleaseTranche::Tranche0);
    }
    let threshold_years = early_release.tranche_two_threshold_years;

    let mut tranche = SdsEarlyReleaseTranche::Tranche0;
    for unit in early_units {
        if !unit
            .component_tracks()
            .contains(&SentenceIdentificationTrack::SdsEarlyRelease)
        {
            continue;
        }
        let aggregate = aggregate(unit)?;
        let threshold = Duration::years(threshold_years).length_in_days(aggregate.sentenced_at)?;
        if aggregate.total_days >= threshold {
            tranche = SdsEarlyReleaseTranche::Tranche2;
            break;
        }
        tranche = SdsEarlyReleaseTranche::Tranche1;
    }

    debug!(tranche = %tranche, units = early_units.len(), "Allocated early release tranche");
    Ok(tranche)
}
