//! Release point multiplier lookup.
//!
//! Statutory release fractions are configured per track, never hard-coded,
//! because they change with policy tranches.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::{EngineConfig, ReleasePointConfiguration};
use crate::error::{EngineError, EngineResult};
use crate::models::SentenceIdentificationTrack;

/// Looks up configured release fractions by track.
///
/// # Example
///
/// ```no_run
/// use release_date_engine::calculation::ReleasePointMultiplierLookup;
/// use release_date_engine::config::ConfigLoader;
/// use release_date_engine::models::SentenceIdentificationTrack;
///
/// let loader = ConfigLoader::load("./config/england_and_wales")?;
/// let lookup = ReleasePointMultiplierLookup::new(loader.config());
/// let multiplier = lookup.multiplier_for(SentenceIdentificationTrack::SdsStandardRelease)?;
/// assert_eq!(multiplier.to_string(), "0.5");
/// # Ok::<(), release_date_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReleasePointMultiplierLookup<'a> {
    config: &'a ReleasePointConfiguration,
}

impl<'a> ReleasePointMultiplierLookup<'a> {
    /// Creates a lookup over the engine configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config: config.release_points(),
        }
    }

    /// The fraction of the sentence served before the determinate release point.
    ///
    /// # Errors
    ///
    /// Returns `MultiplierNotConfigured` when the track has no multiplier.
    pub fn multiplier_for(&self, track: SentenceIdentificationTrack) -> EngineResult<Decimal> {
        self.config
            .multipliers
            .get(&track)
            .copied()
            .ok_or(EngineError::MultiplierNotConfigured { track })
    }

    /// The fraction of the custodial term served before parole eligibility, for
    /// tracks with discretionary release.
    pub fn parole_eligibility_multiplier_for(
        &self,
        track: SentenceIdentificationTrack,
    ) -> Option<Decimal> {
        self.config.parole_eligibility_multipliers.get(&track).copied()
    }
}

/// Rounds a fractional day count up to whole days.
///
/// Partial days are due to the offender, so the count is always rounded up:
/// never floor, never banker's rounding.
pub fn ceil_days(days: Decimal) -> EngineResult<i64> {
    days.ceil()
        .to_i64()
        .ok_or_else(|| EngineError::invariant(format!("{days} days does not fit in a day count")))
}

/// Days served before the fraction `multiplier` of `days` is reached.
pub fn days_at_fraction(days: i64, multiplier: Decimal) -> EngineResult<i64> {
    ceil_days(Decimal::from(days) * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn config() -> EngineConfig {
        ConfigLoader::load("config/england_and_wales")
            .unwrap()
            .config()
            .clone()
    }

    // ==========================================================================
    // RP-001: Multipliers come from configuration
    // ==========================================================================
    #[test]
    fn test_rp_001_multiplier_for_each_sds_track() {
        let config = config();
        let lookup = ReleasePointMultiplierLookup::new(&config);

        assert_eq!(
            lookup
                .multiplier_for(SentenceIdentificationTrack::SdsStandardRelease)
                .unwrap(),
            dec("0.5")
        );
        assert_eq!(
            lookup
                .multiplier_for(SentenceIdentificationTrack::SdsEarlyRelease)
                .unwrap(),
            dec("0.4")
        );
        assert_eq!(
            lookup
                .multiplier_for(SentenceIdentificationTrack::SdsPlusRelease)
                .unwrap(),
            dec("0.66666")
        );
    }

    // ==========================================================================
    // RP-002: Parole eligibility fraction only for discretionary release
    // ==========================================================================
    #[test]
    fn test_rp_002_parole_eligibility_multiplier() {
        let config = config();
        let lookup = ReleasePointMultiplierLookup::new(&config);

        assert_eq!(
            lookup.parole_eligibility_multiplier_for(
                SentenceIdentificationTrack::EdsDiscretionaryRelease
            ),
            Some(dec("0.66666"))
        );
        assert_eq!(
            lookup.parole_eligibility_multiplier_for(SentenceIdentificationTrack::SdsStandardRelease),
            None
        );
    }

    // ==========================================================================
    // RP-003: Rounding is always up
    // ==========================================================================
    #[test]
    fn test_rp_003_days_at_fraction_rounds_up() {
        assert_eq!(days_at_fraction(140, dec("0.5")).unwrap(), 70);
        assert_eq!(days_at_fraction(141, dec("0.5")).unwrap(), 71);
        assert_eq!(days_at_fraction(3, dec("0.66666")).unwrap(), 2);
        assert_eq!(days_at_fraction(10, dec("0.4")).unwrap(), 4);
        assert_eq!(days_at_fraction(11, dec("0.4")).unwrap(), 5);
    }

    #[test]
    fn test_ceil_days_of_whole_number_is_unchanged() {
        assert_eq!(ceil_days(dec("361")).unwrap(), 361);
        assert_eq!(ceil_days(dec("360.00001")).unwrap(), 361);
    }
}
