//! Early removal scheme eligibility.

use tracing::debug;

use crate::config::{EngineConfig, ErsedConfiguration};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationRule, Offender, ReleaseDateCalculationBreakdown, ReleaseDateType, Sentence,
    SentenceCalculation, SentenceIdentificationTrack, plus_days,
};

use super::eligibility::EligibilityCalculator;
use super::release_point::days_at_fraction;

/// Calculates the early removal scheme eligibility date.
///
/// The anchor is the parole eligibility point for discretionary extended
/// sentences and the release point otherwise. ERSED is the later of a fixed
/// period before the anchor and a minimum fraction of the anchor, where the
/// fraction in force depends on the sentencing date.
#[derive(Debug, Clone, Copy)]
pub struct ErsedCalculator<'a> {
    config: &'a ErsedConfiguration,
}

impl<'a> ErsedCalculator<'a> {
    /// Creates the calculator from the engine configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config: config.ersed(),
        }
    }
}

impl EligibilityCalculator for ErsedCalculator<'_> {
    fn date_type(&self) -> ReleaseDateType {
        ReleaseDateType::Ersed
    }

    fn applies(
        &self,
        unit: &Sentence,
        calculation: &SentenceCalculation,
        _offender: &Offender,
    ) -> EngineResult<bool> {
        Ok(!matches!(
            unit.identification_track(),
            None | Some(SentenceIdentificationTrack::Recall | SentenceIdentificationTrack::Botus)
        ) && calculation.release_date().is_some())
    }

    fn calculate(
        &self,
        _unit: &Sentence,
        calculation: &mut SentenceCalculation,
        _offender: &Offender,
        _extra_days: i64,
    ) -> EngineResult<()> {
        let sentenced_at = calculation.sentenced_at;
        let anchor_days = calculation
            .number_of_days_to_parole_eligibility
            .unwrap_or(calculation.number_of_days_to_determinate_release);
        let release_adjustment = calculation.adjustments.release_days();

        let fraction = self
            .config
            .minimum_fraction_on(sentenced_at)
            .ok_or_else(|| EngineError::InvalidConfiguration {
                message: format!("no ERSED minimum custodial fraction in force on {sentenced_at}"),
            })?;
        let minimum_days = days_at_fraction(anchor_days, fraction)?;
        let max_period = self.config.max_period_days;

        // Day counts here are inclusive, so day n falls on sentenced_at + (n - 1).
        let (date, unadjusted, rule) = if anchor_days - max_period >= minimum_days {
            (
                plus_days(sentenced_at, anchor_days + release_adjustment - 1 - max_period)?,
                plus_days(sentenced_at, anchor_days - 1 - max_period)?,
                CalculationRule::ErsedMaxPeriod,
            )
        } else {
            (
                plus_days(sentenced_at, minimum_days + release_adjustment - 1)?,
                plus_days(sentenced_at, minimum_days - 1)?,
                CalculationRule::ErsedMinEffectiveDate,
            )
        };

        let mut breakdown =
            ReleaseDateCalculationBreakdown::new(date.max(sentenced_at), unadjusted).with_rule(rule);
        if date < sentenced_at {
            breakdown.add_rule_with_adjustment(
                CalculationRule::ErsedAdjustedToSentenceDate,
                (sentenced_at - date).num_days(),
            );
        }

        debug!(
            identifier = %calculation.identifier,
            date = %breakdown.release_date,
            rule = ?rule,
            "Calculated early removal scheme eligibility"
        );
        calculation.record(ReleaseDateType::Ersed, breakdown);
        Ok(())
    }
}
