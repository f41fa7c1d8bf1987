//! Top-up supervision expiry.
//!
//! Short standard sentences for offences after the Offender Rehabilitation
//! Act commenced carry a period of top-up supervision after licence expiry.

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::config::{EngineConfig, TusedConfiguration};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationRule, Duration, Offender, ReleaseDateCalculationBreakdown, ReleaseDateType,
    Sentence, SentenceCalculation, inclusive_end_date,
};

use super::eligibility::EligibilityCalculator;
use super::working_day::WorkingDayService;

/// Calculates the top-up supervision expiry date.
///
/// TUSED is a fixed supervision period after the release point, ignoring
/// additional days awarded, moved back to a working day.
#[derive(Debug, Clone)]
pub struct TusedCalculator<'a> {
    config: &'a TusedConfiguration,
    ora_commencement: NaiveDate,
    working_days: WorkingDayService,
}

impl<'a> TusedCalculator<'a> {
    /// Creates the calculator from the engine configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config: config.tused(),
            ora_commencement: config.commencement_dates().ora,
            working_days: WorkingDayService::from_calendar(config.bank_holidays()),
        }
    }

    /// Supervision period added to the release point `days` into the sentence.
    fn supervision_expiry(&self, sentenced_at: NaiveDate, days: i64) -> EngineResult<NaiveDate> {
        let release = inclusive_end_date(sentenced_at, days)?;
        release
            .checked_add_months(Months::new(self.config.supervision_period_months))
            .ok_or_else(|| EngineError::invariant(format!("TUSED overflows from {release}")))
    }
}

impl EligibilityCalculator for TusedCalculator<'_> {
    fn date_type(&self) -> ReleaseDateType {
        ReleaseDateType::Tused
    }

    fn applies(
        &self,
        unit: &Sentence,
        calculation: &SentenceCalculation,
        offender: &Offender,
    ) -> EngineResult<bool> {
        if !unit.identification_track().is_some_and(|track| track.is_sds()) {
            return Ok(false);
        }
        if unit
            .offences()
            .iter()
            .any(|offence| offence.committed_at < self.ora_commencement)
        {
            return Ok(false);
        }

        let length = calculation.number_of_days_to_sentence_expiry;
        let maximum = Duration::years(self.config.maximum_sentence_length_years)
            .length_in_days(calculation.sentenced_at)?;
        if length <= self.config.minimum_sentence_length_days || length >= maximum {
            return Ok(false);
        }

        let Some(release) = calculation.release_date() else {
            return Ok(false);
        };
        Ok(offender
            .age_on(release)
            .is_none_or(|age| age >= self.config.minimum_age_at_release_years))
    }

    fn calculate(
        &self,
        _unit: &Sentence,
        calculation: &mut SentenceCalculation,
        _offender: &Offender,
        _extra_days: i64,
    ) -> EngineResult<()> {
        let days = calculation.number_of_days_to_determinate_release;
        let expiry = self.supervision_expiry(
            calculation.sentenced_at,
            days + calculation.adjustments.custody_days(),
        )?;
        let unadjusted = self.supervision_expiry(calculation.sentenced_at, days)?;
        let adjusted = self.working_days.previous_working_day(expiry)?;

        let mut breakdown = ReleaseDateCalculationBreakdown::new(adjusted.date, unadjusted)
            .with_rule(CalculationRule::TusedLicencePeriodLt2y);
        if let Some(reason) = adjusted.reason {
            breakdown.add_rule_with_adjustment(
                CalculationRule::TusedAdjustedToPreviousWorkingDay,
                (adjusted.date - expiry).num_days(),
            );
            debug!(
                identifier = %calculation.identifier,
                from = %expiry,
                to = %adjusted.date,
                reason = %reason,
                "Moved TUSED to previous working day"
            );
        }

        calculation.record(ReleaseDateType::Tused, breakdown);
        Ok(())
    }
}
