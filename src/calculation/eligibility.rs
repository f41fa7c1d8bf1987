//! The interface shared by the specialised eligibility calculators.

use crate::error::EngineResult;
use crate::models::{Offender, ReleaseDateType, Sentence, SentenceCalculation};

/// A calculator for one optional eligibility date.
///
/// Calculators run after the unit's expiry and release point dates are
/// recorded. An inapplicable calculator records nothing; that is never an
/// error.
pub trait EligibilityCalculator {
    /// The date type this calculator records.
    fn date_type(&self) -> ReleaseDateType;

    /// Whether the date applies to this unit and offender.
    fn applies(
        &self,
        unit: &Sentence,
        calculation: &SentenceCalculation,
        offender: &Offender,
    ) -> EngineResult<bool>;

    /// Records the date and its breakdown on `calculation`.
    ///
    /// `extra_days` is the length of any BOTUS terms served before the unit's
    /// first standard component.
    fn calculate(
        &self,
        unit: &Sentence,
        calculation: &mut SentenceCalculation,
        offender: &Offender,
        extra_days: i64,
    ) -> EngineResult<()>;

    /// Runs the calculator when it applies. Returns whether a date was recorded.
    fn apply(
        &self,
        unit: &Sentence,
        calculation: &mut SentenceCalculation,
        offender: &Offender,
    ) -> EngineResult<bool> {
        if !self.applies(unit, calculation, offender)? {
            return Ok(false);
        }
        let extra_days = calculation.extra_days_for_sds_consecutive_to_botus;
        self.calculate(unit, calculation, offender, extra_days)?;
        Ok(true)
    }
}
