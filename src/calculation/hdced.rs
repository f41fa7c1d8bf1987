//! Home detention curfew eligibility.
//!
//! HDCED and HDCED4PLUS share one algorithm and differ only in configuration
//! and in the rules they record.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{EngineConfig, HdcedConfiguration};
use crate::error::EngineResult;
use crate::models::{
    CalculationRule, Duration, Offender, ReleaseDateCalculationBreakdown, ReleaseDateType,
    Sentence, SentenceCalculation, SentenceIdentificationTrack, inclusive_end_date, plus_days,
};

use super::eligibility::EligibilityCalculator;
use super::release_point::days_at_fraction;

/// Which home detention curfew date a calculator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HdcedVariant {
    /// The standard HDCED.
    Hdced,
    /// HDCED for sentences of four years or more on the early release track.
    FourPlus,
}

impl HdcedVariant {
    /// The date type recorded by this variant.
    pub fn date_type(&self) -> ReleaseDateType {
        match self {
            HdcedVariant::Hdced => ReleaseDateType::Hdced,
            HdcedVariant::FourPlus => ReleaseDateType::Hdced4Plus,
        }
    }

    fn below_midpoint_rule(&self) -> CalculationRule {
        match self {
            HdcedVariant::Hdced => CalculationRule::HdcedGeMinPeriodLtMidpoint,
            HdcedVariant::FourPlus => CalculationRule::Hdced4PlusGeMinPeriodLtMidpoint,
        }
    }

    fn above_midpoint_rule(&self) -> CalculationRule {
        match self {
            HdcedVariant::Hdced => CalculationRule::HdcedGeMidpointLtMaxPeriod,
            HdcedVariant::FourPlus => CalculationRule::Hdced4PlusGeMidpointLtMaxPeriod,
        }
    }

    fn minimum_custodial_rule(&self) -> CalculationRule {
        match self {
            HdcedVariant::Hdced => CalculationRule::HdcedMinimumCustodialPeriod,
            HdcedVariant::FourPlus => CalculationRule::Hdced4PlusMinimumCustodialPeriod,
        }
    }

    /// The rule recorded when the booking raises this date to a concurrent
    /// unit's later release date.
    pub fn concurrent_release_rule(&self) -> CalculationRule {
        match self {
            HdcedVariant::Hdced => CalculationRule::HdcedAdjustedToConcurrentConditionalRelease,
            HdcedVariant::FourPlus => {
                CalculationRule::Hdced4PlusAdjustedToConcurrentConditionalRelease
            }
        }
    }
}

/// Calculates a home detention curfew eligibility date.
///
/// Below the custodial midpoint the date is a quarter of the sentence (never
/// less than the minimum eligibility period) after sentencing. At or above it
/// the date is a fixed number of days before the release point. Either way it
/// is never earlier than the minimum custodial period after sentencing.
///
/// # Example
///
/// ```no_run
/// use release_date_engine::calculation::{HdcedCalculator, HdcedVariant};
/// use release_date_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/england_and_wales")?;
/// let hdced = HdcedCalculator::new(HdcedVariant::Hdced, loader.config());
/// # Ok::<(), release_date_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HdcedCalculator<'a> {
    variant: HdcedVariant,
    config: &'a HdcedConfiguration,
}

impl<'a> HdcedCalculator<'a> {
    /// Creates the calculator for `variant` from the engine configuration.
    pub fn new(variant: HdcedVariant, config: &'a EngineConfig) -> Self {
        let config = match variant {
            HdcedVariant::Hdced => config.hdced(),
            HdcedVariant::FourPlus => config.hdced4plus(),
        };
        Self { variant, config }
    }

    /// The variant this calculator produces.
    pub fn variant(&self) -> HdcedVariant {
        self.variant
    }
}

impl EligibilityCalculator for HdcedCalculator<'_> {
    fn date_type(&self) -> ReleaseDateType {
        self.variant.date_type()
    }

    fn applies(
        &self,
        unit: &Sentence,
        calculation: &SentenceCalculation,
        offender: &Offender,
    ) -> EngineResult<bool> {
        if offender.is_active_sex_offender || unit.recall_type().is_recall() {
            return Ok(false);
        }

        let component_tracks = unit.component_tracks();
        let mut custodial_tracks = component_tracks
            .iter()
            .filter(|track| **track != SentenceIdentificationTrack::Botus)
            .peekable();
        if custodial_tracks.peek().is_none() {
            return Ok(false);
        }
        if !custodial_tracks.all(|track| self.config.applicable_tracks.contains(track)) {
            return Ok(false);
        }
        if self.config.excludes_sds_plus_chains
            && component_tracks.contains(&SentenceIdentificationTrack::SdsPlusRelease)
        {
            return Ok(false);
        }

        let length = calculation.number_of_days_to_sentence_expiry
            - calculation.extra_days_for_sds_consecutive_to_botus;
        if length < self.config.minimum_sentence_length_days {
            return Ok(false);
        }
        if let Some(years) = self.config.minimum_sentence_length_years {
            let minimum = Duration::years(years).length_in_days(calculation.sentenced_at)?;
            if length < minimum {
                return Ok(false);
            }
        }
        if let Some(years) = self.config.maximum_sentence_length_years {
            let maximum = Duration::years(years).length_in_days(calculation.sentenced_at)?;
            if length >= maximum {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn calculate(
        &self,
        _unit: &Sentence,
        calculation: &mut SentenceCalculation,
        _offender: &Offender,
        extra_days: i64,
    ) -> EngineResult<()> {
        let config = self.config;
        let sentenced_at = calculation.sentenced_at;
        let length = calculation.number_of_days_to_sentence_expiry - extra_days;
        let custodial = calculation.number_of_days_to_determinate_release - extra_days;
        let custody_adjustment = calculation.adjustments.custody_days();

        let (date, unadjusted, rule) = if custodial < config.custodial_period_mid_point_days {
            let days = days_at_fraction(length, Decimal::new(25, 2))?
                .max(config.minimum_eligibility_period_days);
            (
                plus_days(sentenced_at, days + custody_adjustment)?,
                plus_days(sentenced_at, days)?,
                self.variant.below_midpoint_rule(),
            )
        } else {
            // Release point without additional days awarded.
            let release = inclusive_end_date(sentenced_at, custodial + custody_adjustment)?;
            let unadjusted_release = inclusive_end_date(sentenced_at, custodial)?;
            (
                plus_days(release, -config.deduction_days)?,
                plus_days(unadjusted_release, -config.deduction_days)?,
                self.variant.above_midpoint_rule(),
            )
        };

        let mut date = date;
        let mut unadjusted = unadjusted;
        let mut rules = vec![rule];
        let mut rule_adjustments = Vec::new();

        let floor = plus_days(sentenced_at, config.minimum_custodial_period_days)?;
        if date < floor {
            let rule = self.variant.minimum_custodial_rule();
            rules.push(rule);
            rule_adjustments.push((rule, (floor - date).num_days()));
            date = floor;
        }

        if extra_days > 0 {
            let rule = CalculationRule::ConsecutiveToBotusExtraDays;
            rules.push(rule);
            rule_adjustments.push((rule, extra_days));
            date = plus_days(date, extra_days)?;
            unadjusted = plus_days(unadjusted, extra_days)?;
        }

        let mut breakdown = ReleaseDateCalculationBreakdown::new(date, unadjusted);
        for rule in rules {
            breakdown.add_rule(rule);
        }
        for (rule, days) in rule_adjustments {
            breakdown.add_rule_with_adjustment(rule, days);
        }

        debug!(
            identifier = %calculation.identifier,
            date_type = %self.variant.date_type(),
            date = %date,
            "Calculated home detention curfew eligibility"
        );
        calculation.record(self.variant.date_type(), breakdown);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::identification::{ReleaseAssumption, identify};
    use crate::calculation::sentence_calculation::calculate_sentence;
    use crate::config::ConfigLoader;
    use crate::models::{
        AppliedAdjustments, BotusSentence, CalculationUserInputs, ConsecutiveSentence,
        EarlyReleaseExclusion, Offence, OffenceIndicators, RecallType, SentenceDetails,
        StandardSentence,
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> EngineConfig {
        ConfigLoader::load("config/england_and_wales")
            .unwrap()
            .config()
            .clone()
    }

    fn offender() -> Offender {
        Offender {
            reference: "A1234BC".to_string(),
            date_of_birth: None,
            is_active_sex_offender: false,
        }
    }

    fn details(sentenced_at: NaiveDate) -> SentenceDetails {
        SentenceDetails {
            identifier: Uuid::new_v4(),
            case_sequence: 1,
            line_sequence: 1,
            sentenced_at,
            offence: Offence {
                committed_at: date(2019, 12, 1),
                offence_code: "TH68010".to_string(),
                indicators: OffenceIndicators::default(),
            },
            recall_type: RecallType::None,
            consecutive_to: None,
            identification_track: None,
        }
    }

    fn standard(sentenced_at: NaiveDate, duration: Duration) -> Sentence {
        Sentence::Standard(StandardSentence {
            details: details(sentenced_at),
            duration,
            is_sds_plus: false,
            is_section_250: false,
            early_release_exclusion: EarlyReleaseExclusion::None,
        })
    }

    fn run(
        unit: Sentence,
        adjustments: AppliedAdjustments,
        variant: HdcedVariant,
        assumption: ReleaseAssumption,
        offender: &Offender,
    ) -> SentenceCalculation {
        let config = config();
        let mut unit = unit;
        identify(&mut unit, &CalculationUserInputs::default(), &config, assumption).unwrap();
        let mut calculation = calculate_sentence(&unit, adjustments, None, &config).unwrap();
        HdcedCalculator::new(variant, &config)
            .apply(&unit, &mut calculation, offender)
            .unwrap();
        calculation
    }

    fn hdced(unit: Sentence, adjustments: AppliedAdjustments) -> SentenceCalculation {
        run(
            unit,
            adjustments,
            HdcedVariant::Hdced,
            ReleaseAssumption::Standard,
            &offender(),
        )
    }

    // ==========================================================================
    // HD-001: Below the midpoint, a quarter of the sentence
    // ==========================================================================
    #[test]
    fn test_hd_001_quarter_of_140_days() {
        let calculation = hdced(
            standard(date(2020, 1, 1), Duration::days(140)),
            AppliedAdjustments::default(),
        );

        assert_eq!(calculation.date(ReleaseDateType::Hdced), Some(date(2020, 2, 5)));
        assert_eq!(
            calculation.breakdown_by_release_date_type[&ReleaseDateType::Hdced].rules,
            vec![CalculationRule::HdcedGeMinPeriodLtMidpoint]
        );
    }

    // ==========================================================================
    // HD-002: Remand pushes below the minimum custodial period
    // ==========================================================================
    #[test]
    fn test_hd_002_minimum_custodial_period_dominates() {
        let adjustments = AppliedAdjustments {
            deducted_days: 25,
            ..AppliedAdjustments::default()
        };
        let calculation = hdced(standard(date(2020, 1, 1), Duration::days(140)), adjustments);

        assert_eq!(calculation.date(ReleaseDateType::Hdced), Some(date(2020, 1, 15)));
        let breakdown = &calculation.breakdown_by_release_date_type[&ReleaseDateType::Hdced];
        assert_eq!(
            breakdown.rules,
            vec![
                CalculationRule::HdcedGeMinPeriodLtMidpoint,
                CalculationRule::HdcedMinimumCustodialPeriod,
            ]
        );
        assert_eq!(
            breakdown.rule_adjustments[&CalculationRule::HdcedMinimumCustodialPeriod],
            4
        );
    }

    // ==========================================================================
    // HD-003: At or above the midpoint, a fixed deduction from release
    // ==========================================================================
    #[test]
    fn test_hd_003_deduction_from_release_point() {
        let calculation = hdced(
            standard(date(2020, 1, 1), Duration::days(722)),
            AppliedAdjustments::default(),
        );

        assert_eq!(calculation.date(ReleaseDateType::Crd), Some(date(2020, 12, 26)));
        assert_eq!(calculation.date(ReleaseDateType::Hdced), Some(date(2020, 6, 30)));
        assert_eq!(
            calculation.breakdown_by_release_date_type[&ReleaseDateType::Hdced].rules,
            vec![CalculationRule::HdcedGeMidpointLtMaxPeriod]
        );
    }

    #[test]
    fn test_hd_004_minimum_eligibility_period_for_short_sentences() {
        // A quarter of 90 days is 23, below the 28 day minimum.
        let calculation = hdced(
            standard(date(2020, 1, 1), Duration::days(90)),
            AppliedAdjustments::default(),
        );
        assert_eq!(calculation.date(ReleaseDateType::Hdced), Some(date(2020, 1, 29)));
    }

    #[test]
    fn test_hd_005_additional_days_do_not_move_hdced() {
        let adjustments = AppliedAdjustments {
            release_extension_days: 10,
            ..AppliedAdjustments::default()
        };
        let calculation = hdced(standard(date(2020, 1, 1), Duration::days(722)), adjustments);

        assert_eq!(calculation.date(ReleaseDateType::Crd), Some(date(2021, 1, 5)));
        assert_eq!(calculation.date(ReleaseDateType::Hdced), Some(date(2020, 6, 30)));
    }

    // ==========================================================================
    // HD-006: Gates
    // ==========================================================================
    #[test]
    fn test_hd_006_sex_offenders_are_ineligible() {
        let offender = Offender {
            is_active_sex_offender: true,
            ..offender()
        };
        let calculation = run(
            standard(date(2020, 1, 1), Duration::days(140)),
            AppliedAdjustments::default(),
            HdcedVariant::Hdced,
            ReleaseAssumption::Standard,
            &offender,
        );
        assert!(calculation.date(ReleaseDateType::Hdced).is_none());
    }

    #[test]
    fn test_hd_007_below_minimum_length_is_ineligible() {
        let calculation = hdced(
            standard(date(2020, 1, 1), Duration::days(83)),
            AppliedAdjustments::default(),
        );
        assert!(calculation.date(ReleaseDateType::Hdced).is_none());
    }

    #[test]
    fn test_hd_008_four_years_is_ineligible_for_hdced() {
        let calculation = hdced(
            standard(date(2020, 1, 1), Duration::years(4)),
            AppliedAdjustments::default(),
        );
        assert!(calculation.date(ReleaseDateType::Hdced).is_none());
    }

    #[test]
    fn test_hd_009_recalls_are_ineligible() {
        let mut unit = standard(date(2020, 1, 1), Duration::days(140));
        if let Sentence::Standard(s) = &mut unit {
            s.details.recall_type = RecallType::StandardRecall;
        }
        let calculation = hdced(unit, AppliedAdjustments::default());
        assert!(calculation.date(ReleaseDateType::Hdced).is_none());
    }

    // ==========================================================================
    // HD-010: HDCED4PLUS for long sentences on the early release track
    // ==========================================================================
    #[test]
    fn test_hd_010_four_plus_on_early_track() {
        let unit = standard(date(2024, 10, 1), Duration::years(5));
        let calculation = run(
            unit.clone(),
            AppliedAdjustments::default(),
            HdcedVariant::FourPlus,
            ReleaseAssumption::Early,
            &offender(),
        );
        assert!(calculation.date(ReleaseDateType::Hdced4Plus).is_some());
        assert_eq!(
            calculation.breakdown_by_release_date_type[&ReleaseDateType::Hdced4Plus].rules,
            vec![CalculationRule::Hdced4PlusGeMidpointLtMaxPeriod]
        );

        let standard_track = run(
            standard(date(2020, 1, 1), Duration::years(5)),
            AppliedAdjustments::default(),
            HdcedVariant::FourPlus,
            ReleaseAssumption::Standard,
            &offender(),
        );
        assert!(standard_track.date(ReleaseDateType::Hdced4Plus).is_none());
    }

    #[test]
    fn test_hd_012_four_plus_needs_four_years() {
        let short = run(
            standard(date(2024, 10, 1), Duration::years(1)),
            AppliedAdjustments::default(),
            HdcedVariant::FourPlus,
            ReleaseAssumption::Early,
            &offender(),
        );
        assert!(short.date(ReleaseDateType::Hdced4Plus).is_none());

        let just_under = run(
            standard(date(2024, 10, 1), Duration::days(1460)),
            AppliedAdjustments::default(),
            HdcedVariant::FourPlus,
            ReleaseAssumption::Early,
            &offender(),
        );
        assert!(just_under.date(ReleaseDateType::Hdced4Plus).is_none());

        let four_years = run(
            standard(date(2024, 10, 1), Duration::years(4)),
            AppliedAdjustments::default(),
            HdcedVariant::FourPlus,
            ReleaseAssumption::Early,
            &offender(),
        );
        assert!(four_years.date(ReleaseDateType::Hdced4Plus).is_some());
    }

    // ==========================================================================
    // HD-011: BOTUS days are added last
    // ==========================================================================
    #[test]
    fn test_hd_011_consecutive_to_botus_adds_extra_days() {
        let botus = Sentence::Botus(BotusSentence {
            details: details(date(2020, 1, 1)),
            duration: Duration::days(20),
        });
        let chain = Sentence::Consecutive(ConsecutiveSentence {
            components: vec![botus, standard(date(2020, 1, 1), Duration::days(140))],
            identification_track: None,
        });
        let calculation = hdced(chain, AppliedAdjustments::default());

        // The SDS portion alone gives 2020-02-05; the BOTUS term is served first.
        assert_eq!(calculation.date(ReleaseDateType::Hdced), Some(date(2020, 2, 25)));
        let breakdown = &calculation.breakdown_by_release_date_type[&ReleaseDateType::Hdced];
        assert!(breakdown.rules.contains(&CalculationRule::ConsecutiveToBotusExtraDays));
        assert_eq!(
            breakdown.rule_adjustments[&CalculationRule::ConsecutiveToBotusExtraDays],
            20
        );
    }
}
