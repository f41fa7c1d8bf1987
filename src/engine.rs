//! The calculation entry point.
//!
//! [`CalculationEngine`] runs a booking through the full pipeline twice, once
//! under the standard release assumption and once assuming early release,
//! then allocates the tranche and merges the two results.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::calculation::{
    EligibilityCalculator, ErsedCalculator, HdcedCalculator, HdcedVariant, ReleaseAssumption,
    Timeline, TusedCalculator, allocate_tranche, applied_adjustments, calculate_sentence,
    combine_consecutive_sentences, extract, identify, merge,
};
use crate::config::{ConfigLoader, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{Booking, CalculationResult, CalculationUserInputs, Sentence, SentenceCalculation};

/// The output of one calculation pass.
#[derive(Debug, Clone)]
pub struct CalculationPass {
    /// The booking dates extracted from this pass.
    pub result: CalculationResult,
    /// The classified calculation units, in timeline order.
    pub sentences: Vec<Sentence>,
    /// The per-unit calculations, in timeline order.
    pub calculations: Vec<SentenceCalculation>,
}

/// Calculates release dates for bookings.
///
/// The configuration is immutable and shared, so an engine can be cloned
/// cheaply and used from several threads.
///
/// # Example
///
/// ```no_run
/// use release_date_engine::engine::CalculationEngine;
/// use release_date_engine::models::{Booking, CalculationUserInputs};
///
/// let engine = CalculationEngine::from_config_dir("./config/england_and_wales")?;
/// let booking = Booking::from_json(&std::fs::read_to_string("booking.json").unwrap())?;
/// let result = engine.calculate(&booking, &CalculationUserInputs::default())?;
/// println!("{:?}", result.dates);
/// # Ok::<(), release_date_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CalculationEngine {
    config: Arc<EngineConfig>,
}

impl CalculationEngine {
    /// Creates an engine over a loaded configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Loads the configuration directory and creates an engine over it.
    pub fn from_config_dir<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        Ok(Self::new(ConfigLoader::load(path)?.into_config()))
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Calculates the release dates for a booking.
    ///
    /// Runs the standard and early passes, allocates the early release
    /// tranche from the early pass and merges the two results.
    ///
    /// # Errors
    ///
    /// - `UnsupportedCalculation` for bookings the engine does not model
    /// - `InvariantViolation` for inconsistent input such as cyclic chains
    /// - `MultiplierNotConfigured` when a track has no release fraction
    pub fn calculate(
        &self,
        booking: &Booking,
        inputs: &CalculationUserInputs,
    ) -> EngineResult<CalculationResult> {
        let start_time = Instant::now();

        let outcome = self.calculate_both_passes(booking, inputs);
        match &outcome {
            Ok(result) => info!(
                booking_id = booking.booking_id,
                tranche = %result.sds_early_release_tranche,
                dates = result.dates.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            ),
            Err(err) if err.is_unsupported() => warn!(
                booking_id = booking.booking_id,
                error = %err,
                "Calculation not supported"
            ),
            Err(err) => warn!(
                booking_id = booking.booking_id,
                error = %err,
                "Calculation failed"
            ),
        }
        outcome
    }

    fn calculate_both_passes(
        &self,
        booking: &Booking,
        inputs: &CalculationUserInputs,
    ) -> EngineResult<CalculationResult> {
        let standard = self.calculate_pass(booking, inputs, ReleaseAssumption::Standard)?;
        let early = self.calculate_pass(booking, inputs, ReleaseAssumption::Early)?;
        let tranche = allocate_tranche(&early.sentences, &standard.result, &self.config)?;
        Ok(merge(&standard.result, &early.result, tranche, &self.config))
    }

    /// Runs one pass of the pipeline under a release assumption.
    ///
    /// Chains are assembled, every unit is classified, ordered on the
    /// timeline and calculated, and the booking dates are extracted.
    pub fn calculate_pass(
        &self,
        booking: &Booking,
        inputs: &CalculationUserInputs,
        assumption: ReleaseAssumption,
    ) -> EngineResult<CalculationPass> {
        if booking.sentences.is_empty() {
            return Err(EngineError::unsupported("booking has no sentences"));
        }
        let config = self.config.as_ref();

        let mut units = combine_consecutive_sentences(&booking.sentences)?;
        for unit in &mut units {
            identify(unit, inputs, config, assumption)?;
        }
        let timeline = Timeline::build(units, booking.return_to_custody_date)?;
        debug!(
            booking_id = booking.booking_id,
            assumption = ?assumption,
            units = timeline.entries().len(),
            earliest = ?timeline.earliest_sentenced_at(),
            latest = ?timeline.latest_sentenced_at(),
            "Built sentence timeline"
        );

        let hdced = HdcedCalculator::new(HdcedVariant::Hdced, config);
        let hdced4plus = HdcedCalculator::new(HdcedVariant::FourPlus, config);
        let ersed = ErsedCalculator::new(config);
        let tused = TusedCalculator::new(config);
        let mut calculators: Vec<&dyn EligibilityCalculator> = vec![&hdced, &hdced4plus];
        if inputs.calculate_ersed {
            calculators.push(&ersed);
        }
        calculators.push(&tused);

        let mut calculations = Vec::with_capacity(timeline.entries().len());
        for entry in timeline.entries() {
            let applied = applied_adjustments(&booking.adjustments, &entry.sentence)?;
            let mut calculation =
                calculate_sentence(&entry.sentence, applied, entry.recall_anchor, config)?;
            for calculator in &calculators {
                if !calculator.apply(&entry.sentence, &mut calculation, &booking.offender)? {
                    debug!(
                        identifier = %calculation.identifier,
                        date_type = %calculator.date_type(),
                        "Eligibility date does not apply"
                    );
                }
            }
            calculations.push(calculation);
        }

        let result = extract(&calculations)?;
        debug!(
            booking_id = booking.booking_id,
            assumption = ?assumption,
            units = calculations.len(),
            dates = result.dates.len(),
            "Calculation pass completed"
        );

        Ok(CalculationPass {
            result,
            sentences: timeline
                .into_entries()
                .into_iter()
                .map(|entry| entry.sentence)
                .collect(),
            calculations,
        })
    }
}
