//! Core data models for the Release Date Calculation Engine.
//!
//! This module contains the booking input, the per-unit work object and the
//! booking-level result, plus the closed enumerations shared between them.

mod adjustments;
mod booking;
mod calculation_result;
mod duration;
mod release_dates;
mod sentence;
mod sentence_calculation;

pub use adjustments::{AdjustmentEffect, AdjustmentEntry, AdjustmentType, Adjustments};
pub use booking::{Booking, CalculationUserInputs, Offender, SentenceUserInput, UserInputType};
pub use calculation_result::CalculationResult;
pub use duration::{Duration, DurationUnit};
pub(crate) use duration::{inclusive_end_date, plus_days};
pub use release_dates::{
    CalculationRule, ReleaseDateType, SdsEarlyReleaseTranche, SentenceIdentificationTrack,
};
pub use sentence::{
    BotusSentence, ConsecutiveSentence, EarlyReleaseExclusion, ExtendedDeterminateSentence,
    Offence, OffenceIndicators, RecallType, Sentence, SentenceDetails, StandardSentence,
};
pub use sentence_calculation::{
    AppliedAdjustments, ReleaseDateCalculationBreakdown, SentenceCalculation,
};
