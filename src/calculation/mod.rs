//! Calculation logic for the Release Date Calculation Engine.
//!
//! This module contains the calculation steps for one booking: consecutive
//! chain assembly and aggregation, release point classification, adjustment
//! totals, per-unit sentence calculation, the HDCED, ERSED and TUSED
//! eligibility calculators, timeline ordering, booking extraction, early
//! release tranche allocation and the merge of the standard and early passes.

mod adjustments;
mod aggregation;
mod early_release;
mod eligibility;
mod ersed;
mod extraction;
mod hdced;
mod identification;
mod release_point;
mod sentence_calculation;
mod timeline;
mod tranche;
mod tused;
mod working_day;

pub use adjustments::applied_adjustments;
pub use aggregation::{
    AggregatePart, ChainAggregate, aggregate, combine_consecutive_sentences,
    custodial_length_days, ensure_supported_chain, sentence_length_days,
};
pub use early_release::merge;
pub use eligibility::EligibilityCalculator;
pub use ersed::ErsedCalculator;
pub use extraction::extract;
pub use hdced::{HdcedCalculator, HdcedVariant};
pub use identification::{
    ReleaseAssumption, identify, is_early_release_eligible, is_sds_plus,
};
pub use release_point::{ReleasePointMultiplierLookup, ceil_days, days_at_fraction};
pub use sentence_calculation::calculate_sentence;
pub use timeline::{Timeline, TimelineEntry};
pub use tranche::allocate_tranche;
pub use tused::TusedCalculator;
pub use working_day::{AdjustedDay, DayType, WorkingDayService};
