//! The per-sentence work object and its breakdown entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalculationRule, ReleaseDateType};

/// Explains how one date of one type was produced.
///
/// # Example
///
/// ```
/// use release_date_engine::models::{CalculationRule, ReleaseDateCalculationBreakdown};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2020, 2, 5).unwrap();
/// let mut breakdown = ReleaseDateCalculationBreakdown::new(date, date);
/// breakdown.add_rule(CalculationRule::HdcedGeMinPeriodLtMidpoint);
/// breakdown.add_rule(CalculationRule::HdcedGeMinPeriodLtMidpoint);
/// assert_eq!(breakdown.rules.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDateCalculationBreakdown {
    /// Rules that fired, in the order they were evaluated.
    pub rules: Vec<CalculationRule>,
    /// Days contributed by individual rules.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rule_adjustments: BTreeMap<CalculationRule, i64>,
    /// Net adjustment in days between the unadjusted and final date.
    pub adjusted_days: i64,
    /// The final date.
    pub release_date: NaiveDate,
    /// The date before adjustments were applied.
    pub unadjusted_date: NaiveDate,
}

impl ReleaseDateCalculationBreakdown {
    /// Creates a breakdown with no rules; `adjusted_days` is derived from the dates.
    pub fn new(release_date: NaiveDate, unadjusted_date: NaiveDate) -> Self {
        Self {
            rules: Vec::new(),
            rule_adjustments: BTreeMap::new(),
            adjusted_days: (release_date - unadjusted_date).num_days(),
            release_date,
            unadjusted_date,
        }
    }

    /// Records that a rule fired. A rule is only listed once.
    pub fn add_rule(&mut self, rule: CalculationRule) {
        if !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
    }

    /// Records a rule together with the days it contributed.
    pub fn add_rule_with_adjustment(&mut self, rule: CalculationRule, days: i64) {
        self.add_rule(rule);
        self.rule_adjustments.insert(rule, days);
    }

    /// Builder form of [`ReleaseDateCalculationBreakdown::add_rule`].
    pub fn with_rule(mut self, rule: CalculationRule) -> Self {
        self.add_rule(rule);
        self
    }
}

/// Adjustment totals applied to one calculation unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAdjustments {
    /// Credit days (remand, tagged bail, custody abroad).
    pub deducted_days: i64,
    /// Days extending the whole sentence (unlawfully at large, appeal applicant).
    pub sentence_extension_days: i64,
    /// Net additional days awarded, never negative.
    pub release_extension_days: i64,
}

impl AppliedAdjustments {
    /// Net days applied to expiry and eligibility windows.
    pub fn custody_days(&self) -> i64 {
        self.sentence_extension_days - self.deducted_days
    }

    /// Net days applied to release-point dates.
    pub fn release_days(&self) -> i64 {
        self.custody_days() + self.release_extension_days
    }
}

/// The mutable work object for one calculation unit.
///
/// A unit is a standalone sentence or a whole consecutive chain. Sentence
/// calculation creates it; the specialised calculators then add their dates
/// in place. It is owned by a single calculation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceCalculation {
    /// Identifier of the unit (the first component for a chain).
    pub identifier: Uuid,
    /// Sentencing date of the unit.
    pub sentenced_at: NaiveDate,
    /// Unadjusted days from sentencing to expiry.
    pub number_of_days_to_sentence_expiry: i64,
    /// Unadjusted days from sentencing to the determinate release point.
    pub number_of_days_to_determinate_release: i64,
    /// Unadjusted days to parole eligibility, for discretionary release.
    pub number_of_days_to_parole_eligibility: Option<i64>,
    /// Days served in full for BOTUS terms preceding the unit's SDS components.
    pub extra_days_for_sds_consecutive_to_botus: i64,
    /// Adjustment totals applying to the unit.
    pub adjustments: AppliedAdjustments,
    /// Adjusted days to expiry.
    pub adjusted_days_to_sentence_expiry: i64,
    /// Adjusted days to the determinate release point.
    pub adjusted_days_to_determinate_release: i64,
    /// Whether release is on licence.
    pub has_licence: bool,
    /// Calculated dates by type.
    pub dates: BTreeMap<ReleaseDateType, NaiveDate>,
    /// Breakdown for each calculated date.
    pub breakdown_by_release_date_type: BTreeMap<ReleaseDateType, ReleaseDateCalculationBreakdown>,
}

impl SentenceCalculation {
    /// Records a date and its breakdown, replacing any earlier entry for the type.
    pub fn record(&mut self, date_type: ReleaseDateType, breakdown: ReleaseDateCalculationBreakdown) {
        self.dates.insert(date_type, breakdown.release_date);
        self.breakdown_by_release_date_type.insert(date_type, breakdown);
    }

    /// The date recorded for a type.
    pub fn date(&self, date_type: ReleaseDateType) -> Option<NaiveDate> {
        self.dates.get(&date_type).copied()
    }

    /// The determinate release date (CRD or ARD).
    pub fn release_date(&self) -> Option<NaiveDate> {
        self.date(ReleaseDateType::Crd)
            .or_else(|| self.date(ReleaseDateType::Ard))
    }

    /// The actual release date for the unit: the release point or, for recalls, the PRRD.
    pub fn actual_release_date(&self) -> Option<NaiveDate> {
        self.release_date()
            .or_else(|| self.date(ReleaseDateType::Prrd))
    }

    /// The sentence expiry date (SLED or SED).
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.date(ReleaseDateType::Sled)
            .or_else(|| self.date(ReleaseDateType::Sed))
    }

    /// The licence expiry date, when release is on licence.
    pub fn licence_expiry_date(&self) -> Option<NaiveDate> {
        self.date(ReleaseDateType::Sled)
            .or_else(|| self.date(ReleaseDateType::Led))
    }

    /// Unadjusted expiry date: the last day of the sentence before adjustments.
    pub fn unadjusted_expiry_date(&self) -> Option<NaiveDate> {
        [ReleaseDateType::Sled, ReleaseDateType::Sed]
            .iter()
            .find_map(|t| self.breakdown_by_release_date_type.get(t))
            .map(|breakdown| breakdown.unadjusted_date)
    }
}
