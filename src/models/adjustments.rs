//! Adjustment models.
//!
//! Adjustments are consumed, never mutated, by the calculation pipeline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of an adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Time spent on remand before sentencing.
    Remand,
    /// Time spent on qualifying curfew while on bail.
    TaggedBail,
    /// Time spent in custody abroad awaiting extradition.
    TimeSpentInCustodyAbroad,
    /// Time spent unlawfully at large.
    UnlawfullyAtLarge,
    /// Time spent as an appeal applicant that the court directed not to count.
    TimeSpentAsAnAppealApplicant,
    /// Additional days awarded for disciplinary offences.
    AdditionalDaysAwarded,
    /// Restoration of previously awarded additional days.
    RestorationOfAdditionalDaysAwarded,
    /// Deductions that could not be applied to any sentence. Informational.
    UnusedDeductions,
}

/// How an adjustment type moves the calculated dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentEffect {
    /// Credit that brings every date forward.
    Deduction,
    /// Time that extends the whole sentence, expiry included.
    SentenceExtension,
    /// Time that extends release-point dates only.
    ReleaseExtension,
    /// Reverses release-point extension.
    ReleaseRestoration,
    /// Recorded but never applied.
    Informational,
}

impl AdjustmentType {
    /// Returns the effect this adjustment type has on calculated dates.
    pub fn effect(&self) -> AdjustmentEffect {
        match self {
            AdjustmentType::Remand
            | AdjustmentType::TaggedBail
            | AdjustmentType::TimeSpentInCustodyAbroad => AdjustmentEffect::Deduction,
            AdjustmentType::UnlawfullyAtLarge | AdjustmentType::TimeSpentAsAnAppealApplicant => {
                AdjustmentEffect::SentenceExtension
            }
            AdjustmentType::AdditionalDaysAwarded => AdjustmentEffect::ReleaseExtension,
            AdjustmentType::RestorationOfAdditionalDaysAwarded => {
                AdjustmentEffect::ReleaseRestoration
            }
            AdjustmentType::UnusedDeductions => AdjustmentEffect::Informational,
        }
    }
}

/// A single adjustment record.
///
/// The applicability range is over sentencing dates: the entry applies to a
/// sentence passed on or after `applies_from` and on or before `applies_to`.
/// A `sentence_sequence` restricts the entry to the sentence with that line
/// sequence, within the case given by `case_sequence` when present; without a
/// sentence sequence the entry applies across the booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentEntry {
    /// The number of days adjusted.
    pub number_of_days: u32,
    /// Earliest sentencing date this entry applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_from: Option<NaiveDate>,
    /// Latest sentencing date this entry applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<NaiveDate>,
    /// Line sequence of the sentence this entry belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_sequence: Option<u32>,
    /// Case sequence of the sentence this entry belongs to. Line sequences
    /// repeat across cases, so without one the entry matches every case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sequence: Option<u32>,
}

impl AdjustmentEntry {
    /// A booking-wide entry with no date restriction.
    pub fn days(number_of_days: u32) -> Self {
        Self {
            number_of_days,
            applies_from: None,
            applies_to: None,
            sentence_sequence: None,
            case_sequence: None,
        }
    }

    /// Restricts the entry to the sentence with the given line sequence.
    pub fn for_sentence(mut self, line_sequence: u32) -> Self {
        self.sentence_sequence = Some(line_sequence);
        self
    }

    /// Restricts the entry to sentences in the case with the given sequence.
    pub fn in_case(mut self, case_sequence: u32) -> Self {
        self.case_sequence = Some(case_sequence);
        self
    }

    /// Returns true when this entry applies to a sentence passed on
    /// `sentenced_at` made up of the given (case, line) sequences.
    pub fn applies_to_sentence(
        &self,
        sentenced_at: NaiveDate,
        sequences: &[(u32, u32)],
    ) -> bool {
        let in_range = self.applies_from.is_none_or(|from| sentenced_at >= from)
            && self.applies_to.is_none_or(|to| sentenced_at <= to);
        let for_sentence = self.sentence_sequence.is_none_or(|line| {
            sequences.iter().any(|&(case, sentence_line)| {
                sentence_line == line && self.case_sequence.is_none_or(|wanted| wanted == case)
            })
        });
        in_range && for_sentence
    }
}

/// All adjustments on a booking, keyed by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Adjustments {
    entries: BTreeMap<AdjustmentType, Vec<AdjustmentEntry>>,
}

impl Adjustments {
    /// Creates an empty set of adjustments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add(&mut self, adjustment_type: AdjustmentType, entry: AdjustmentEntry) {
        self.entries.entry(adjustment_type).or_default().push(entry);
    }

    /// Builder form of [`Adjustments::add`].
    pub fn with(mut self, adjustment_type: AdjustmentType, entry: AdjustmentEntry) -> Self {
        self.add(adjustment_type, entry);
        self
    }

    /// The entries recorded for a type.
    pub fn entries(&self, adjustment_type: AdjustmentType) -> &[AdjustmentEntry] {
        self.entries
            .get(&adjustment_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates over every type and its entries.
    pub fn iter(&self) -> impl Iterator<Item = (&AdjustmentType, &Vec<AdjustmentEntry>)> {
        self.entries.iter()
    }

    /// Total days of a type applying to a sentence.
    pub fn total_days(
        &self,
        adjustment_type: AdjustmentType,
        sentenced_at: NaiveDate,
        sequences: &[(u32, u32)],
    ) -> i64 {
        self.entries(adjustment_type)
            .iter()
            .filter(|entry| entry.applies_to_sentence(sentenced_at, sequences))
            .map(|entry| i64::from(entry.number_of_days))
            .sum()
    }

    /// Returns true when no entries are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}
