//! Sentence models.
//!
//! A [`Sentence`] is a flat tagged variant over the sentence kinds the engine
//! models. Every variant exposes the same read accessors (sentencing date,
//! offences, identifier) and a mutable identification track slot that the
//! classification step fills in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Duration, SentenceIdentificationTrack};

/// Markers on an offence that drive SDS+ list membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffenceIndicators {
    /// Schedule 15 offence carrying a maximum of life imprisonment.
    pub is_schedule_15_maximum_life: bool,
    /// Offence on the PCSC list for 4 to under 7 year sentences.
    pub is_pcsc_sds: bool,
    /// Offence on the PCSC list for 7 year and longer sentences.
    pub is_pcsc_sds_plus: bool,
    /// Offence on the PCSC list for section 250 sentences.
    pub is_pcsc_sec250: bool,
}

/// The offence a sentence was passed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offence {
    /// The date the offence was committed.
    pub committed_at: NaiveDate,
    /// The offence code from the source system.
    pub offence_code: String,
    /// SDS+ list markers.
    #[serde(default)]
    pub indicators: OffenceIndicators,
}

/// Whether, and how, a sentence has been recalled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallType {
    /// Not recalled.
    #[default]
    None,
    /// Standard recall: released at licence expiry unless re-released by parole.
    StandardRecall,
    /// Fixed-term recall of 14 days.
    FixedTermRecall14,
    /// Fixed-term recall of 28 days.
    FixedTermRecall28,
}

impl RecallType {
    /// Returns true for any recall.
    pub fn is_recall(&self) -> bool {
        *self != RecallType::None
    }

    /// The number of days served for a fixed-term recall.
    pub fn fixed_term_days(&self) -> Option<i64> {
        match self {
            RecallType::FixedTermRecall14 => Some(14),
            RecallType::FixedTermRecall28 => Some(28),
            RecallType::None | RecallType::StandardRecall => None,
        }
    }
}

/// Offence categories excluded from the SDS early release scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyReleaseExclusion {
    /// Not excluded.
    #[default]
    None,
    /// Sexual offence.
    Sexual,
    /// Violent offence (excluded only for longer sentences).
    Violent,
    /// Domestic abuse related offence.
    DomesticAbuse,
    /// National security offence.
    NationalSecurity,
    /// Terrorism offence.
    Terrorism,
}

/// Attributes shared by every single (non-chain) sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceDetails {
    /// Unique identifier of the sentence.
    pub identifier: Uuid,
    /// Court case sequence within the booking.
    pub case_sequence: u32,
    /// Line sequence within the booking.
    pub line_sequence: u32,
    /// The date the sentence was passed.
    pub sentenced_at: NaiveDate,
    /// The offence sentenced.
    pub offence: Offence,
    /// Recall status.
    #[serde(default)]
    pub recall_type: RecallType,
    /// The sentence this one is served consecutively to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consecutive_to: Option<Uuid>,
    /// The track assigned by classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_track: Option<SentenceIdentificationTrack>,
}

/// A standard determinate sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardSentence {
    /// Shared sentence attributes.
    #[serde(flatten)]
    pub details: SentenceDetails,
    /// The sentence length.
    pub duration: Duration,
    /// Whether the source system recorded this as SDS+.
    #[serde(default)]
    pub is_sds_plus: bool,
    /// Whether the sentence was passed under section 250 (under 18s).
    #[serde(default)]
    pub is_section_250: bool,
    /// Early release scheme exclusion category.
    #[serde(default)]
    pub early_release_exclusion: EarlyReleaseExclusion,
}

/// An extended determinate sentence: a custodial term plus an extended licence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedDeterminateSentence {
    /// Shared sentence attributes.
    #[serde(flatten)]
    pub details: SentenceDetails,
    /// The custodial term.
    pub custodial_duration: Duration,
    /// The extension period served on licence.
    pub extension_duration: Duration,
}

/// A committal for breach of top-up supervision. Served in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotusSentence {
    /// Shared sentence attributes.
    #[serde(flatten)]
    pub details: SentenceDetails,
    /// The committal term.
    pub duration: Duration,
}

/// Sentences served back to back, treated as a single pseudo-sentence.
///
/// Has no duration of its own; its length is always aggregated from the
/// components, anchored at the earliest component sentencing date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsecutiveSentence {
    /// The component sentences in service order.
    pub components: Vec<Sentence>,
    /// The track assigned to the chain as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_track: Option<SentenceIdentificationTrack>,
}

/// Any sentence the engine can calculate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sentence {
    /// A standard determinate sentence.
    Standard(StandardSentence),
    /// An extended determinate sentence.
    ExtendedDeterminate(ExtendedDeterminateSentence),
    /// A breach of top-up supervision committal.
    Botus(BotusSentence),
    /// A chain of consecutive sentences.
    Consecutive(ConsecutiveSentence),
}

impl Sentence {
    /// Shared attributes, for single sentences.
    pub fn details(&self) -> Option<&SentenceDetails> {
        match self {
            Sentence::Standard(s) => Some(&s.details),
            Sentence::ExtendedDeterminate(s) => Some(&s.details),
            Sentence::Botus(s) => Some(&s.details),
            Sentence::Consecutive(_) => None,
        }
    }

    fn details_mut(&mut self) -> Option<&mut SentenceDetails> {
        match self {
            Sentence::Standard(s) => Some(&mut s.details),
            Sentence::ExtendedDeterminate(s) => Some(&mut s.details),
            Sentence::Botus(s) => Some(&mut s.details),
            Sentence::Consecutive(_) => None,
        }
    }

    /// The single sentences making up this sentence, in service order.
    ///
    /// A single sentence returns itself.
    pub fn components(&self) -> &[Sentence] {
        match self {
            Sentence::Consecutive(chain) => &chain.components,
            _ => std::slice::from_ref(self),
        }
    }

    /// Mutable access to the single sentences making up this sentence.
    pub fn components_mut(&mut self) -> &mut [Sentence] {
        match self {
            Sentence::Consecutive(chain) => &mut chain.components,
            _ => std::slice::from_mut(self),
        }
    }

    /// The identifier of the sentence, or of the first component of a chain.
    pub fn identifier(&self) -> Option<Uuid> {
        self.components()
            .first()
            .and_then(Sentence::details)
            .map(|details| details.identifier)
    }

    /// The sentencing date; for a chain, the earliest component sentencing date.
    pub fn sentenced_at(&self) -> Option<NaiveDate> {
        match self {
            Sentence::Consecutive(chain) => chain
                .components
                .iter()
                .filter_map(Sentence::sentenced_at)
                .min(),
            _ => self.details().map(|details| details.sentenced_at),
        }
    }

    /// The case and line sequence used to order sentences sentenced on the same day.
    pub fn sequence(&self) -> (u32, u32) {
        self.components()
            .first()
            .and_then(Sentence::details)
            .map_or((0, 0), |details| (details.case_sequence, details.line_sequence))
    }

    /// Case and line sequences of every single sentence in this sentence.
    pub fn sequences(&self) -> Vec<(u32, u32)> {
        self.components()
            .iter()
            .filter_map(Sentence::details)
            .map(|details| (details.case_sequence, details.line_sequence))
            .collect()
    }

    /// Offences of every single sentence in this sentence.
    pub fn offences(&self) -> Vec<&Offence> {
        self.components()
            .iter()
            .filter_map(Sentence::details)
            .map(|details| &details.offence)
            .collect()
    }

    /// The recall type; for a chain, the first recalled component's.
    pub fn recall_type(&self) -> RecallType {
        self.components()
            .iter()
            .filter_map(Sentence::details)
            .map(|details| details.recall_type)
            .find(RecallType::is_recall)
            .unwrap_or_default()
    }

    /// The sentence this one is consecutive to.
    pub fn consecutive_to(&self) -> Option<Uuid> {
        self.details().and_then(|details| details.consecutive_to)
    }

    /// The track assigned by classification, if any.
    pub fn identification_track(&self) -> Option<SentenceIdentificationTrack> {
        match self {
            Sentence::Consecutive(chain) => chain.identification_track,
            _ => self.details().and_then(|details| details.identification_track),
        }
    }

    /// Assigns the identification track.
    pub fn set_identification_track(&mut self, track: SentenceIdentificationTrack) {
        match self {
            Sentence::Consecutive(chain) => chain.identification_track = Some(track),
            _ => {
                if let Some(details) = self.details_mut() {
                    details.identification_track = Some(track);
                }
            }
        }
    }

    /// Tracks of every single sentence in this sentence.
    pub fn component_tracks(&self) -> Vec<SentenceIdentificationTrack> {
        self.components()
            .iter()
            .filter_map(Sentence::identification_track)
            .collect()
    }

    /// Returns true for a chain of consecutive sentences.
    pub fn is_consecutive(&self) -> bool {
        matches!(self, Sentence::Consecutive(_))
    }
}
