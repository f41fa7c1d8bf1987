//! Closed enumerations describing what is dated, why, and under which regime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies what a calculated date represents.
///
/// # Example
///
/// ```
/// use release_date_engine::models::ReleaseDateType;
///
/// assert_eq!(ReleaseDateType::Hdced.to_string(), "HDCED");
/// let json = serde_json::to_string(&ReleaseDateType::Hdced4Plus).unwrap();
/// assert_eq!(json, "\"hdced4plus\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseDateType {
    /// Sentence and licence expiry date, when both coincide.
    Sled,
    /// Sentence expiry date.
    Sed,
    /// Licence expiry date.
    Led,
    /// Conditional release date.
    Crd,
    /// Automatic release date.
    Ard,
    /// Parole eligibility date.
    Ped,
    /// Home detention curfew eligibility date.
    Hdced,
    /// Home detention curfew eligibility date on the lower-fraction track.
    #[serde(rename = "hdced4plus")]
    Hdced4Plus,
    /// Early removal scheme eligibility date.
    Ersed,
    /// Top-up supervision expiry date.
    Tused,
    /// Post recall release date.
    Prrd,
    /// Effective sentence end date.
    Esed,
}

impl ReleaseDateType {
    /// Date types whose value depends on the early or standard release assumption.
    pub const EARLY_RELEASE_SENSITIVE: [ReleaseDateType; 7] = [
        ReleaseDateType::Crd,
        ReleaseDateType::Ard,
        ReleaseDateType::Ped,
        ReleaseDateType::Hdced,
        ReleaseDateType::Hdced4Plus,
        ReleaseDateType::Ersed,
        ReleaseDateType::Tused,
    ];

    /// Returns true when the merge of early and standard passes applies to this type.
    pub fn is_early_release_sensitive(&self) -> bool {
        Self::EARLY_RELEASE_SENSITIVE.contains(self)
    }
}

impl fmt::Display for ReleaseDateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReleaseDateType::Sled => "SLED",
            ReleaseDateType::Sed => "SED",
            ReleaseDateType::Led => "LED",
            ReleaseDateType::Crd => "CRD",
            ReleaseDateType::Ard => "ARD",
            ReleaseDateType::Ped => "PED",
            ReleaseDateType::Hdced => "HDCED",
            ReleaseDateType::Hdced4Plus => "HDCED4PLUS",
            ReleaseDateType::Ersed => "ERSED",
            ReleaseDateType::Tused => "TUSED",
            ReleaseDateType::Prrd => "PRRD",
            ReleaseDateType::Esed => "ESED",
        };
        write!(f, "{label}")
    }
}

/// Identifies why a value was produced.
///
/// Rules are audit output only. Nothing in the engine reads a recorded rule
/// back to decide what to calculate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationRule {
    /// Adjustments exhausted the custodial period; release on the sentence date.
    ImmediateRelease,
    /// HDCED at a quarter of the sentence, below the custodial midpoint.
    HdcedGeMinPeriodLtMidpoint,
    /// HDCED as a fixed deduction from the release date, at or above the midpoint.
    HdcedGeMidpointLtMaxPeriod,
    /// HDCED raised to the minimum custodial period after sentencing.
    HdcedMinimumCustodialPeriod,
    /// HDCED raised to the later release date of a concurrent sentence.
    HdcedAdjustedToConcurrentConditionalRelease,
    /// HDCED4PLUS at a quarter of the sentence, below the custodial midpoint.
    #[serde(rename = "hdced4plus_ge_min_period_lt_midpoint")]
    Hdced4PlusGeMinPeriodLtMidpoint,
    /// HDCED4PLUS as a fixed deduction from the release date.
    #[serde(rename = "hdced4plus_ge_midpoint_lt_max_period")]
    Hdced4PlusGeMidpointLtMaxPeriod,
    /// HDCED4PLUS raised to the minimum custodial period after sentencing.
    #[serde(rename = "hdced4plus_minimum_custodial_period")]
    Hdced4PlusMinimumCustodialPeriod,
    /// HDCED4PLUS raised to the later release date of a concurrent sentence.
    #[serde(rename = "hdced4plus_adjusted_to_concurrent_conditional_release")]
    Hdced4PlusAdjustedToConcurrentConditionalRelease,
    /// Eligibility shifted by the days served for a preceding BOTUS term.
    ConsecutiveToBotusExtraDays,
    /// ERSED at the maximum removal period before the release point.
    ErsedMaxPeriod,
    /// ERSED at the minimum custodial fraction of the release point.
    ErsedMinEffectiveDate,
    /// ERSED raised to the sentence date.
    ErsedAdjustedToSentenceDate,
    /// TUSED twelve months after release for sentences under two years.
    #[serde(rename = "tused_licence_period_lt_2y")]
    TusedLicencePeriodLt2y,
    /// TUSED moved off a weekend or bank holiday.
    TusedAdjustedToPreviousWorkingDay,
    /// PED raised to the later release date of a concurrent sentence.
    PedAdjustedToConcurrentConditionalRelease,
    /// Release a fixed number of days after return to custody.
    FixedTermRecall,
    /// Fixed-term recall release capped at licence expiry.
    PrrdCappedAtLicenceExpiry,
    /// Date held back to the commencement of the allocated early release tranche.
    SdsEarlyReleaseAdjustedToTrancheCommencement,
}

/// The release-fraction regime a sentence is calculated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceIdentificationTrack {
    /// Standard determinate sentence released at the standard fraction.
    SdsStandardRelease,
    /// Standard determinate sentence released under the early release scheme.
    SdsEarlyRelease,
    /// Enhanced SDS+ sentence released at the later fraction.
    SdsPlusRelease,
    /// Extended sentence with automatic release.
    EdsAutomaticRelease,
    /// Extended sentence with a parole eligibility point.
    EdsDiscretionaryRelease,
    /// A recalled sentence.
    Recall,
    /// Breach of top-up supervision committal, served in full.
    Botus,
}

impl SentenceIdentificationTrack {
    /// Returns true for the standard determinate sentence tracks.
    pub fn is_sds(&self) -> bool {
        matches!(
            self,
            SentenceIdentificationTrack::SdsStandardRelease
                | SentenceIdentificationTrack::SdsEarlyRelease
                | SentenceIdentificationTrack::SdsPlusRelease
        )
    }
}

impl fmt::Display for SentenceIdentificationTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentenceIdentificationTrack::SdsStandardRelease => "sds_standard_release",
            SentenceIdentificationTrack::SdsEarlyRelease => "sds_early_release",
            SentenceIdentificationTrack::SdsPlusRelease => "sds_plus_release",
            SentenceIdentificationTrack::EdsAutomaticRelease => "eds_automatic_release",
            SentenceIdentificationTrack::EdsDiscretionaryRelease => "eds_discretionary_release",
            SentenceIdentificationTrack::Recall => "recall",
            SentenceIdentificationTrack::Botus => "botus",
        };
        write!(f, "{name}")
    }
}

/// The policy commencement tranche that governs a booking's early release dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SdsEarlyReleaseTranche {
    /// No sentence in the booking is on the early release track.
    #[default]
    #[serde(rename = "tranche_0")]
    Tranche0,
    /// Early release from the first commencement date.
    #[serde(rename = "tranche_1")]
    Tranche1,
    /// Early release from the second commencement date.
    #[serde(rename = "tranche_2")]
    Tranche2,
}

impl fmt::Display for SdsEarlyReleaseTranche {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdsEarlyReleaseTranche::Tranche0 => write!(f, "tranche_0"),
            SdsEarlyReleaseTranche::Tranche1 => write!(f, "tranche_1"),
            SdsEarlyReleaseTranche::Tranche2 => write!(f, "tranche_2"),
        }
    }
}
