//! Release point classification.
//!
//! Assigns every sentence, and every component of a chain, to the legal
//! track that decides its release fraction. Classification looks only at the
//! sentence itself, the caller's inputs and configuration, so sentences can be
//! classified in any order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    CalculationUserInputs, Duration, EarlyReleaseExclusion, ExtendedDeterminateSentence,
    OffenceIndicators, Sentence, SentenceIdentificationTrack, StandardSentence, UserInputType,
};

/// Which early release assumption a calculation pass runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseAssumption {
    /// Eligible sentences are on the early track only once the scheme has
    /// commenced at their sentencing date.
    Standard,
    /// Every eligible sentence is forced onto the early track.
    Early,
}

/// Chain track precedence, highest first.
const CHAIN_PRECEDENCE: [SentenceIdentificationTrack; 7] = [
    SentenceIdentificationTrack::Recall,
    SentenceIdentificationTrack::SdsPlusRelease,
    SentenceIdentificationTrack::SdsStandardRelease,
    SentenceIdentificationTrack::EdsDiscretionaryRelease,
    SentenceIdentificationTrack::EdsAutomaticRelease,
    SentenceIdentificationTrack::SdsEarlyRelease,
    SentenceIdentificationTrack::Botus,
];

/// Sets the identification track on a sentence and each of its components.
///
/// # Errors
///
/// Returns `UnsupportedCalculation` for an offence committed before the
/// Criminal Justice Act 2003 commenced.
pub fn identify(
    sentence: &mut Sentence,
    inputs: &CalculationUserInputs,
    config: &EngineConfig,
    assumption: ReleaseAssumption,
) -> EngineResult<()> {
    for component in sentence.components_mut() {
        let track = identify_single(component, inputs, config, assumption)?;
        component.set_identification_track(track);
    }

    let component_tracks = sentence.component_tracks();
    let track = CHAIN_PRECEDENCE
        .into_iter()
        .find(|track| component_tracks.contains(track))
        .ok_or_else(|| EngineError::invariant("sentence has no classified components"))?;
    sentence.set_identification_track(track);

    debug!(
        identifier = ?sentence.identifier(),
        track = %track,
        assumption = ?assumption,
        "Identified sentence"
    );
    Ok(())
}

fn identify_single(
    sentence: &Sentence,
    inputs: &CalculationUserInputs,
    config: &EngineConfig,
    assumption: ReleaseAssumption,
) -> EngineResult<SentenceIdentificationTrack> {
    let details = sentence
        .details()
        .ok_or_else(|| EngineError::invariant("nested consecutive sentence in chain"))?;

    let cja_2003 = config.commencement_dates().cja_2003;
    if details.offence.committed_at < cja_2003 {
        return Err(EngineError::unsupported(format!(
            "offence {} committed on {} before {cja_2003}",
            details.offence.offence_code, details.offence.committed_at
        )));
    }

    if details.recall_type.is_recall() {
        return Ok(SentenceIdentificationTrack::Recall);
    }

    match sentence {
        Sentence::Botus(_) => Ok(SentenceIdentificationTrack::Botus),
        Sentence::ExtendedDeterminate(eds) => identify_extended(eds, config),
        Sentence::Standard(sds) => identify_standard(sds, inputs, config, assumption),
        Sentence::Consecutive(_) => Err(EngineError::invariant("nested consecutive sentence in chain")),
    }
}

fn identify_extended(
    eds: &ExtendedDeterminateSentence,
    config: &EngineConfig,
) -> EngineResult<SentenceIdentificationTrack> {
    let sentenced_at = eds.details.sentenced_at;
    let long_custodial = at_least_years(
        &eds.custodial_duration,
        sentenced_at,
        config.classification().eds_automatic_maximum_custodial_years,
    )?;
    let automatic = sentenced_at < config.commencement_dates().eds_discretionary
        && !long_custodial
        && !eds.details.offence.indicators.is_schedule_15_maximum_life;

    Ok(if automatic {
        SentenceIdentificationTrack::EdsAutomaticRelease
    } else {
        SentenceIdentificationTrack::EdsDiscretionaryRelease
    })
}

fn identify_standard(
    sds: &StandardSentence,
    inputs: &CalculationUserInputs,
    config: &EngineConfig,
    assumption: ReleaseAssumption,
) -> EngineResult<SentenceIdentificationTrack> {
    if is_sds_plus(sds, inputs, config)? {
        return Ok(SentenceIdentificationTrack::SdsPlusRelease);
    }

    let early_release = config.early_release();
    let on_early_track = is_early_release_eligible(sds, config)?
        && match assumption {
            ReleaseAssumption::Early => true,
            ReleaseAssumption::Standard => {
                sds.details.sentenced_at >= early_release.tranche_one_commencement_date
            }
        };

    Ok(if on_early_track {
        SentenceIdentificationTrack::SdsEarlyRelease
    } else {
        SentenceIdentificationTrack::SdsStandardRelease
    })
}

/// Decides whether a standard sentence is SDS+.
///
/// With `use_offence_indicators` the offence markers decide. Otherwise a
/// manual answer for the sentence decides for the list it names, and without
/// one the stored flag stands.
pub fn is_sds_plus(
    sds: &StandardSentence,
    inputs: &CalculationUserInputs,
    config: &EngineConfig,
) -> EngineResult<bool> {
    let offence = &sds.details.offence;
    let indicators = if inputs.use_offence_indicators {
        offence.indicators.clone()
    } else if let Some(input) =
        inputs.user_input_for(sds.details.line_sequence, &offence.offence_code)
    {
        let mut indicators = OffenceIndicators::default();
        match input.user_input_type {
            UserInputType::Original => indicators.is_schedule_15_maximum_life = input.user_choice,
            UserInputType::FourToUnderSeven => indicators.is_pcsc_sds = input.user_choice,
            UserInputType::Section250 => indicators.is_pcsc_sec250 = input.user_choice,
            UserInputType::Updated => indicators.is_pcsc_sds_plus = input.user_choice,
        }
        indicators
    } else {
        return Ok(sds.is_sds_plus);
    };

    let dates = config.commencement_dates();
    let thresholds = config.classification();
    let sentenced_at = sds.details.sentenced_at;
    let seven_plus = at_least_years(&sds.duration, sentenced_at, thresholds.sds_plus_minimum_years)?;
    let four_plus = at_least_years(
        &sds.duration,
        sentenced_at,
        thresholds.sds_plus_list_c_minimum_years,
    )?;
    let under_seven = !at_least_years(
        &sds.duration,
        sentenced_at,
        thresholds.sds_plus_list_c_maximum_years,
    )?;
    let after_pcsc = sentenced_at >= dates.pcsc;

    let list_a = sentenced_at >= dates.sds_plus
        && !after_pcsc
        && seven_plus
        && indicators.is_schedule_15_maximum_life;
    let list_b = after_pcsc && seven_plus && indicators.is_pcsc_sds_plus;
    let list_c = after_pcsc && four_plus && under_seven && indicators.is_pcsc_sds;
    let list_d = sds.is_section_250 && after_pcsc && seven_plus && indicators.is_pcsc_sec250;

    Ok(list_a || list_b || list_c || list_d)
}

/// Whether a standard sentence can be released under the SDS early release scheme.
///
/// Violent offences are only excluded for longer sentences; every other
/// exclusion category is absolute.
pub fn is_early_release_eligible(sds: &StandardSentence, config: &EngineConfig) -> EngineResult<bool> {
    if sds.details.recall_type.is_recall() {
        return Ok(false);
    }
    match sds.early_release_exclusion {
        EarlyReleaseExclusion::None => Ok(true),
        EarlyReleaseExclusion::Violent => Ok(!at_least_years(
            &sds.duration,
            sds.details.sentenced_at,
            config.early_release().violent_exclusion_threshold_years,
        )?),
        _ => Ok(false),
    }
}

/// Whether `duration` anchored at `anchor` is at least `years` long.
pub(crate) fn at_least_years(duration: &Duration, anchor: NaiveDate, years: u32) -> EngineResult<bool> {
    Ok(duration.end_date(anchor)? >= Duration::years(years).end_date(anchor)?)
}
