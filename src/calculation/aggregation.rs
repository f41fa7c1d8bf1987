//! Consecutive chain assembly and aggregation.
//!
//! Sentences served back to back are calculated as a single unit. This module
//! assembles those units from the flat booking list by following
//! `consecutive_to` links, and measures a unit by anchoring each component at
//! the running end date of the one before it.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{ConsecutiveSentence, Sentence, SentenceIdentificationTrack, plus_days};

/// One component of an aggregated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatePart {
    /// The component's identifier.
    pub identifier: Uuid,
    /// The date the component starts being served.
    pub start: NaiveDate,
    /// Days from start to expiry of the component.
    pub days: i64,
    /// Days from start to the end of the custodial term (equal to `days` except
    /// for extended sentences).
    pub custodial_days: i64,
    /// The component's track, once classified.
    pub track: Option<SentenceIdentificationTrack>,
}

/// The measured length of a calculation unit.
///
/// # Example
///
/// ```
/// use release_date_engine::calculation::aggregate;
/// use release_date_engine::models::Sentence;
///
/// let chain: Sentence = serde_json::from_str(r#"{
///     "type": "consecutive",
///     "components": [
///         { "type": "standard", "identifier": "00000000-0000-0000-0000-000000000001",
///           "case_sequence": 1, "line_sequence": 1, "sentenced_at": "2024-03-15",
///           "offence": { "committed_at": "2024-01-01", "offence_code": "TH68010" },
///           "duration": { "months": 1 } },
///         { "type": "standard", "identifier": "00000000-0000-0000-0000-000000000002",
///           "case_sequence": 1, "line_sequence": 2, "sentenced_at": "2024-03-15",
///           "offence": { "committed_at": "2024-01-01", "offence_code": "TH68010" },
///           "duration": { "months": 1 } }
///     ]
/// }"#).unwrap();
///
/// // 15 March -> 15 April -> 15 May
/// assert_eq!(aggregate(&chain).unwrap().total_days, 61);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAggregate {
    /// The unit's sentencing date; the earliest component sentencing date.
    pub sentenced_at: NaiveDate,
    /// Total days from sentencing to expiry of the last component.
    pub total_days: i64,
    /// The components in service order.
    pub parts: Vec<AggregatePart>,
}

impl ChainAggregate {
    /// Days of BOTUS terms served before the first SDS component.
    pub fn botus_days_before_sds(&self) -> i64 {
        let first_sds = self
            .parts
            .iter()
            .position(|part| part.track.is_some_and(|track| track.is_sds()));
        match first_sds {
            Some(index) => self.parts[..index]
                .iter()
                .filter(|part| part.track == Some(SentenceIdentificationTrack::Botus))
                .map(|part| part.days)
                .sum(),
            None => 0,
        }
    }
}

/// Days from `anchor` to expiry of a single sentence.
pub fn sentence_length_days(sentence: &Sentence, anchor: NaiveDate) -> EngineResult<i64> {
    match sentence {
        Sentence::Standard(s) => s.duration.length_in_days(anchor),
        Sentence::Botus(s) => s.duration.length_in_days(anchor),
        Sentence::ExtendedDeterminate(s) => {
            let custodial_end = s.custodial_duration.end_date(anchor)?;
            let expiry = s.extension_duration.end_date(custodial_end)?;
            Ok((expiry - anchor).num_days())
        }
        Sentence::Consecutive(_) => Ok(aggregate(sentence)?.total_days),
    }
}

/// Days from `anchor` to the end of a single sentence's custodial term.
pub fn custodial_length_days(sentence: &Sentence, anchor: NaiveDate) -> EngineResult<i64> {
    match sentence {
        Sentence::ExtendedDeterminate(s) => s.custodial_duration.length_in_days(anchor),
        _ => sentence_length_days(sentence, anchor),
    }
}

/// Measures a calculation unit.
///
/// The first component is anchored at the unit's sentencing date and each
/// later component at the running end date of the previous one. A single
/// sentence is measured as a unit of one.
///
/// # Errors
///
/// Returns `InvariantViolation` for a chain with no components.
pub fn aggregate(unit: &Sentence) -> EngineResult<ChainAggregate> {
    let components = unit.components();
    if components.is_empty() {
        return Err(EngineError::invariant("consecutive sentence has no components"));
    }
    let sentenced_at = unit
        .sentenced_at()
        .ok_or_else(|| EngineError::invariant("sentence has no sentencing date"))?;

    let mut running = sentenced_at;
    let mut parts = Vec::with_capacity(components.len());
    for component in components {
        let details = component
            .details()
            .ok_or_else(|| EngineError::invariant("nested consecutive sentence in chain"))?;
        let days = sentence_length_days(component, running)?;
        let custodial_days = custodial_length_days(component, running)?;
        parts.push(AggregatePart {
            identifier: details.identifier,
            start: running,
            days,
            custodial_days,
            track: details.identification_track,
        });
        running = plus_days(running, days)?;
    }

    Ok(ChainAggregate {
        sentenced_at,
        total_days: (running - sentenced_at).num_days(),
        parts,
    })
}

/// Rejects chains the engine does not model.
///
/// Extended sentences cannot be chained, and a chain must be wholly recalled
/// or wholly not recalled.
pub fn ensure_supported_chain(unit: &Sentence) -> EngineResult<()> {
    if !unit.is_consecutive() {
        return Ok(());
    }
    let components = unit.components();
    if components.is_empty() {
        return Err(EngineError::invariant("consecutive sentence has no components"));
    }
    if components
        .iter()
        .any(|c| matches!(c, Sentence::ExtendedDeterminate(_)))
    {
        return Err(EngineError::unsupported(
            "extended determinate sentences in a consecutive chain",
        ));
    }
    let recalled = components
        .iter()
        .filter(|c| c.recall_type().is_recall())
        .count();
    if recalled != 0 && recalled != components.len() {
        return Err(EngineError::unsupported(
            "consecutive chain mixes recalled and non-recalled sentences",
        ));
    }
    Ok(())
}

/// Builds calculation units from the flat booking list.
///
/// A sentence with no `consecutive_to` starts a chain. Every path from a
/// chain start to a sentence with no successor becomes one
/// [`ConsecutiveSentence`]; a parent followed by two children therefore yields
/// two chains. A sentence with neither parent nor successor stays standalone.
/// Sentences supplied already as chains pass through.
///
/// # Errors
///
/// - `InvariantViolation` when a `consecutive_to` names an unknown sentence or
///   the links form a cycle
/// - `UnsupportedCalculation` for chains [`ensure_supported_chain`] rejects
pub fn combine_consecutive_sentences(sentences: &[Sentence]) -> EngineResult<Vec<Sentence>> {
    let mut units = Vec::new();
    let mut singles: Vec<&Sentence> = Vec::new();
    for sentence in sentences {
        if sentence.is_consecutive() {
            ensure_supported_chain(sentence)?;
            units.push(sentence.clone());
        } else {
            singles.push(sentence);
        }
    }

    let mut by_id: HashMap<Uuid, &Sentence> = HashMap::with_capacity(singles.len());
    for sentence in &singles {
        if let Some(id) = sentence.identifier()
            && by_id.insert(id, *sentence).is_some()
        {
            return Err(EngineError::invariant(format!("duplicate sentence identifier {id}")));
        }
    }

    let mut children: HashMap<Uuid, Vec<&Sentence>> = HashMap::new();
    let mut roots = Vec::new();
    for sentence in &singles {
        match sentence.consecutive_to() {
            Some(parent) => {
                if !by_id.contains_key(&parent) {
                    return Err(EngineError::invariant(format!(
                        "sentence is consecutive to unknown sentence {parent}"
                    )));
                }
                children.entry(parent).or_default().push(*sentence);
            }
            None => roots.push(*sentence),
        }
    }
    for successors in children.values_mut() {
        successors.sort_by_key(|s| (s.sentenced_at(), s.sequence()));
    }

    let mut visited = HashSet::new();
    for root in roots {
        let mut path = Vec::new();
        collect_paths(root, &children, &mut path, &mut visited, &mut units)?;
    }

    if visited.len() < by_id.len() {
        return Err(EngineError::invariant(
            "consecutive sentence links form a cycle",
        ));
    }

    debug!(
        sentences = sentences.len(),
        units = units.len(),
        "Combined consecutive sentences"
    );
    Ok(units)
}

fn collect_paths<'a>(
    sentence: &'a Sentence,
    children: &HashMap<Uuid, Vec<&'a Sentence>>,
    path: &mut Vec<&'a Sentence>,
    visited: &mut HashSet<Uuid>,
    units: &mut Vec<Sentence>,
) -> EngineResult<()> {
    let id = sentence
        .identifier()
        .ok_or_else(|| EngineError::invariant("sentence has no identifier"))?;
    if path.iter().any(|s| s.identifier() == Some(id)) {
        return Err(EngineError::invariant(
            "consecutive sentence links form a cycle",
        ));
    }
    visited.insert(id);
    path.push(sentence);

    match children.get(&id) {
        Some(successors) if !successors.is_empty() => {
            for successor in successors {
                collect_paths(*successor, children, path, visited, units)?;
            }
        }
        _ => {
            let unit = if path.len() == 1 {
                sentence.clone()
            } else {
                Sentence::Consecutive(ConsecutiveSentence {
                    components: path.iter().map(|s| (*s).clone()).collect(),
                    identification_track: None,
                })
            };
            ensure_supported_chain(&unit)?;
            units.push(unit);
        }
    }

    path.pop();
    Ok(())
}
