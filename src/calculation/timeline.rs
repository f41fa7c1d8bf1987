//! Ordering of calculation units.

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::Sentence;

/// One unit on the timeline, with its recall anchor when recalled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// The unit.
    pub sentence: Sentence,
    /// The return to custody date for a recalled unit.
    pub recall_anchor: Option<NaiveDate>,
}

/// Calculation units in sentencing order.
///
/// Units are ordered by sentencing date, then case and line sequence, so the
/// order never depends on how the booking listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Orders `units` and resolves recall anchors.
    ///
    /// # Errors
    ///
    /// - `UnsupportedCalculation` when a recalled unit's return to custody
    ///   date is before its sentencing date
    /// - `InvariantViolation` when a unit has no sentencing date
    pub fn build(units: Vec<Sentence>, return_to_custody: Option<NaiveDate>) -> EngineResult<Self> {
        let mut entries = Vec::with_capacity(units.len());
        for sentence in units {
            let sentenced_at = sentence
                .sentenced_at()
                .ok_or_else(|| EngineError::invariant("sentence has no sentencing date"))?;

            let recall_anchor = if sentence.recall_type().is_recall() {
                if let Some(returned) = return_to_custody
                    && returned < sentenced_at
                {
                    warn!(
                        identifier = ?sentence.identifier(),
                        %returned,
                        %sentenced_at,
                        "Return to custody before sentencing"
                    );
                    return Err(EngineError::unsupported(format!(
                        "return to custody on {returned} is before sentencing on {sentenced_at}"
                    )));
                }
                return_to_custody
            } else {
                None
            };
            entries.push(TimelineEntry {
                sentence,
                recall_anchor,
            });
        }

        entries.sort_by_key(|entry| (entry.sentence.sentenced_at(), entry.sentence.sequence()));
        Ok(Self { entries })
    }

    /// The entries in order.
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// The earliest unit sentencing date.
    pub fn earliest_sentenced_at(&self) -> Option<NaiveDate> {
        self.entries
            .first()
            .and_then(|entry| entry.sentence.sentenced_at())
    }

    /// The latest unit sentencing date.
    pub fn latest_sentenced_at(&self) -> Option<NaiveDate> {
        self.entries
            .iter()
            .filter_map(|entry| entry.sentence.sentenced_at())
            .max()
    }

    /// Consumes the timeline, returning the ordered entries.
    pub fn into_entries(self) -> Vec<TimelineEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Duration, EarlyReleaseExclusion, Offence, OffenceIndicators, RecallType, SentenceDetails,
        StandardSentence,
    };
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard(sentenced_at: NaiveDate, line: u32, recall_type: RecallType) -> Sentence {
        Sentence::Standard(StandardSentence {
            details: SentenceDetails {
                identifier: Uuid::new_v4(),
                case_sequence: 1,
                line_sequence: line,
                sentenced_at,
                offence: Offence {
                    committed_at: date(2019, 1, 1),
                    offence_code: "TH68010".to_string(),
                    indicators: OffenceIndicators::default(),
                },
                recall_type,
                consecutive_to: None,
                identification_track: None,
            },
            duration: Duration::years(1),
            is_sds_plus: false,
            is_section_250: false,
            early_release_exclusion: EarlyReleaseExclusion::None,
        })
    }

    #[test]
    fn test_orders_by_date_then_sequence() {
        let timeline = Timeline::build(
            vec![
                standard(date(2020, 6, 1), 1, RecallType::None),
                standard(date(2020, 1, 1), 2, RecallType::None),
                standard(date(2020, 1, 1), 1, RecallType::None),
            ],
            None,
        )
        .unwrap();

        let order: Vec<_> = timeline
            .entries()
            .iter()
            .map(|entry| (entry.sentence.sentenced_at().unwrap(), entry.sentence.sequence().1))
            .collect();
        assert_eq!(
            order,
            vec![
                (date(2020, 1, 1), 1),
                (date(2020, 1, 1), 2),
                (date(2020, 6, 1), 1),
            ]
        );
        assert_eq!(timeline.earliest_sentenced_at(), Some(date(2020, 1, 1)));
        assert_eq!(timeline.latest_sentenced_at(), Some(date(2020, 6, 1)));
    }

    #[test]
    fn test_recall_anchor_only_on_recalled_units() {
        let timeline = Timeline::build(
            vec![
                standard(date(2020, 1, 1), 1, RecallType::FixedTermRecall28),
                standard(date(2020, 1, 1), 2, RecallType::None),
            ],
            Some(date(2020, 9, 1)),
        )
        .unwrap();

        assert_eq!(timeline.entries()[0].recall_anchor, Some(date(2020, 9, 1)));
        assert_eq!(timeline.entries()[1].recall_anchor, None);
    }

    #[test]
    fn test_return_to_custody_before_sentencing_is_unsupported() {
        let result = Timeline::build(
            vec![standard(date(2020, 1, 1), 1, RecallType::StandardRecall)],
            Some(date(2019, 12, 1)),
        );
        assert!(result.is_err_and(|e| e.is_unsupported()));
    }
}
