//! Booking, offender and user input models.
//!
//! A [`Booking`] is the engine's only input document. It is produced by an
//! external mapping step from source records; the engine reads it and never
//! changes it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{Adjustments, Sentence};

/// The person a booking belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offender {
    /// The offender's reference number.
    pub reference: String,
    /// Date of birth, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Whether the offender is subject to sex offender registration.
    #[serde(default)]
    pub is_active_sex_offender: bool,
}

impl Offender {
    /// The offender's age in whole years on `date`, when the date of birth is known.
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        if date < dob {
            return Some(0);
        }
        let mut age = date.year() - dob.year();
        if (date.month(), date.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

/// Sentences and adjustments for one period in custody.
///
/// # Example
///
/// ```
/// use release_date_engine::models::Booking;
///
/// let booking = Booking::from_json(r#"{
///     "booking_id": 12345,
///     "offender": { "reference": "A1234BC" },
///     "sentences": []
/// }"#).unwrap();
/// assert_eq!(booking.booking_id, 12345);
/// assert!(booking.adjustments.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// The booking identifier from the source system.
    pub booking_id: i64,
    /// The offender.
    pub offender: Offender,
    /// Sentences as recorded; consecutive links are resolved by the engine.
    pub sentences: Vec<Sentence>,
    /// Adjustments recorded against the booking or its sentences.
    #[serde(default)]
    pub adjustments: Adjustments,
    /// The date the offender was returned to custody after recall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to_custody_date: Option<NaiveDate>,
}

impl Booking {
    /// Parses a booking from its JSON representation.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::BookingParseError {
            message: e.to_string(),
        })
    }
}

/// The SDS+ list a manual user answer refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInputType {
    /// Schedule 15 maximum life offence, sentenced between SDS+ and PCSC commencement.
    Original,
    /// PCSC list for sentences of 4 to under 7 years.
    FourToUnderSeven,
    /// PCSC list for section 250 sentences.
    Section250,
    /// PCSC list for sentences of 7 years or more.
    Updated,
}

/// A manual answer for a sentence whose offence markers are ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceUserInput {
    /// Line sequence of the sentence.
    pub sentence_sequence: u32,
    /// Offence code of the sentence.
    pub offence_code: String,
    /// Which list the answer is for.
    pub user_input_type: UserInputType,
    /// Whether the offence is on that list.
    pub user_choice: bool,
}

/// Options supplied by the caller for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationUserInputs {
    /// Decide SDS+ from offence indicators rather than stored flags or user answers.
    pub use_offence_indicators: bool,
    /// Whether to calculate the early removal scheme eligibility date.
    pub calculate_ersed: bool,
    /// Per-sentence manual answers.
    pub sentence_calculation_user_inputs: Vec<SentenceUserInput>,
}

impl CalculationUserInputs {
    /// Finds the manual answer for a sentence, if one was given.
    pub fn user_input_for(&self, line_sequence: u32, offence_code: &str) -> Option<&SentenceUserInput> {
        self.sentence_calculation_user_inputs
            .iter()
            .find(|input| input.sentence_sequence == line_sequence && input.offence_code == offence_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_before_and_after_birthday() {
        let offender = Offender {
            reference: "A1234BC".to_string(),
            date_of_birth: Some(date(2002, 6, 15)),
            is_active_sex_offender: false,
        };

        assert_eq!(offender.age_on(date(2020, 6, 14)), Some(17));
        assert_eq!(offender.age_on(date(2020, 6, 15)), Some(18));
    }

    #[test]
    fn test_age_unknown_without_date_of_birth() {
        let offender = Offender {
            reference: "A1234BC".to_string(),
            date_of_birth: None,
            is_active_sex_offender: false,
        };
        assert_eq!(offender.age_on(date(2020, 1, 1)), None);
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        let result = Booking::from_json("{ not json");
        match result {
            Err(EngineError::BookingParseError { message }) => assert!(!message.is_empty()),
            other => panic!("Expected BookingParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_duration_is_rejected_at_parse() {
        let json = r#"{
            "booking_id": 1,
            "offender": { "reference": "A1234BC" },
            "sentences": [{
                "type": "standard",
                "identifier": "3f1c1a52-3c1e-4b7e-9a35-0a1b2c3d4e5f",
                "case_sequence": 1,
                "line_sequence": 1,
                "sentenced_at": "2020-01-01",
                "offence": { "committed_at": "2019-12-01", "offence_code": "TH68010" },
                "duration": { "days": -5 }
            }]
        }"#;
        assert!(matches!(
            Booking::from_json(json),
            Err(EngineError::BookingParseError { .. })
        ));
    }

    #[test]
    fn test_user_input_lookup_matches_sequence_and_offence() {
        let inputs = CalculationUserInputs {
            use_offence_indicators: false,
            calculate_ersed: false,
            sentence_calculation_user_inputs: vec![SentenceUserInput {
                sentence_sequence: 2,
                offence_code: "SX03001".to_string(),
                user_input_type: UserInputType::FourToUnderSeven,
                user_choice: true,
            }],
        };

        assert!(inputs.user_input_for(2, "SX03001").is_some());
        assert!(inputs.user_input_for(1, "SX03001").is_none());
        assert!(inputs.user_input_for(2, "TH68010").is_none());
    }

    #[test]
    fn test_user_inputs_default_from_empty_json() {
        let inputs: CalculationUserInputs = serde_json::from_str("{}").unwrap();
        assert_eq!(inputs, CalculationUserInputs::default());
    }
}
