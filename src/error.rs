//! Error types for the Release Date Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Legal ineligibility for a date is never an error: calculators simply omit
//! the date. Errors are reserved for configuration problems, input the engine
//! does not model, and broken invariants.

use thiserror::Error;

use crate::models::SentenceIdentificationTrack;

/// The main error type for the Release Date Calculation Engine.
///
/// # Example
///
/// ```
/// use release_date_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/hdced.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/hdced.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds values the engine cannot use.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong with the configuration.
        message: String,
    },

    /// No release point multiplier is configured for a track.
    #[error("No release point multiplier configured for track '{track}'")]
    MultiplierNotConfigured {
        /// The track without a multiplier.
        track: SentenceIdentificationTrack,
    },

    /// A booking document could not be parsed.
    #[error("Failed to parse booking: {message}")]
    BookingParseError {
        /// A description of the parse error.
        message: String,
    },

    /// The booking contains a sentence type or combination the engine does not model.
    #[error("Calculation not supported: {reason}")]
    UnsupportedCalculation {
        /// Why the calculation is not supported.
        reason: String,
    },

    /// An invariant of the calculation was broken; no result is produced.
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// A description of the broken invariant.
        message: String,
    },
}

impl EngineError {
    /// Returns true when the error means "this calculation is not supported"
    /// rather than a configuration or invariant failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, EngineError::UnsupportedCalculation { .. })
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        EngineError::UnsupportedCalculation {
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        EngineError::InvariantViolation {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/file.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/file.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_multiplier_not_configured_displays_track() {
        let error = EngineError::MultiplierNotConfigured {
            track: SentenceIdentificationTrack::SdsPlusRelease,
        };
        assert_eq!(
            error.to_string(),
            "No release point multiplier configured for track 'sds_plus_release'"
        );
    }

    #[test]
    fn test_unsupported_is_distinguished_from_invariant_violation() {
        let unsupported = EngineError::unsupported("offence before 2005-04-04");
        let invariant = EngineError::invariant("consecutive chain has no components");

        assert!(unsupported.is_unsupported());
        assert!(!invariant.is_unsupported());
        assert_eq!(
            unsupported.to_string(),
            "Calculation not supported: offence before 2005-04-04"
        );
        assert_eq!(
            invariant.to_string(),
            "Invariant violation: consecutive chain has no components"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_parse_error() -> EngineResult<()> {
            Err(EngineError::BookingParseError {
                message: "expected value".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_parse_error()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
