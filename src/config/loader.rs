//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine's
//! statutory configuration from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::SentenceIdentificationTrack;

use super::types::{
    BankHolidayCalendar, ClassificationThresholds, CommencementDates, EarlyReleaseConfiguration,
    EngineConfig, ErsedConfiguration, HdcedConfigFile, HdcedConfiguration,
    ReleasePointConfiguration, TusedConfiguration,
};

const ALL_TRACKS: [SentenceIdentificationTrack; 7] = [
    SentenceIdentificationTrack::SdsStandardRelease,
    SentenceIdentificationTrack::SdsEarlyRelease,
    SentenceIdentificationTrack::SdsPlusRelease,
    SentenceIdentificationTrack::EdsAutomaticRelease,
    SentenceIdentificationTrack::EdsDiscretionaryRelease,
    SentenceIdentificationTrack::Recall,
    SentenceIdentificationTrack::Botus,
];

/// Loads and validates engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// checks them for values the engine cannot work with before any booking
/// is calculated.
///
/// # Directory Structure
///
/// ```text
/// config/england_and_wales/
/// ├── release_points.yaml      # Release fractions by track
/// ├── hdced.yaml               # HDCED and HDCED4PLUS thresholds
/// ├── ersed.yaml               # Early removal scheme thresholds
/// ├── tused.yaml               # Top-up supervision thresholds
/// ├── early_release.yaml       # SDS early release tranches
/// ├── commencement_dates.yaml  # Statutory commencement dates
/// ├── classification.yaml      # SDS+ and EDS length thresholds
/// └── bank_holidays.yaml       # Bank holiday calendar
/// ```
///
/// # Example
///
/// ```no_run
/// use release_date_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/england_and_wales")?;
/// println!("Bank holidays for {}", loader.config().bank_holidays().division);
/// # Ok::<(), release_date_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any value fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let release_points =
            Self::load_yaml::<ReleasePointConfiguration>(&path.join("release_points.yaml"))?;
        let hdced = Self::load_yaml::<HdcedConfigFile>(&path.join("hdced.yaml"))?;
        let ersed = Self::load_yaml::<ErsedConfiguration>(&path.join("ersed.yaml"))?;
        let tused = Self::load_yaml::<TusedConfiguration>(&path.join("tused.yaml"))?;
        let early_release =
            Self::load_yaml::<EarlyReleaseConfiguration>(&path.join("early_release.yaml"))?;
        let commencement_dates =
            Self::load_yaml::<CommencementDates>(&path.join("commencement_dates.yaml"))?;
        let classification =
            Self::load_yaml::<ClassificationThresholds>(&path.join("classification.yaml"))?;
        let bank_holidays =
            Self::load_yaml::<BankHolidayCalendar>(&path.join("bank_holidays.yaml"))?;

        let config = EngineConfig::new(
            release_points,
            hdced,
            ersed,
            tused,
            early_release,
            commencement_dates,
            classification,
            bank_holidays,
        );
        Self::validate(&config)?;

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(config: &EngineConfig) -> EngineResult<()> {
        let release_points = config.release_points();
        for track in ALL_TRACKS {
            let multiplier = release_points
                .multipliers
                .get(&track)
                .ok_or(EngineError::MultiplierNotConfigured { track })?;
            Self::check_fraction(&format!("release point multiplier for {track}"), *multiplier)?;
        }
        for (track, multiplier) in &release_points.parole_eligibility_multipliers {
            Self::check_fraction(&format!("parole eligibility multiplier for {track}"), *multiplier)?;
        }

        Self::validate_hdced("hdced", config.hdced())?;
        Self::validate_hdced("hdced4plus", config.hdced4plus())?;

        let ersed = config.ersed();
        if ersed.minimum_custodial_fractions.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                message: "ersed has no minimum custodial fractions".to_string(),
            });
        }
        for entry in &ersed.minimum_custodial_fractions {
            Self::check_fraction(
                &format!("ersed fraction from {}", entry.effective_from),
                entry.fraction,
            )?;
        }

        let early_release = config.early_release();
        if early_release.tranche_one_commencement_date >= early_release.tranche_two_commencement_date
        {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "tranche one commencement {} must precede tranche two commencement {}",
                    early_release.tranche_one_commencement_date,
                    early_release.tranche_two_commencement_date
                ),
            });
        }

        Ok(())
    }

    fn validate_hdced(name: &str, hdced: &HdcedConfiguration) -> EngineResult<()> {
        if hdced.applicable_tracks.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                message: format!("{name} has no applicable tracks"),
            });
        }
        if hdced.minimum_custodial_period_days < 0 || hdced.minimum_eligibility_period_days < 0 {
            return Err(EngineError::InvalidConfiguration {
                message: format!("{name} minimum periods must not be negative"),
            });
        }
        if let (Some(minimum), Some(maximum)) = (
            hdced.minimum_sentence_length_years,
            hdced.maximum_sentence_length_years,
        ) && minimum >= maximum
        {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "{name} minimum sentence length {minimum} years must be below the maximum {maximum}"
                ),
            });
        }
        Ok(())
    }

    fn check_fraction(name: &str, value: Decimal) -> EngineResult<()> {
        if value <= Decimal::ZERO || value > Decimal::ONE {
            return Err(EngineError::InvalidConfiguration {
                message: format!("{name} must be in (0, 1], got {value}"),
            });
        }
        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}
