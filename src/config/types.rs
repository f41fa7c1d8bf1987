//! Configuration types for release date calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Statutory thresholds live
//! here rather than in the algorithms because they change with policy and
//! are added to over time.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{SdsEarlyReleaseTranche, SentenceIdentificationTrack};

/// Release fractions by track, from `release_points.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleasePointConfiguration {
    /// Fraction of the sentence served before the determinate release point.
    pub multipliers: BTreeMap<SentenceIdentificationTrack, Decimal>,
    /// Fraction of the custodial term served before parole eligibility.
    #[serde(default)]
    pub parole_eligibility_multipliers: BTreeMap<SentenceIdentificationTrack, Decimal>,
    /// Sentences at least this long are released on licence regardless of offence date.
    pub licence_threshold_months: u32,
}

/// Thresholds for one home detention curfew eligibility variant.
///
/// HDCED and HDCED4PLUS share the algorithm and differ only in these values.
#[derive(Debug, Clone, Deserialize)]
pub struct HdcedConfiguration {
    /// Tracks every non-BOTUS component must be on.
    pub applicable_tracks: Vec<SentenceIdentificationTrack>,
    /// Shortest sentence, in days, that can carry the date.
    pub minimum_sentence_length_days: i64,
    /// Sentences shorter than this many years never carry the date.
    #[serde(default)]
    pub minimum_sentence_length_years: Option<u32>,
    /// Sentences this long or longer never carry the date. No maximum when absent.
    #[serde(default)]
    pub maximum_sentence_length_years: Option<u32>,
    /// Floor on the quarter-of-sentence period below the midpoint.
    pub minimum_eligibility_period_days: i64,
    /// Days that must be served after sentencing before the date.
    pub minimum_custodial_period_days: i64,
    /// Custodial days at which the calculation switches to the fixed deduction.
    pub custodial_period_mid_point_days: i64,
    /// Days taken off the release date at or above the midpoint.
    pub deduction_days: i64,
    /// Whether an SDS+ component anywhere in the chain rules the date out.
    #[serde(default)]
    pub excludes_sds_plus_chains: bool,
}

/// The `hdced.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct HdcedConfigFile {
    /// Standard HDCED thresholds.
    pub hdced: HdcedConfiguration,
    /// HDCED4PLUS thresholds.
    pub hdced4plus: HdcedConfiguration,
}

/// A fraction that applies to sentences passed on or after a date.
#[derive(Debug, Clone, Deserialize)]
pub struct EffectiveFraction {
    /// First sentencing date the fraction applies to.
    pub effective_from: NaiveDate,
    /// The fraction.
    pub fraction: Decimal,
}

/// Early removal scheme thresholds, from `ersed.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErsedConfiguration {
    /// Longest removal period before the release point, in days.
    pub max_period_days: i64,
    /// Minimum custodial fractions by sentencing date (sorted oldest first on load).
    pub minimum_custodial_fractions: Vec<EffectiveFraction>,
}

impl ErsedConfiguration {
    /// The minimum custodial fraction for a sentence passed on `sentenced_at`.
    ///
    /// Finds the most recent entry effective on or before the date.
    pub fn minimum_fraction_on(&self, sentenced_at: NaiveDate) -> Option<Decimal> {
        self.minimum_custodial_fractions
            .iter()
            .rfind(|entry| entry.effective_from <= sentenced_at)
            .map(|entry| entry.fraction)
    }
}

/// Top-up supervision thresholds, from `tused.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TusedConfiguration {
    /// Length of top-up supervision after release, in months.
    pub supervision_period_months: u32,
    /// Sentences must be longer than this many days.
    pub minimum_sentence_length_days: i64,
    /// Sentences must be shorter than this many years.
    pub maximum_sentence_length_years: u32,
    /// Offenders younger than this at release get no top-up supervision.
    pub minimum_age_at_release_years: u32,
}

/// SDS early release scheme settings, from `early_release.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EarlyReleaseConfiguration {
    /// First commencement date of the scheme.
    pub tranche_one_commencement_date: NaiveDate,
    /// Second commencement date of the scheme.
    pub tranche_two_commencement_date: NaiveDate,
    /// Bookings whose longest early release unit is this long or longer fall in tranche two.
    pub tranche_two_threshold_years: u32,
    /// Violent offences are excluded from the scheme for sentences this long or longer.
    pub violent_exclusion_threshold_years: u32,
}

impl EarlyReleaseConfiguration {
    /// The commencement date governing a tranche. Tranche zero has none.
    pub fn commencement_for(&self, tranche: SdsEarlyReleaseTranche) -> Option<NaiveDate> {
        match tranche {
            SdsEarlyReleaseTranche::Tranche0 => None,
            SdsEarlyReleaseTranche::Tranche1 => Some(self.tranche_one_commencement_date),
            SdsEarlyReleaseTranche::Tranche2 => Some(self.tranche_two_commencement_date),
        }
    }
}

/// Statutory commencement dates, from `commencement_dates.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommencementDates {
    /// Criminal Justice Act 2003. Earlier offences are not supported.
    pub cja_2003: NaiveDate,
    /// Offender Rehabilitation Act 2014 (licence and top-up supervision for short sentences).
    pub ora: NaiveDate,
    /// Extended sentences passed on or after this date have discretionary release.
    pub eds_discretionary: NaiveDate,
    /// SDS+ release at two thirds.
    pub sds_plus: NaiveDate,
    /// Policing, Crime, Sentencing and Courts Act 2022.
    pub pcsc: NaiveDate,
}

/// Sentence length thresholds used by classification, from `classification.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationThresholds {
    /// SDS+ lists A, B and D apply from this length.
    pub sds_plus_minimum_years: u32,
    /// SDS+ list C applies from this length...
    pub sds_plus_list_c_minimum_years: u32,
    /// ...up to, but not including, this length.
    pub sds_plus_list_c_maximum_years: u32,
    /// Extended sentences with a custodial term this long or longer are discretionary.
    pub eds_automatic_maximum_custodial_years: u32,
}

/// A bank holiday calendar, from `bank_holidays.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BankHolidayCalendar {
    /// The jurisdiction the calendar covers.
    pub division: String,
    /// Bank holiday dates.
    pub dates: BTreeSet<NaiveDate>,
}

/// The complete engine configuration loaded from YAML files.
///
/// This struct aggregates all configuration loaded from the various YAML
/// files in a configuration directory. It is immutable once loaded.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    release_points: ReleasePointConfiguration,
    hdced: HdcedConfiguration,
    hdced4plus: HdcedConfiguration,
    ersed: ErsedConfiguration,
    tused: TusedConfiguration,
    early_release: EarlyReleaseConfiguration,
    commencement_dates: CommencementDates,
    classification: ClassificationThresholds,
    bank_holidays: BankHolidayCalendar,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        release_points: ReleasePointConfiguration,
        hdced: HdcedConfigFile,
        ersed: ErsedConfiguration,
        tused: TusedConfiguration,
        early_release: EarlyReleaseConfiguration,
        commencement_dates: CommencementDates,
        classification: ClassificationThresholds,
        bank_holidays: BankHolidayCalendar,
    ) -> Self {
        let mut ersed = ersed;
        ersed
            .minimum_custodial_fractions
            .sort_by(|a, b| a.effective_from.cmp(&b.effective_from));
        Self {
            release_points,
            hdced: hdced.hdced,
            hdced4plus: hdced.hdced4plus,
            ersed,
            tused,
            early_release,
            commencement_dates,
            classification,
            bank_holidays,
        }
    }

    /// Returns the release point configuration.
    pub fn release_points(&self) -> &ReleasePointConfiguration {
        &self.release_points
    }

    /// Returns the HDCED thresholds.
    pub fn hdced(&self) -> &HdcedConfiguration {
        &self.hdced
    }

    /// Returns the HDCED4PLUS thresholds.
    pub fn hdced4plus(&self) -> &HdcedConfiguration {
        &self.hdced4plus
    }

    /// Returns the ERSED thresholds.
    pub fn ersed(&self) -> &ErsedConfiguration {
        &self.ersed
    }

    /// Returns the TUSED thresholds.
    pub fn tused(&self) -> &TusedConfiguration {
        &self.tused
    }

    /// Returns the early release scheme settings.
    pub fn early_release(&self) -> &EarlyReleaseConfiguration {
        &self.early_release
    }

    /// Returns the statutory commencement dates.
    pub fn commencement_dates(&self) -> &CommencementDates {
        &self.commencement_dates
    }

    /// Returns the classification thresholds.
    pub fn classification(&self) -> &ClassificationThresholds {
        &self.classification
    }

    /// Returns the bank holiday calendar.
    pub fn bank_holidays(&self) -> &BankHolidayCalendar {
        &self.bank_holidays
    }
}
