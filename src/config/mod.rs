//! Configuration loading and management for the Release Date Calculation Engine.
//!
//! This module loads the statutory configuration from YAML files: release
//! fractions, eligibility thresholds, commencement dates and the bank
//! holiday calendar.
//!
//! # Example
//!
//! ```no_run
//! use release_date_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/england_and_wales").unwrap();
//! println!("HDCED midpoint: {} days", config.config().hdced().custodial_period_mid_point_days);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BankHolidayCalendar, ClassificationThresholds, CommencementDates, EarlyReleaseConfiguration,
    EffectiveFraction, EngineConfig, ErsedConfiguration, HdcedConfigFile, HdcedConfiguration,
    ReleasePointConfiguration, TusedConfiguration,
};
