//! Release Date Calculation Engine for determinate sentences
//!
//! This crate calculates the release dates for a custodial booking in England
//! and Wales: sentence and licence expiry, conditional and automatic release,
//! parole, home detention curfew, early removal and top-up supervision
//! eligibility, and post recall release, with a breakdown of the rules behind
//! every date.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
