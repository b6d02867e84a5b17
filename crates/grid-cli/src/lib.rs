//! Library half of the `grid` binary: settings, logging and report tables.

pub mod config;
pub mod logging;
pub mod report;
