//! # Timo
//!
//! Personal time-tracking reconciliation between an official attendance
//! system and a secondary timesheet system.
//!
//! ## Architecture
//!
//! - **models**: Durations, dates, day categories and snapshot records
//! - **reconcile**: Day-by-day comparison of the two sources
//! - **render**: Fixed-width terminal report
//! - **report**: Entry points tying store, engine and renderer together
//! - **storage**: Latest-snapshot repository (JSON files or in memory)
//! - **ingest**: Normalization and import of raw extractor output
//! - **config**: Configuration loading and validation

pub mod config;
pub mod ingest;
pub mod models;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod storage;

pub use models::*;
pub use report::{reconcile_and_render, LATEST_MONTH};
