//! Weekly task report engine.
//!
//! Reads task records from a table, keeps the finished and in-progress top-level tasks
//! whose finish week falls in a requested range, groups them by tag, and renders a
//! numbered plain-text report.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
