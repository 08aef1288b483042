//! Geographic qualification of sales prospects.
//!
//! The decision logic lives in [`workflows::qualification`]: a region resolver and a
//! qualification evaluator over read-only region and preference data. Everything else in
//! the crate loads that data, ingests prospect rows, and persists verdicts.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
