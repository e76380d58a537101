//! Detection of vacuum events in four-channel weight sensor telemetry.
//!
//! A recording is zero-referenced and spike-corrected per channel, scanned
//! with a sliding FFT for dominant sinusoids, and the per-channel detections
//! are correlated across sensor pairs into vacuum events.

pub mod args;
pub mod batch;
pub mod chart;
pub mod config;
pub mod detect;
pub mod detector;
pub mod error;
pub mod report;
pub mod sweep;
pub mod telemetry;
pub mod types;
pub mod util;
