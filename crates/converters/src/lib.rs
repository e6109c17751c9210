//! # Converters
//!
//! Record conversion for the output stage.
//!
//! Responsibilities:
//! - Dispatch each incoming work item to the converter for its variant
//! - Translate upstream records into output collection entries
//! - Apply the caller-supplied deposit predicate
//! - Derive the tracker-hit position covariance from configured resolutions

mod converter;

pub use converter::{PointResolution, RecordConverter};
