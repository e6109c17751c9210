//! # Event Store
//!
//! Collection registry for the output stage.
//!
//! Responsibilities:
//! - Create every output collection exactly once per run
//! - Hand out handles for append access during conversion
//! - Clear all collections in place after a committed event

mod registry;

pub use registry::{CollectionHandle, CollectionId, CollectionRegistry};
