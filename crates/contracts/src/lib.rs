//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Event Model
//! - One event = the contents of every output collection between two commits
//! - Collections are created once per run and cleared (not destroyed) after every commit
//! - `event_number` is assigned by the surrounding framework, not by this stage

mod blueprint;
mod collection;
mod entries;
mod error;
mod predicate;
mod records;
mod stage;
mod summary;
mod writer;

pub use blueprint::*;
pub use collection::*;
pub use entries::*;
pub use error::*;
pub use predicate::DepositPredicate;
pub use records::*;
pub use stage::*;
pub use summary::CommitSummary;
pub use writer::*;
