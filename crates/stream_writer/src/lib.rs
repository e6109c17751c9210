//! # Stream Writer
//!
//! Output stream management for the output stage.
//!
//! Responsibilities:
//! - Own the current writable file handle (open / commit / close)
//! - Register every collection with the persistence backend at open
//! - Commit all collection contents as one atomic event record, then clear
//! - Produce rotation file names

pub mod backends;
mod namer;
mod stream;

pub use backends::{create_writer, BincodeWriter, JsonLinesWriter};
pub use namer::SequentialNamer;
pub use stream::StreamManager;
