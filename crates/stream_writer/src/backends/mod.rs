//! Persistence backends
//!
//! Each backend owns the byte layout of one output file: a file metadata
//! record followed by one record per committed event.

mod bincode_writer;
mod json_lines;

pub use bincode_writer::BincodeWriter;
pub use json_lines::JsonLinesWriter;

use serde::{Deserialize, Serialize};

use contracts::{CollectionDescriptor, ContractError, EventWriter, WriterFormat};

/// File metadata written ahead of the first event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMeta {
    /// Creation timestamp (RFC 3339)
    pub created_at: String,

    /// Collections registered for writing into this file
    pub collections: Vec<CollectionDescriptor>,
}

impl FileMeta {
    pub(crate) fn stamped() -> Self {
        Self {
            created_at: chrono::Utc::now().to_rfc3339(),
            collections: Vec::new(),
        }
    }
}

/// Create the backend for the given format, bound to `file_name`
pub fn create_writer(
    format: WriterFormat,
    file_name: &str,
) -> Result<Box<dyn EventWriter>, ContractError> {
    match format {
        WriterFormat::JsonLines => Ok(Box::new(JsonLinesWriter::create(file_name)?)),
        WriterFormat::Bincode => Ok(Box::new(BincodeWriter::create(file_name)?)),
    }
}
