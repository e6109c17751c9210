//! Writer-side collaborator traits
//!
//! The stream manager drives these; the byte layout on disk is owned by the
//! `EventWriter` implementation, the file-name sequence by the `StreamNamer`.

use serde::{Deserialize, Serialize};

use crate::{Collection, CollectionKind, ContractError};

/// Non-owning snapshot of one collection, handed to the backend at commit
#[derive(Debug, Clone, Copy)]
pub struct CollectionView<'a> {
    /// Output collection name
    pub name: &'a str,

    /// Current contents
    pub data: &'a Collection,
}

/// Persistence collaborator
///
/// Lifecycle per file: construct -> `register_collection` for every output
/// collection -> `write_event` once per commit -> `finish`.
pub trait EventWriter: Send {
    /// Announce a collection that will appear in every event record
    fn register_collection(
        &mut self,
        name: &str,
        kind: CollectionKind,
    ) -> Result<(), ContractError>;

    /// Serialize the current contents of all collections as one atomic
    /// event record
    fn write_event(&mut self, event: &[CollectionView<'_>]) -> Result<(), ContractError>;

    /// Flush buffered metadata and release the file
    fn finish(&mut self) -> Result<(), ContractError>;
}

/// File-naming collaborator: supplies the next output file name on each
/// rotation. Treated as an opaque string producer.
pub trait StreamNamer: Send {
    fn next_file_name(&mut self) -> String;
}

/// On-disk encoding selected for the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriterFormat {
    /// One JSON object per line (human-inspectable)
    #[default]
    JsonLines,
    /// Bincode-framed binary records (compact)
    Bincode,
}

impl WriterFormat {
    /// Canonical file extension for the format
    pub fn extension(self) -> &'static str {
        match self {
            Self::JsonLines => "jsonl",
            Self::Bincode => "bin",
        }
    }
}
