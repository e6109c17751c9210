//! BincodeWriter - compact binary frames
//!
//! Same framing as the JSON-lines backend, encoded with bincode: one
//! metadata record followed by one event record per commit. Each event
//! record is a vector of (collection name, collection contents) pairs in
//! registration order.

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::debug;

use contracts::{
    CollectionDescriptor, CollectionKind, CollectionView, ContractError, EventWriter,
};

use super::FileMeta;

/// Persistence backend writing bincode-framed binary records
pub struct BincodeWriter {
    file_name: String,
    out: BufWriter<File>,
    meta: FileMeta,
    meta_written: bool,
}

impl BincodeWriter {
    /// Create the output file, truncating any previous content
    pub fn create(file_name: &str) -> Result<Self, ContractError> {
        let file = File::create(file_name)?;
        Ok(Self {
            file_name: file_name.to_string(),
            out: BufWriter::new(file),
            meta: FileMeta::stamped(),
            meta_written: false,
        })
    }

    fn ensure_meta(&mut self) -> Result<(), ContractError> {
        if !self.meta_written {
            bincode::serialize_into(&mut self.out, &self.meta)
                .map_err(|e| ContractError::backend(format!("metadata encode error: {e}")))?;
            self.meta_written = true;
        }
        Ok(())
    }
}

impl EventWriter for BincodeWriter {
    fn register_collection(
        &mut self,
        name: &str,
        kind: CollectionKind,
    ) -> Result<(), ContractError> {
        if self.meta_written {
            return Err(ContractError::backend(
                "collections must be registered before the first event",
            ));
        }
        self.meta
            .collections
            .push(CollectionDescriptor::new(name, kind));
        debug!(file = %self.file_name, collection = name, kind = kind.type_name(), "registered for write");
        Ok(())
    }

    fn write_event(&mut self, event: &[CollectionView<'_>]) -> Result<(), ContractError> {
        self.ensure_meta()?;

        let record: Vec<(&str, &contracts::Collection)> =
            event.iter().map(|view| (view.name, view.data)).collect();
        bincode::serialize_into(&mut self.out, &record)
            .map_err(|e| ContractError::backend(format!("event encode error: {e}")))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ContractError> {
        self.ensure_meta()?;
        self.out.flush()?;
        Ok(())
    }
}
