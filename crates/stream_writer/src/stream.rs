//! StreamManager - open/commit/close state machine for the output file
//!
//! States: CLOSED, OPEN. Collections are cleared only after a successful
//! commit; a failed commit leaves them populated so the error surfaces with
//! the event data still intact.

use tracing::{info, instrument};

use contracts::{CollectionView, CommitSummary, ContractError, EventWriter, WriterFormat};
use event_store::CollectionRegistry;

use crate::backends::create_writer;

/// Owner of the current writable output file
pub struct StreamManager {
    format: WriterFormat,
    writer: Option<Box<dyn EventWriter>>,
    file_name: Option<String>,
    events_in_file: u64,
}

impl StreamManager {
    /// Create a closed stream manager for the given encoding
    pub fn new(format: WriterFormat) -> Self {
        Self {
            format,
            writer: None,
            file_name: None,
            events_in_file: 0,
        }
    }

    /// Whether a stream is currently open
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Name of the currently open file
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Events committed to the current file
    pub fn events_in_file(&self) -> u64 {
        self.events_in_file
    }

    /// Open a new output stream, closing the current one first if needed
    ///
    /// Registers every existing collection for writing into this file, so
    /// collection creation must be complete before the first open.
    #[instrument(name = "stream_open", skip(self, registry), fields(file = %file_name))]
    pub fn open(
        &mut self,
        file_name: &str,
        registry: &CollectionRegistry,
    ) -> Result<(), ContractError> {
        if self.writer.is_some() {
            self.close()?;
        }

        let mut writer = create_writer(self.format, file_name)?;
        for (name, _, collection) in registry.iter() {
            writer.register_collection(name, collection.kind())?;
        }

        info!(
            file = %file_name,
            collections = registry.len(),
            "opened output stream"
        );
        self.writer = Some(writer);
        self.file_name = Some(file_name.to_string());
        self.events_in_file = 0;
        Ok(())
    }

    /// Commit the current contents of every collection as one event record
    ///
    /// Valid only while OPEN; fails with `StreamNotOpen` otherwise. On
    /// success all collections are cleared in place and the stream stays
    /// open for the next event.
    #[instrument(name = "stream_commit", skip(self, registry))]
    pub fn commit(
        &mut self,
        registry: &mut CollectionRegistry,
    ) -> Result<CommitSummary, ContractError> {
        let writer = self.writer.as_mut().ok_or(ContractError::StreamNotOpen)?;

        let views: Vec<CollectionView<'_>> = registry
            .iter()
            .map(|(name, _, data)| CollectionView { name, data })
            .collect();
        writer.write_event(&views)?;

        let entries_per_collection = views
            .iter()
            .map(|view| (view.name.to_string(), view.data.len()))
            .collect();
        let total_entries = registry.total_entries();
        drop(views);

        registry.clear_all();
        self.events_in_file += 1;

        Ok(CommitSummary {
            file_name: self.file_name.clone().unwrap_or_default(),
            events_in_file: self.events_in_file,
            total_entries,
            entries_per_collection,
        })
    }

    /// Finalize and release the current file; no-op when already closed
    #[instrument(name = "stream_close", skip(self))]
    pub fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer.finish()?;
            info!(
                file = self.file_name.as_deref().unwrap_or(""),
                events = self.events_in_file,
                "closed output stream"
            );
        }
        self.file_name = None;
        self.events_in_file = 0;
        Ok(())
    }
}
