//! SequentialNamer - rotation file names
//!
//! Produces `<dir>/<stem>.<seq>.<ext>` with a zero-padded, monotonically
//! increasing sequence number.

use std::path::{Path, PathBuf};

use contracts::{StreamNamer, WriterFormat};

/// Produces the next output file name on each rotation
pub struct SequentialNamer {
    directory: PathBuf,
    stem: String,
    extension: &'static str,
    next_index: u32,
}

impl SequentialNamer {
    /// Create a namer rooted at `directory` with the given stem and format
    pub fn new(directory: impl AsRef<Path>, stem: impl Into<String>, format: WriterFormat) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            stem: stem.into(),
            extension: format.extension(),
            next_index: 0,
        }
    }

    /// Sequence number the next call will use
    pub fn next_index(&self) -> u32 {
        self.next_index
    }
}

impl StreamNamer for SequentialNamer {
    fn next_file_name(&mut self) -> String {
        let name = format!("{}.{:05}.{}", self.stem, self.next_index, self.extension);
        self.next_index += 1;
        self.directory.join(name).to_string_lossy().into_owned()
    }
}
