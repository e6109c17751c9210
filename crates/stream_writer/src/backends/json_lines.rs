//! JsonLinesWriter - one JSON object per line
//!
//! Line 1 is the file metadata, every following line one committed event
//! mapping collection name to its serialized contents. Human-inspectable
//! with standard line tools.

use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::debug;

use contracts::{
    CollectionDescriptor, CollectionKind, CollectionView, ContractError, EventWriter,
};

use super::FileMeta;

/// Persistence backend writing newline-delimited JSON
pub struct JsonLinesWriter {
    file_name: String,
    out: BufWriter<File>,
    meta: FileMeta,
    meta_written: bool,
}

impl JsonLinesWriter {
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
            serde_json::to_writer(&mut self.out, &self.meta)
                .map_err(|e| ContractError::backend(format!("metadata encode error: {e}")))?;
            self.out.write_all(b"\n")?;
            self.meta_written = true;
        }
        Ok(())
    }
}

impl EventWriter for JsonLinesWriter {
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

        let mut record = serde_json::Map::with_capacity(event.len());
        for view in event {
            let value = serde_json::to_value(view.data)
                .map_err(|e| ContractError::backend(format!("event encode error: {e}")))?;
            record.insert(view.name.to_string(), value);
        }
        serde_json::to_writer(&mut self.out, &serde_json::Value::Object(record))
            .map_err(|e| ContractError::backend(format!("event encode error: {e}")))?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ContractError> {
        // A file with zero committed events still carries its metadata
        self.ensure_meta()?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Collection, EventHeaderEntry};
    use std::io::BufRead;
    use tempfile::tempdir;

    #[test]
    fn test_file_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let file_name = path.to_str().unwrap();

        let mut writer = JsonLinesWriter::create(file_name).unwrap();
        writer
            .register_collection("EventHeader", CollectionKind::EventHeader)
            .unwrap();

        let header = Collection::EventHeader(vec![EventHeaderEntry {
            run_number: 1,
            event_number: 1,
            time_stamp: 0,
            weight: 1.0,
        }]);
        let views = [CollectionView {
            name: "EventHeader",
            data: &header,
        }];
        writer.write_event(&views).unwrap();
        writer.write_event(&views).unwrap();
        writer.finish().unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 3); // meta + 2 events

        let meta: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(meta["collections"][0]["name"], "EventHeader");

        let event: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(event["EventHeader"]["kind"], "event_header");
        assert_eq!(event["EventHeader"]["entries"][0]["run_number"], 1);
    }

    #[test]
    fn test_empty_file_still_has_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");

        let mut writer = JsonLinesWriter::create(path.to_str().unwrap()).unwrap();
        writer
            .register_collection("VertexHits", CollectionKind::TrackerHits)
            .unwrap();
        writer.finish().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("VertexHits"));
    }

    #[test]
    fn test_register_after_first_event_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        let mut writer = JsonLinesWriter::create(path.to_str().unwrap()).unwrap();
        let header = Collection::EventHeader(Vec::new());
        writer
            .write_event(&[CollectionView {
                name: "EventHeader",
                data: &header,
            }])
            .unwrap();
        let err = writer
            .register_collection("Late", CollectionKind::Particles)
            .unwrap_err();
        assert!(matches!(err, ContractError::Backend { .. }));
    }
}
