//! OutputAction - wires configuration into registry, converter and stream
//!
//! The action owns the registry and lends it mutably to the converter and
//! the stream manager per call, so the "single logical writer" precondition
//! is a borrow rule rather than a convention.

use tracing::info;

use contracts::{
    CommitSummary, ContractError, DepositPredicate, EventContext, EventHeaderEntry, EventStage,
    ExecutionMode, OutputBlueprint, StreamNamer, WorkItem, OUTPUT_CONVERTER_KIND,
};
use converters::RecordConverter;
use event_store::CollectionRegistry;
use stream_writer::{SequentialNamer, StreamManager};

/// Orchestrator of the output stage
pub struct OutputAction {
    name: String,
    blueprint: OutputBlueprint,
    registry: CollectionRegistry,
    stream: StreamManager,
    converter: RecordConverter,
    namer: Box<dyn StreamNamer>,
    events_committed: u64,
}

impl OutputAction {
    /// Wire an output action from a validated blueprint
    pub fn new(name: impl Into<String>, blueprint: OutputBlueprint) -> Self {
        let name = name.into();
        let namer = SequentialNamer::new(
            &blueprint.output.directory,
            blueprint.output.stem.as_str(),
            blueprint.output.format,
        );
        let converter = RecordConverter::new(format!("{name}.converter"), &blueprint.processor);
        let stream = StreamManager::new(blueprint.output.format);
        Self {
            name,
            blueprint,
            registry: CollectionRegistry::new(),
            stream,
            converter,
            namer: Box::new(namer),
            events_committed: 0,
        }
    }

    /// Initialization callback
    ///
    /// Validates that every declared sub-processor is an output converter
    /// (fatal, naming the offender, otherwise) and creates all collections.
    /// Must complete before the first open and before the first execute.
    pub fn initialize(&mut self) -> Result<(), ContractError> {
        for decl in &self.blueprint.processors {
            if decl.kind != OUTPUT_CONVERTER_KIND {
                return Err(ContractError::InvalidProcessor {
                    name: decl.name.clone(),
                    kind: decl.kind.clone(),
                });
            }
        }

        self.registry
            .create_collections(&self.blueprint.collections)?;
        info!(
            action = %self.name,
            collections = self.registry.len(),
            processors = self.blueprint.processors.len(),
            "output action initialized"
        );
        Ok(())
    }

    /// Whether an output stream is currently open
    pub fn has_output(&self) -> bool {
        self.stream.is_open()
    }

    /// Open an output stream on the given file
    pub fn open_output(&mut self, file_name: &str) -> Result<(), ContractError> {
        self.stream.open(file_name, &self.registry)
    }

    /// Open the next file in the rotation sequence
    pub fn open_next(&mut self) -> Result<String, ContractError> {
        let file_name = self.namer.next_file_name();
        self.open_output(&file_name)?;
        Ok(file_name)
    }

    /// Close the output stream; safe to call when already closed
    pub fn close_output(&mut self) -> Result<(), ContractError> {
        self.stream.close()
    }

    /// Commit the current event
    ///
    /// Appends the automatic event header entry and writes all collection
    /// contents as one atomic record. Refuses before touching any
    /// collection when no stream is open.
    pub fn commit_output(&mut self, ctx: &EventContext) -> Result<CommitSummary, ContractError> {
        if !self.stream.is_open() {
            return Err(ContractError::StreamNotOpen);
        }

        self.registry.header_mut()?.push(EventHeaderEntry {
            run_number: ctx.run_number,
            event_number: ctx.event_number,
            time_stamp: ctx.time_stamp,
            weight: 1.0,
        });

        let summary = self.stream.commit(&mut self.registry)?;
        self.events_committed += 1;
        Ok(summary)
    }

    /// Convert one work item into the matching collection
    pub fn execute(
        &mut self,
        ctx: &EventContext,
        work: &WorkItem,
        predicate: &DepositPredicate,
    ) -> Result<(), ContractError> {
        self.converter.execute(ctx, work, predicate, &mut self.registry)
    }

    /// Events committed across the whole run
    pub fn events_committed(&self) -> u64 {
        self.events_committed
    }

    /// Events committed to the currently open file
    pub fn events_in_file(&self) -> u64 {
        self.stream.events_in_file()
    }

    /// Registry accessor (read paths: identity checks, enumeration)
    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// The blueprint this action was wired from
    pub fn blueprint(&self) -> &OutputBlueprint {
        &self.blueprint
    }
}

impl EventStage for OutputAction {
    fn name(&self) -> &str {
        &self.name
    }

    /// The output stage requires strictly serialized calls
    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Exclusive
    }
}
