//! EventStage - execution capability declared by a processing stage
//!
//! The framework may run stages concurrently across worker threads. A stage
//! that requires exclusive execution declares it here, at registration,
//! instead of flipping a scheduler flag during initialization. The caller
//! must honor the declared mode; stages provide no internal locking.

/// How a stage may be scheduled by the surrounding framework
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Calls may run concurrently with other work on this stage
    Parallel,
    /// All calls into this stage must be strictly serialized
    Exclusive,
}

/// A processing stage visible to the framework's scheduler
pub trait EventStage {
    /// Stage name (used for logging and error reporting)
    fn name(&self) -> &str;

    /// Scheduling requirement of this stage
    fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::Parallel
    }
}
