//! # Output Action
//!
//! Orchestrator of the output stage.
//!
//! Responsibilities:
//! - Validate sub-processor wiring at initialization
//! - Trigger exactly-once collection creation
//! - Expose the lifecycle operations (has/open/commit/close) to the framework
//! - Declare exclusive execution via the `EventStage` capability

mod action;

pub use action::OutputAction;
