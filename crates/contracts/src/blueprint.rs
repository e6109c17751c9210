//! OutputBlueprint - Config Loader output
//!
//! Describes a complete output run: run identity, output file settings,
//! declared collections, converter parameters, sub-processor wiring.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{CollectionDescriptor, WriterFormat};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete output-stage configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Run identity
    pub run: RunConfig,

    /// Output file settings
    pub output: OutputConfig,

    /// Declared output collections (EventHeader is reserved and implicit)
    pub collections: Vec<CollectionDescriptor>,

    /// Converter parameters
    pub processor: ProcessorConfig,

    /// Sub-processors wired into the output stage
    #[serde(default)]
    pub processors: Vec<ProcessorDecl>,
}

/// Run identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run number stamped into every event header
    pub run_number: i32,

    /// Events to produce (0 = driver decides)
    #[serde(default)]
    pub events: u64,
}

/// Output file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the output files
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// File name stem; the namer appends a sequence number and extension
    pub stem: String,

    /// On-disk encoding
    #[serde(default)]
    pub format: WriterFormat,

    /// Events per file before rotation (0 = single file, no rotation)
    #[serde(default)]
    pub events_per_file: u64,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("./output")
}

/// Converter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Tracker point resolution in r-phi (mm)
    pub point_resolution_r_phi: f64,

    /// Tracker point resolution along z (mm)
    pub point_resolution_z: f64,

    /// Hit type tag attached to every produced hit
    #[serde(default)]
    pub hit_type: i32,
}

/// Expected kind string for output-stage sub-processors
pub const OUTPUT_CONVERTER_KIND: &str = "output_converter";

/// Declaration of one sub-processor wired into the output stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorDecl {
    /// Processor instance name
    pub name: String,

    /// Processor kind; must be `output_converter`
    pub kind: String,
}
