//! Configuration validation
//!
//! Rules:
//! - collection names unique, non-empty
//! - `EventHeader` name and kind are reserved (created automatically)
//! - at least one collection declared
//! - point resolutions finite and > 0
//! - output stem non-empty
//! - processor declaration names non-empty

use std::collections::HashSet;

use contracts::{CollectionKind, ContractError, OutputBlueprint, EVENT_HEADER_NAME};

/// Validate an OutputBlueprint
///
/// Returns the first violation encountered, or Ok(()).
pub fn validate(blueprint: &OutputBlueprint) -> Result<(), ContractError> {
    validate_collections(blueprint)?;
    validate_processor(blueprint)?;
    validate_output(blueprint)?;
    validate_processor_decls(blueprint)?;
    Ok(())
}

/// Validate collection declarations
fn validate_collections(blueprint: &OutputBlueprint) -> Result<(), ContractError> {
    if blueprint.collections.is_empty() {
        return Err(ContractError::config_validation(
            "collections",
            "at least one output collection must be declared",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, desc) in blueprint.collections.iter().enumerate() {
        if desc.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("collections[{idx}].name"),
                "collection name cannot be empty",
            ));
        }
        if desc.name == EVENT_HEADER_NAME || desc.kind == CollectionKind::EventHeader {
            return Err(ContractError::config_validation(
                format!("collections[{idx}]"),
                "the event header collection is created automatically and cannot be declared",
            ));
        }
        if !seen.insert(&desc.name) {
            return Err(ContractError::config_validation(
                format!("collections[name={}]", desc.name),
                "duplicate collection name",
            ));
        }
    }
    Ok(())
}

/// Validate converter parameters
fn validate_processor(blueprint: &OutputBlueprint) -> Result<(), ContractError> {
    let proc = &blueprint.processor;
    for (field, value) in [
        ("processor.point_resolution_r_phi", proc.point_resolution_r_phi),
        ("processor.point_resolution_z", proc.point_resolution_z),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ContractError::config_validation(
                field,
                format!("point resolution must be finite and > 0, got {value}"),
            ));
        }
    }
    Ok(())
}

/// Validate output settings
fn validate_output(blueprint: &OutputBlueprint) -> Result<(), ContractError> {
    if blueprint.output.stem.is_empty() {
        return Err(ContractError::config_validation(
            "output.stem",
            "output file stem cannot be empty",
        ));
    }
    Ok(())
}

/// Validate sub-processor declarations
fn validate_processor_decls(blueprint: &OutputBlueprint) -> Result<(), ContractError> {
    for (idx, decl) in blueprint.processors.iter().enumerate() {
        if decl.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("processors[{idx}].name"),
                "processor name cannot be empty",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        CollectionDescriptor, ConfigVersion, OutputConfig, ProcessorConfig, ProcessorDecl,
        RunConfig, WriterFormat,
    };

    fn minimal_blueprint() -> OutputBlueprint {
        OutputBlueprint {
            version: ConfigVersion::V1,
            run: RunConfig {
                run_number: 1,
                events: 10,
            },
            output: OutputConfig {
                directory: "./output".into(),
                stem: "digi".into(),
                format: WriterFormat::JsonLines,
                events_per_file: 0,
            },
            collections: vec![
                CollectionDescriptor::new("MCParticles", CollectionKind::Particles),
                CollectionDescriptor::new("VertexHits", CollectionKind::TrackerHits),
            ],
            processor: ProcessorConfig {
                point_resolution_r_phi: 0.004,
                point_resolution_z: 0.05,
                hit_type: 0,
            },
            processors: vec![ProcessorDecl {
                name: "edm_output.0".into(),
                kind: "output_converter".into(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_no_collections() {
        let mut bp = minimal_blueprint();
        bp.collections.clear();
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("at least one"), "got: {err}");
    }

    #[test]
    fn test_duplicate_collection_name() {
        let mut bp = minimal_blueprint();
        bp.collections.push(bp.collections[0].clone());
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate collection name"), "got: {err}");
    }

    #[test]
    fn test_reserved_header_name() {
        let mut bp = minimal_blueprint();
        bp.collections
            .push(CollectionDescriptor::new("EventHeader", CollectionKind::Particles));
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("created automatically"), "got: {err}");
    }

    #[test]
    fn test_reserved_header_kind() {
        let mut bp = minimal_blueprint();
        bp.collections
            .push(CollectionDescriptor::new("Headers2", CollectionKind::EventHeader));
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_invalid_resolution() {
        let mut bp = minimal_blueprint();
        bp.processor.point_resolution_z = -1.0;
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("point resolution"), "got: {err}");
    }

    #[test]
    fn test_empty_stem() {
        let mut bp = minimal_blueprint();
        bp.output.stem = String::new();
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("stem"), "got: {err}");
    }

    #[test]
    fn test_empty_processor_name() {
        let mut bp = minimal_blueprint();
        bp.processors[0].name = String::new();
        assert!(validate(&bp).is_err());
    }
}
