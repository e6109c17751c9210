//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    run_number: i32,
    collection_count: usize,
    processor_count: usize,
    format: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else if result.valid {
        println!("Configuration is valid: {}", result.config_path);
        if let Some(summary) = &result.summary {
            println!(
                "  run {} / {} collections / format {}",
                summary.run_number, summary.collection_count, summary.format
            );
        }
    } else {
        println!("Configuration is INVALID: {}", result.config_path);
        if let Some(error) = &result.error {
            println!("  {}", error);
        }
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some("configuration file not found".to_string()),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            summary: Some(ConfigSummary {
                version: format!("{:?}", blueprint.version),
                run_number: blueprint.run.run_number,
                collection_count: blueprint.collections.len(),
                processor_count: blueprint.processors.len(),
                format: format!("{:?}", blueprint.output.format),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            summary: None,
        },
    }
}
