//! Batch add command

use std::collections::HashMap;

use colored::Colorize;
use serde::Deserialize;

use crate::interfaces::cli::CliError;
use crate::services::ShorteningService;

/// One entry of a batch input file
#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
}

/// Parse a batch file into `{correlation_id: url}`. Duplicate ids are rejected.
pub fn parse_batch(content: &str) -> Result<HashMap<String, String>, CliError> {
    let items: Vec<BatchItem> = serde_json::from_str(content)
        .map_err(|e| CliError::ParseError(format!("Invalid batch file: {}", e)))?;

    let mut batch = HashMap::with_capacity(items.len());
    for item in items {
        if batch
            .insert(item.correlation_id.clone(), item.original_url)
            .is_some()
        {
            return Err(CliError::ParseError(format!(
                "Duplicate correlation_id: {}",
                item.correlation_id
            )));
        }
    }
    Ok(batch)
}

pub async fn add_batch(
    service: &ShorteningService,
    file_path: &str,
    owner: &str,
) -> Result<(), CliError> {
    let content = std::fs::read_to_string(file_path)
        .map_err(|e| CliError::CommandError(format!("Failed to read {}: {}", file_path, e)))?;
    let batch = parse_batch(&content)?;

    let codes = service.add_batch(&batch, owner).await?;

    let mut ids: Vec<&String> = codes.keys().collect();
    ids.sort();
    for id in ids {
        println!("  {} -> {}", id.yellow(), codes[id].cyan());
    }
    println!(
        "{} Shortened {} URLs",
        "✓".bold().green(),
        codes.len().to_string().green()
    );
    Ok(())
}
