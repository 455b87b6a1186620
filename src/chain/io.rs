//! Loading option contracts from files
//!
//! Two formats are accepted:
//! - JSON, either a bare array of contracts or an object wrapping it as `{"data": [...]}`
//!   (both shapes are produced by the options endpoint)
//! - CSV with a header row using the same field names as the JSON payload

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use super::types::OptionContract;

/// Parse the options endpoint payload.
///
/// Accepts `[...]` or `{"data": [...]}`; anything else is rejected.
pub fn parse_contracts_json(text: &str) -> Result<Vec<OptionContract>> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("Options payload is not valid JSON")?;
    contracts_from_value(value)
}

/// Same as [`parse_contracts_json`] for an already-decoded value
pub fn contracts_from_value(value: serde_json::Value) -> Result<Vec<OptionContract>> {
    let array = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err(anyhow!("Invalid options data format: expected an array or {{\"data\": [...]}}")),
        },
        _ => return Err(anyhow!("Invalid options data format: expected an array or {{\"data\": [...]}}")),
    };

    let mut contracts = Vec::with_capacity(array.len());
    let mut rejected = 0usize;
    for item in array {
        match serde_json::from_value::<OptionContract>(item) {
            Ok(contract) => contracts.push(contract),
            Err(e) => {
                rejected += 1;
                tracing::debug!(error = %e, "rejected malformed contract");
            }
        }
    }

    if rejected > 0 {
        tracing::warn!(rejected, kept = contracts.len(), "ignored malformed contracts in payload");
    }

    Ok(contracts)
}

/// Read contracts from a CSV reader with a header row.
///
/// Rows whose fields do not decode (unknown contract type, non-numeric strike)
/// are skipped with a warning, like malformed entries of a JSON payload.
/// Structural errors such as a wrong field count fail the whole read.
pub fn read_contracts_csv<R: std::io::Read>(reader: R) -> Result<Vec<OptionContract>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut contracts = Vec::new();
    let mut rejected = 0usize;

    for (line, record) in reader.deserialize::<OptionContract>().enumerate() {
        match record {
            Ok(contract) => contracts.push(contract),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Deserialize { .. }) => {
                rejected += 1;
                tracing::debug!(row = line + 2, error = %e, "rejected malformed contract");
            }
            Err(e) => return Err(e).with_context(|| format!("Invalid CSV row {}", line + 2)),
        }
    }

    if rejected > 0 {
        tracing::warn!(rejected, kept = contracts.len(), "ignored malformed rows in CSV");
    }

    Ok(contracts)
}

/// Load contracts from a `.json` or `.csv` file, chosen by extension
pub fn load_contracts(path: impl AsRef<Path>) -> Result<Vec<OptionContract>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_contracts_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_contracts_json(&text)
        }
        other => Err(anyhow!(
            "Unsupported contract file extension '{}' for {}",
            other,
            path.display()
        )),
    }
}
