//! Defensive JSON extraction from raw model output.
//!
//! Models frequently wrap their JSON payload in a markdown code fence. The
//! heuristic here is textual, not a structural markdown parser: it assumes at
//! most one fenced block and that the first fence pair contains the payload.
//! It is preserved byte-for-byte against the prompts in [`crate::prompt`],
//! which were tuned with this exact splitting behavior.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ExtractError;

/// Strip an optional markdown fence and parse the remainder as JSON.
///
/// Resolution order:
/// 1. A "```json" marker: take the text between it and the next "```".
/// 2. A bare "```" fence: take the text between the first and second "```".
/// 3. No fence: the full text.
///
/// Any parse failure yields [`ExtractError::Malformed`] carrying the raw
/// text; there is no partial or best-effort output. An unclosed "```json"
/// marker leaves the remainder of the string, which then fails to parse.
pub fn extract_json(raw: &str) -> Result<serde_json::Value, ExtractError> {
    let candidate = fenced_payload(raw);
    serde_json::from_str(candidate).map_err(|e| {
        debug!(error = %e, "model response failed JSON extraction");
        ExtractError::Malformed {
            message: e.to_string(),
            raw: raw.to_string(),
        }
    })
}

/// Extract and deserialize into a typed result in one step.
pub fn extract<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|e| ExtractError::Malformed {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

/// Select the candidate JSON substring per the fence heuristic.
fn fenced_payload(raw: &str) -> &str {
    if let Some(start) = raw.find("```json") {
        let after = &raw[start + "```json".len()..];
        match after.find("```") {
            Some(end) => after[..end].trim(),
            None => after.trim(),
        }
    } else if let Some(start) = raw.find("```") {
        let after = &raw[start + "```".len()..];
        match after.find("```") {
            Some(end) => after[..end].trim(),
            None => after.trim(),
        }
    } else {
        raw
    }
}
