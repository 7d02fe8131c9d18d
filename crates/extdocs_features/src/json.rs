//! JSON parsing for source documents.
//!
//! Feature files in the source tree carry license headers as `//` comments,
//! so documents are parsed as JSON with comments.

use jsonc_parser::ParseOptions;
use serde_json::Value;

use crate::FeaturesError;

/// Parses `bytes` read from `path` into a JSON value.
pub fn parse_json(path: &str, bytes: &[u8]) -> Result<Value, FeaturesError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| FeaturesError::malformed(format!("{}: {}", path, e)))?;

    jsonc_parser::parse_to_serde_value(text, &ParseOptions::default())
        .map_err(|e| FeaturesError::malformed(format!("{}: {}", path, e)))?
        .ok_or_else(|| FeaturesError::malformed(format!("{}: document is empty", path)))
}
