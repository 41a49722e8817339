//! Loading a schema document (JSON or YAML) from disk into a [`DSRule`].
//! `$ref` resolution is the external loader's job (spec §1); this just
//! parses the top-level document.

use std::path::Path;

use crate::error::DsError;
use crate::json::parse::loads_json_or_yaml;
use crate::rule::DSRule;

/// Read and parse `path` as a dirschema document.
pub fn load_schema(path: &Path) -> Result<DSRule, DsError> {
    let text = std::fs::read_to_string(path)?;
    let value = loads_json_or_yaml(&text)?;
    serde_json::from_value(value).map_err(|e| DsError::Parse(e.to_string()))
}

/// Parse a dirschema document already held in memory.
pub fn parse_schema(text: &str) -> Result<DSRule, DsError> {
    let value = loads_json_or_yaml(text)?;
    serde_json::from_value(value).map_err(|e| DsError::Parse(e.to_string()))
}
