//! Interface for custom validation plugins, dispatched via `v#NAME://ARGS`
//! validator references. See spec §6 ("Plugin handler interface").

use std::collections::BTreeMap;

use crate::error::DsError;

/// Mapping from JSON Pointer (into the validated document) to the list of
/// error messages at that location. An empty map signals success.
pub type JsonValidationErrors = BTreeMap<String, Vec<String>>;

/// The payload handed to a plugin: either a decoded JSON value, or the raw
/// byte stream, depending on what the plugin declares it wants.
pub enum HandlerInput<'a> {
    Json(&'a serde_json::Value),
    Raw(&'a [u8]),
}

/// A registered custom validator. Implementations declare whether they want
/// a decoded JSON value or the raw bytes via [`ValidationHandler::wants_json`];
/// the evaluator only decodes the metadata file when that's true.
pub trait ValidationHandler: Send + Sync {
    fn wants_json(&self) -> bool;

    /// Validate `input` (matching [`ValidationHandler::wants_json`]) using the
    /// verbatim `args` string that followed `v#NAME://` in the schema.
    fn validate(&self, input: HandlerInput<'_>, args: &str) -> Result<JsonValidationErrors, DsError>;
}
