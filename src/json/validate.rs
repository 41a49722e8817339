//! Resolving a `valid`/`validMeta` reference to an actual validator, and
//! running it. See spec §4.4/§4.5/§6.

use std::path::Path;
use std::sync::Arc;

use crate::error::DsError;
use crate::json::handler::{HandlerInput, JsonValidationErrors, ValidationHandler};
use crate::json::{handlers, parse};
use crate::rule::ValidatorRef;

/// A `valid`/`validMeta` reference, resolved to something that can actually
/// be run against metadata.
pub enum ResolvedValidator {
    Schema(serde_json::Value),
    Plugin(Arc<dyn ValidationHandler>, String),
}

impl ResolvedValidator {
    /// Whether this validator wants a decoded JSON value (vs. the raw bytes
    /// of the metadata file).
    pub fn wants_json(&self) -> bool {
        match self {
            ResolvedValidator::Schema(_) => true,
            ResolvedValidator::Plugin(h, _) => h.wants_json(),
        }
    }
}

/// Parse a `v#NAME://ARGS` plugin pseudo-URI and look up the registered
/// handler.
pub fn plugin_from_uri(custom_uri: &str) -> Result<(Arc<dyn ValidationHandler>, String), DsError> {
    let rest = custom_uri
        .strip_prefix("v#")
        .ok_or_else(|| DsError::InvalidPluginUri(custom_uri.to_string()))?;

    let mut it = rest.splitn(2, "://");
    let ep = it.next().unwrap_or_default();
    let args = it
        .next()
        .ok_or_else(|| DsError::InvalidPluginUri(custom_uri.to_string()))?;

    if ep.is_empty() {
        return Err(DsError::InvalidPluginUri(custom_uri.to_string()));
    }

    let handler = handlers::lookup(ep).ok_or_else(|| DsError::PluginNotFound(ep.to_string()))?;
    Ok((handler, args.to_string()))
}

/// Resolve an embedded schema, plugin reference, or schema URI into a
/// runnable validator.
pub fn resolve_validator(
    vref: &ValidatorRef,
    local_basedir: Option<&Path>,
    relative_prefix: &str,
) -> Result<ResolvedValidator, DsError> {
    match vref {
        ValidatorRef::Schema(v) => Ok(ResolvedValidator::Schema(v.clone())),
        ValidatorRef::Ref(s) => {
            if s.starts_with("v#") {
                let (handler, args) = plugin_from_uri(s)?;
                Ok(ResolvedValidator::Plugin(handler, args))
            } else {
                let uri = parse::to_uri(s, local_basedir, relative_prefix)?;
                let schema = parse::load_json(&uri)?;
                jsonschema::meta::validate(&schema)
                    .map_err(|e| DsError::InvalidJsonSchema(e.to_string()))?;
                Ok(ResolvedValidator::Schema(schema))
            }
        }
    }
}

fn validate_jsonschema(
    dat: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<JsonValidationErrors, DsError> {
    let validator =
        jsonschema::draft202012::new(schema).map_err(|e| DsError::InvalidJsonSchema(e.to_string()))?;

    let mut errs = JsonValidationErrors::new();
    for err in validator.iter_errors(dat) {
        let key = err.instance_path.to_string();
        errs.entry(key).or_default().push(err.to_string());
    }
    Ok(errs)
}

/// Validate `input` against a resolved validator. Returns an empty map on
/// success.
pub fn validate_metadata(
    input: HandlerInput<'_>,
    resolved: &ResolvedValidator,
) -> Result<JsonValidationErrors, DsError> {
    match resolved {
        ResolvedValidator::Schema(schema) => match input {
            HandlerInput::Json(v) => validate_jsonschema(v, schema),
            HandlerInput::Raw(_) => Err(DsError::InvalidJsonSchema(
                "a JSON Schema validator requires decoded JSON metadata, got raw bytes".to_string(),
            )),
        },
        ResolvedValidator::Plugin(handler, args) => {
            log::debug!("dispatching to validation plugin with args '{args}'");
            handler.validate(input, args)
        }
    }
}
