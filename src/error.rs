//! Errors that abort a validation run (schema errors and adapter errors).
//!
//! Validation errors — the per-path results a schema run accumulates — are
//! plain data ([`crate::context::DsValidationErrors`]) and never travel
//! through this type; only misconfiguration and I/O failures do.

use thiserror::Error;

/// Everything that aborts a dirschema run instead of being recorded as a
/// per-path validation failure.
#[derive(Debug, Error)]
pub enum DsError {
    #[error("unknown keyword(s) in rule: {0}")]
    UnknownRuleKeyword(String),

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid capture group reference in rewrite '{0}'")]
    InvalidRewrite(String),

    #[error("invalid JSON Schema document: {0}")]
    InvalidJsonSchema(String),

    #[error("could not resolve validator reference '{0}': {1}")]
    UnresolvableRef(String, String),

    #[error("unknown protocol in reference '{0}'")]
    UnknownProtocol(String),

    #[error("validator plugin not found: '{0}'")]
    PluginNotFound(String),

    #[error("invalid plugin reference pseudo-URI: '{0}'")]
    InvalidPluginUri(String),

    #[error("validator plugin '{0}' failed: {1}")]
    PluginFailed(String, String),

    #[error("invalid metadata convention: at least one of filePrefix/fileSuffix must be set")]
    InvalidMetaConvention,

    #[error("could not open archive '{0}': {1}")]
    UnreadableArchive(String, String),

    #[error("HDF5 names must not contain '@': found in '{0}'")]
    ForbiddenAttributeSeparator(String),

    #[error("HDF5 support was not compiled in; rebuild with --features hdf5-adapter")]
    Hdf5NotEnabled,

    #[error("found no suitable dirschema adapter for path '{0}'")]
    UnsupportedAdapterPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid schema document: {0}")]
    Parse(String),
}
