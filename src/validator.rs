//! The public entry point: load a schema once, then validate any number of
//! directory-like targets against it.

use std::path::{Path, PathBuf};

use crate::adapters::get_adapter_for;
use crate::context::ValidationReport;
use crate::convention::MetaConvention;
use crate::error::DsError;
use crate::evaluator::{self, ValidateOptions};
use crate::rule::DSRule;
use crate::schema;

/// A parsed schema, ready to validate directories, zip archives, or HDF5
/// files against it.
pub struct DsValidator {
    root: DSRule,
    convention: MetaConvention,
    local_basedir: Option<PathBuf>,
    relative_prefix: String,
}

impl DsValidator {
    /// Load a schema document from `schema_path`.
    pub fn from_path(schema_path: &Path, convention: MetaConvention) -> Result<Self, DsError> {
        convention.check_valid()?;
        let root = schema::load_schema(schema_path)?;
        let local_basedir = schema_path.parent().map(Path::to_path_buf);
        Ok(DsValidator {
            root,
            convention,
            local_basedir,
            relative_prefix: String::new(),
        })
    }

    /// Parse a schema document already held in memory.
    pub fn from_str(schema_text: &str, convention: MetaConvention) -> Result<Self, DsError> {
        convention.check_valid()?;
        let root = schema::parse_schema(schema_text)?;
        Ok(DsValidator {
            root,
            convention,
            local_basedir: None,
            relative_prefix: String::new(),
        })
    }

    /// Override where `local://` references resolve against. Defaults to
    /// the schema file's own directory (or unset, for in-memory schemas).
    pub fn with_local_basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.local_basedir = Some(basedir.into());
        self
    }

    /// Prefix prepended to bare relative validator references. Defaults to
    /// empty.
    pub fn with_relative_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.relative_prefix = prefix.into();
        self
    }

    /// Validate `target` (a directory, zip archive, or HDF5 file) against
    /// this schema.
    pub fn validate(&self, target: &Path) -> Result<ValidationReport, DsError> {
        let adapter = get_adapter_for(target)?;
        let opts = ValidateOptions {
            convention: &self.convention,
            local_basedir: self.local_basedir.as_deref(),
            relative_prefix: &self.relative_prefix,
        };
        evaluator::validate(adapter.as_ref(), &self.root, &opts)
    }
}

/// Render a validation report as canonical YAML (spec §6): empty map when
/// there were no errors.
pub fn format_errors(report: &ValidationReport) -> Result<String, DsError> {
    serde_yaml::to_string(report).map_err(|e| DsError::Parse(e.to_string()))
}

/// Render a validation report as a JSON value.
pub fn errors_to_json(report: &ValidationReport) -> Result<serde_json::Value, DsError> {
    serde_json::to_value(report).map_err(|e| DsError::Parse(e.to_string()))
}
