//! The evaluation context threaded through the recursive evaluator, and the
//! validation-error types it accumulates. See spec §3 ("Evaluation context",
//! "Error record") and §9 ("Context threading").

use std::collections::BTreeMap;

use regex::Regex;

use crate::json::handler::JsonValidationErrors;

/// Either a plain message, or a nested map of JSON-Schema/plugin errors
/// keyed by JSON Pointer (produced by a `valid`/`validMeta` check).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum ErrMessage {
    Msg(String),
    Json(JsonValidationErrors),
}

/// One recorded failure: the actual path it pertains to (which may be a
/// metadata companion path, not the path under top-level iteration) and the
/// message/nested errors.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DsValidationError {
    pub path: String,
    pub err: ErrMessage,
}

/// Errors for a single top-level path, keyed by the JSON-Pointer-like rule
/// location string (e.g. `"/anyOf/0/next/type"`) that produced them.
pub type LocationErrors = BTreeMap<String, DsValidationError>;

/// The full result of a validation run: top-level path to its errors. A path
/// with no errors is absent from the map.
pub type ValidationReport = BTreeMap<String, LocationErrors>;

/// Per-rule-invocation state threaded on descent: where in the schema we
/// are, and the match slice/pattern inherited from enclosing rules (each
/// overridden by a rule's own `matchStart`/`matchStop`/`match` when set).
#[derive(Debug, Clone)]
pub struct EvalCtx {
    location: Vec<String>,
    pub match_start: Option<i64>,
    pub match_stop: Option<i64>,
    pub match_pat: Option<Regex>,
}

impl EvalCtx {
    /// A context for validating a fresh top-level path: no location, no
    /// inherited match state.
    pub fn fresh() -> Self {
        EvalCtx {
            location: Vec::new(),
            match_start: None,
            match_stop: None,
            match_pat: None,
        }
    }

    /// Descend one schema keyword/index deeper, carrying the (possibly
    /// already-overridden) match state along unchanged.
    pub fn descend(&self, step: impl Into<String>) -> Self {
        let mut location = self.location.clone();
        location.push(step.into());
        EvalCtx {
            location,
            match_start: self.match_start,
            match_stop: self.match_stop,
            match_pat: self.match_pat.clone(),
        }
    }

    /// The current location rendered as a JSON-Pointer-like string, e.g.
    /// `"/allOf/0/next"`. The root location renders as `"/"`.
    pub fn location_str(&self) -> String {
        format!("/{}", self.location.join("/"))
    }
}
