//! Process-wide registry of validation plugins.
//!
//! The Python implementation discovers handlers via `entrypoints`; that kind
//! of plugin *discovery* is explicitly out of scope here (spec §1). What
//! remains in scope is the *interface* and the lookup-by-name dispatch, so
//! this is a plain static registry that embedders populate by calling
//! [`register`] once at startup, e.g. from `main()` before the first
//! `DsValidator::validate` call.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::json::handler::ValidationHandler;

static REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn ValidationHandler>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register a validation handler under `name`, to be referenced in schemas
/// as `v#{name}://ARGS`. Registering under an existing name replaces it.
pub fn register(name: impl Into<String>, handler: Arc<dyn ValidationHandler>) {
    REGISTRY
        .write()
        .expect("validation handler registry lock poisoned")
        .insert(name.into(), handler);
}

/// Look up a registered handler by name.
pub fn lookup(name: &str) -> Option<Arc<dyn ValidationHandler>> {
    REGISTRY
        .read()
        .expect("validation handler registry lock poisoned")
        .get(name)
        .cloned()
}
