//! URI normalization and JSON/YAML document loading for validator references.
//! See spec §6 ("Validator reference strings").

use std::path::{Path, PathBuf};

use crate::error::DsError;

/// Normalize a validator reference to an absolute `http(s)://` or `file://`
/// URI.
///
/// - `http(s)://`/`file://` references pass through unchanged.
/// - `cwd://REL` resolves against the process working directory.
/// - `local://REL` resolves against `local_basedir` (defaults to the
///   schema's own directory, chosen by the caller).
/// - A bare relative reference (no `proto://`) is prefixed with
///   `relative_prefix` first, then resolved the same way as `cwd://`.
pub fn to_uri(path: &str, local_basedir: Option<&Path>, relative_prefix: &str) -> Result<String, DsError> {
    let local_basedir = local_basedir.map(Path::to_path_buf).unwrap_or_default();

    let mut path = path.to_string();
    if !path.starts_with('/') && !path.contains("://") {
        path = format!("{relative_prefix}{path}");
    }

    let mut parts = path.splitn(2, "://");
    let first = parts.next().unwrap_or_default().to_string();
    let rest_opt = parts.next();

    let (prot, rest) = match rest_opt {
        Some(rest) => (first, rest.to_string()),
        None => (String::new(), first),
    };

    if prot.starts_with("http") || prot.starts_with("file") {
        return Ok(path);
    }

    let resolved = match prot.as_str() {
        "local" => absolutize(&local_basedir.join(rest.trim_start_matches('/')))?,
        "cwd" => absolutize(Path::new(rest.trim_start_matches('/')))?,
        "" => {
            if Path::new(&rest).is_absolute() {
                rest
            } else {
                absolutize(Path::new(&rest))?
            }
        }
        other => return Err(DsError::UnknownProtocol(other.to_string())),
    };

    Ok(format!("file://{resolved}"))
}

fn absolutize(p: &Path) -> Result<String, DsError> {
    if p.is_absolute() {
        Ok(p.to_string_lossy().into_owned())
    } else {
        let cwd = std::env::current_dir()?;
        Ok(cwd.join(p).to_string_lossy().into_owned())
    }
}

/// Parse a string as JSON, falling back to YAML (same fallback every
/// [`crate::adapters::StorageAdapter::decode_json`] default implementation
/// uses).
pub fn loads_json_or_yaml(data: &str) -> Result<serde_json::Value, DsError> {
    if let Ok(v) = serde_json::from_str(data) {
        return Ok(v);
    }
    serde_yaml::from_str(data).map_err(|e| DsError::Parse(e.to_string()))
}

/// Load and parse a normalized `uri` (as produced by [`to_uri`]): `file://`
/// is read from disk, `http(s)://` is fetched with a minimal blocking GET.
pub fn load_json(uri: &str) -> Result<serde_json::Value, DsError> {
    let content = if let Some(path) = uri.strip_prefix("file://") {
        std::fs::read_to_string(path)?
    } else if uri.starts_with("http://") || uri.starts_with("https://") {
        ureq::get(uri)
            .call()
            .map_err(|e| DsError::UnresolvableRef(uri.to_string(), e.to_string()))?
            .into_string()
            .map_err(|e| DsError::UnresolvableRef(uri.to_string(), e.to_string()))?
    } else {
        return Err(DsError::UnknownProtocol(uri.to_string()));
    };
    loads_json_or_yaml(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_become_file_uris() {
        let uri = to_uri("/tmp/schema.json", None, "").unwrap();
        assert_eq!(uri, "file:///tmp/schema.json");
    }

    #[test]
    fn http_passes_through() {
        assert_eq!(
            to_uri("http://example.com/s.json", None, "").unwrap(),
            "http://example.com/s.json"
        );
    }

    #[test]
    fn local_resolves_against_basedir() {
        let base = Path::new("/srv/schemas");
        let uri = to_uri("local://sub/s.json", Some(base), "").unwrap();
        assert_eq!(uri, "file:///srv/schemas/sub/s.json");
    }

    #[test]
    fn relative_prefix_applies_to_bare_paths() {
        let uri = to_uri("s.json", None, "cwd://").unwrap();
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("s.json"));
    }
}
