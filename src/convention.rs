//! Filename convention for sidecar metadata documents.
//!
//! A [`MetaConvention`] maps an entity path to the path of its companion
//! metadata document, and recognizes metadata paths so they can be excluded
//! from normal enumeration. See spec §3/§4.1.

use crate::error::DsError;

/// `(pathPrefix, pathSuffix, filePrefix, fileSuffix)` convention for locating
/// the metadata sidecar of a path.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MetaConvention {
    pub path_prefix: String,
    pub path_suffix: String,
    pub file_prefix: String,
    pub file_suffix: String,
}

impl Default for MetaConvention {
    fn default() -> Self {
        MetaConvention {
            path_prefix: String::new(),
            path_suffix: String::new(),
            file_prefix: String::new(),
            file_suffix: "_meta.json".to_string(),
        }
    }
}

impl MetaConvention {
    /// Construct from the CLI-facing 4-tuple, checking the invariant that at
    /// least one of `filePrefix`/`fileSuffix` is non-empty.
    pub fn from_tuple(
        path_prefix: String,
        path_suffix: String,
        file_prefix: String,
        file_suffix: String,
    ) -> Result<Self, DsError> {
        let conv = MetaConvention {
            path_prefix,
            path_suffix,
            file_prefix,
            file_suffix,
        };
        conv.check_valid()?;
        Ok(conv)
    }

    pub fn check_valid(&self) -> Result<(), DsError> {
        if self.file_prefix.is_empty() && self.file_suffix.is_empty() {
            return Err(DsError::InvalidMetaConvention);
        }
        Ok(())
    }

    pub fn to_tuple(&self) -> (String, String, String, String) {
        (
            self.path_prefix.clone(),
            self.path_suffix.clone(),
            self.file_prefix.clone(),
            self.file_suffix.clone(),
        )
    }

    /// Check whether the given (normalized, `/`-separated) path is a metadata
    /// document according to this convention.
    pub fn is_meta(&self, path: &str) -> bool {
        let parts = segments(path);
        if parts.is_empty() {
            return false;
        }
        let last = parts[parts.len() - 1];
        if !self.file_prefix.is_empty() && !last.starts_with(self.file_prefix.as_str()) {
            return false;
        }
        if !self.file_suffix.is_empty() && !last.ends_with(self.file_suffix.as_str()) {
            return false;
        }
        let extra = usize::from(!self.path_prefix.is_empty()) + usize::from(!self.path_suffix.is_empty());
        if parts.len() < 1 + extra {
            return false;
        }
        let pp_ok = self.path_prefix.is_empty() || parts[0] == self.path_prefix;
        let ps_ok = self.path_suffix.is_empty() || parts[parts.len() - 2] == self.path_suffix;
        pp_ok && ps_ok
    }

    /// Construct the metadata companion path for `path`.
    pub fn meta_for(&self, path: &str, is_dir: bool) -> String {
        let parts = segments(path);
        let mut out: Vec<String> = Vec::new();

        if !self.path_prefix.is_empty() {
            out.push(self.path_prefix.clone());
        }
        if !parts.is_empty() {
            out.extend(parts[..parts.len() - 1].iter().map(|s| s.to_string()));
        }
        if !is_dir && !self.path_suffix.is_empty() {
            out.push(self.path_suffix.clone());
        }

        let name = parts.last().copied().unwrap_or("");

        if is_dir {
            out.push(name.to_string());
            if !self.path_suffix.is_empty() {
                out.push(self.path_suffix.clone());
            }
            out.push(format!("{}{}", self.file_prefix, self.file_suffix));
        } else {
            out.push(format!("{}{}{}", self.file_prefix, name, self.file_suffix));
        }

        out.join("/")
    }
}

fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_convention_pins() {
        let conv = MetaConvention::default();
        assert_eq!(conv.meta_for("", false), "_meta.json");
        assert_eq!(conv.meta_for("foo", false), "foo_meta.json");
        assert_eq!(conv.meta_for("foo", true), "foo/_meta.json");
    }

    #[test]
    fn root_is_never_meta() {
        assert!(!MetaConvention::default().is_meta(""));
    }

    #[test]
    fn default_is_meta_edge_cases() {
        let conv = MetaConvention::default();
        assert!(!conv.is_meta("foo"));
        assert!(!conv.is_meta("foo/bar"));
        assert!(!conv.is_meta("foo/bar_meta.jsonbaz"));
        assert!(!conv.is_meta("foo/bar_meta.json/baz"));
        assert!(conv.is_meta("foo/bar_meta.json"));
        assert!(conv.is_meta("foo/_meta.json"));
    }

    #[test]
    fn file_prefix_changes_recognition() {
        let mut conv = MetaConvention::default();
        conv.file_prefix = "mymeta_".to_string();
        assert!(!conv.is_meta("foo/bar_meta.json"));
        assert!(!conv.is_meta("foo/mymeta_bar"));
        assert!(conv.is_meta("foo/mymeta_bar_meta.json"));
        assert!(conv.is_meta("foo/mymeta__meta.json"));

        assert_eq!(conv.meta_for("", false), "mymeta__meta.json");
        assert_eq!(conv.meta_for("foo", false), "mymeta_foo_meta.json");
        assert_eq!(conv.meta_for("foo", true), "foo/mymeta__meta.json");
    }

    #[test]
    fn path_prefix_and_suffix() {
        let conv = MetaConvention {
            path_prefix: "meta_prefix".to_string(),
            path_suffix: "meta_suffix".to_string(),
            file_prefix: "mymeta_".to_string(),
            file_suffix: "_meta.json".to_string(),
        };
        assert!(!conv.is_meta("meta_prefix/mymeta_bar_meta.json"));
        assert!(conv.is_meta("meta_prefix/meta_suffix/mymeta__meta.json"));
        assert!(conv.is_meta("meta_prefix/meta_suffix/mymeta_bar_meta.json"));
        assert!(conv.is_meta("meta_prefix/foo/meta_suffix/mymeta_bar_meta.json"));

        assert_eq!(
            conv.meta_for("", false),
            "meta_prefix/meta_suffix/mymeta__meta.json"
        );
        assert_eq!(
            conv.meta_for("foo", false),
            "meta_prefix/meta_suffix/mymeta_foo_meta.json"
        );
        assert_eq!(
            conv.meta_for("foo", true),
            "meta_prefix/foo/meta_suffix/mymeta__meta.json"
        );
        assert_eq!(
            conv.meta_for("foo/bar", false),
            "meta_prefix/foo/meta_suffix/mymeta_bar_meta.json"
        );
    }

    #[test]
    fn rejects_empty_file_affixes() {
        let conv = MetaConvention {
            path_prefix: String::new(),
            path_suffix: String::new(),
            file_prefix: String::new(),
            file_suffix: String::new(),
        };
        assert!(conv.check_valid().is_err());
    }
}
