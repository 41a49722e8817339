//! Uniform view over a directory-like source: enumerate paths, classify
//! file/dir, open bytes, decode JSON. See spec §4.2.

use std::path::Path;

use crate::error::DsError;
use crate::json::parse::loads_json_or_yaml;

pub mod real;
pub mod zip;

#[cfg(feature = "hdf5-adapter")]
pub mod hdf5;

pub use real::RealDir;
pub use zip::ZipDir;

#[cfg(feature = "hdf5-adapter")]
pub use hdf5::H5Dir;

/// A directory-like source of entities to validate: real directories, zip
/// archives, and (behind the `hdf5-adapter` feature) HDF5 files.
pub trait StorageAdapter: Send + Sync {
    /// Every enumerable path, root (`""`) included exactly once, in
    /// deterministic (lexicographic) order. Symbolic links are skipped.
    fn get_paths(&self) -> Result<Vec<String>, DsError>;

    /// Whether `path` behaves like a directory. The root is always a
    /// directory.
    fn is_dir(&self, path: &str) -> bool;

    /// Whether `path` behaves like a file. Mutually exclusive with
    /// [`StorageAdapter::is_dir`] for any given path.
    fn is_file(&self, path: &str) -> bool;

    /// Read `path`'s full contents, or `None` if it cannot be read as a file
    /// (missing, wrong kind, I/O error).
    fn open_file(&self, path: &str) -> Option<Vec<u8>>;

    /// Decode `data` (opened from `path`) as JSON, falling back to YAML.
    /// HDF5 overrides this to special-case plain strings vs. structured
    /// metadata (spec §4.2.3).
    fn decode_json(&self, data: &[u8], _path: &str) -> Option<serde_json::Value> {
        let text = std::str::from_utf8(data).ok()?;
        loads_json_or_yaml(text).ok()
    }

    /// `open_file` then `decode_json`.
    fn load_meta(&self, path: &str) -> Option<serde_json::Value> {
        let data = self.open_file(path)?;
        self.decode_json(&data, path)
    }

    /// Whether concurrent calls from multiple threads are safe. `RealDir` is;
    /// archive/HDF5 handles typically are not (spec §5).
    fn is_thread_safe(&self) -> bool {
        false
    }
}

/// Pick an adapter for `path` based on whether it's a directory, or a file's
/// extension (`.zip`, `.h5`/`.hdf5`).
pub fn get_adapter_for(path: &Path) -> Result<Box<dyn StorageAdapter>, DsError> {
    if path.is_dir() {
        return Ok(Box::new(RealDir::new(path.to_path_buf())));
    }

    if path.is_file() {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if name.ends_with("zip") {
            return Ok(Box::new(ZipDir::open(path)?));
        }
        if name.ends_with("h5") || name.ends_with("hdf5") {
            #[cfg(feature = "hdf5-adapter")]
            {
                return Ok(Box::new(H5Dir::open(path)?));
            }
            #[cfg(not(feature = "hdf5-adapter"))]
            {
                return Err(DsError::Hdf5NotEnabled);
            }
        }
    }

    Err(DsError::UnsupportedAdapterPath(path.display().to_string()))
}
