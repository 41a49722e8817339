//! Adapter over a zip archive. Member access requires `&mut`, so the open
//! archive handle sits behind a mutex; not thread-safe (spec §5).

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use crate::adapters::StorageAdapter;
use crate::error::DsError;

pub struct ZipDir {
    archive: Mutex<::zip::ZipArchive<File>>,
    /// Trimmed (no trailing slash) names of every member, files and dirs.
    names: BTreeSet<String>,
    /// Trimmed names of members that are directories.
    dirs: BTreeSet<String>,
}

impl ZipDir {
    pub fn open(path: &Path) -> Result<Self, DsError> {
        log::debug!("opening zip archive '{}'", path.display());
        let file = File::open(path)?;
        let mut archive = ::zip::ZipArchive::new(file)
            .map_err(|e| DsError::UnreadableArchive(path.display().to_string(), e.to_string()))?;

        let mut names = BTreeSet::new();
        let mut dirs = BTreeSet::new();
        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|e| DsError::UnreadableArchive(path.display().to_string(), e.to_string()))?;
            let is_dir = entry.is_dir() || entry.name().ends_with('/');
            let trimmed = entry.name().trim_end_matches('/').to_string();
            if is_dir {
                dirs.insert(trimmed.clone());
            }
            names.insert(trimmed);
        }

        Ok(ZipDir {
            archive: Mutex::new(archive),
            names,
            dirs,
        })
    }
}

impl StorageAdapter for ZipDir {
    fn get_paths(&self) -> Result<Vec<String>, DsError> {
        let mut paths = Vec::with_capacity(self.names.len() + 1);
        paths.push(String::new());
        for name in &self.names {
            if !name.is_empty() {
                paths.push(name.clone());
            }
        }
        Ok(paths)
    }

    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        self.dirs.contains(path.trim_end_matches('/'))
    }

    fn is_file(&self, path: &str) -> bool {
        let candidate = path.trim_end_matches('/');
        !candidate.is_empty() && self.names.contains(candidate) && !self.dirs.contains(candidate)
    }

    fn open_file(&self, path: &str) -> Option<Vec<u8>> {
        let mut archive = self.archive.lock().ok()?;
        let mut entry = archive.by_name(path).ok()?;
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).ok()?;
        Some(buf)
    }
}
