//! Adapter over an actual directory on disk.

use std::path::PathBuf;

use crate::adapters::StorageAdapter;
use crate::error::DsError;

pub struct RealDir {
    base: PathBuf,
}

impl RealDir {
    pub fn new(base: PathBuf) -> Self {
        RealDir { base }
    }
}

fn to_forward_slash(p: &std::path::Path) -> String {
    p.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl StorageAdapter for RealDir {
    fn get_paths(&self) -> Result<Vec<String>, DsError> {
        let mut rels = Vec::new();
        for entry in walkdir::WalkDir::new(&self.base).min_depth(1) {
            let entry = entry.map_err(|e| {
                DsError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
            })?;
            if entry.path_is_symlink() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.base)
                .expect("walkdir entries are rooted at base");
            rels.push(to_forward_slash(rel));
        }
        rels.sort();

        let mut paths = Vec::with_capacity(rels.len() + 1);
        paths.push(String::new());
        paths.extend(rels);
        Ok(paths)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.base.join(path).is_dir()
    }

    fn is_file(&self, path: &str) -> bool {
        self.base.join(path).is_file()
    }

    fn open_file(&self, path: &str) -> Option<Vec<u8>> {
        std::fs::read(self.base.join(path)).ok()
    }

    fn is_thread_safe(&self) -> bool {
        true
    }
}
