use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ObjectStore, StoreError};

/// Filesystem-backed store rooted at a directory; keys map to relative paths.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn collect_files(&self, dir: &Path, out: &mut Vec<String>) -> Result<(), StoreError> {
        let entries = std::fs::read_dir(dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                self.collect_files(&path, out)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(key);
            }
        }
        Ok(())
    }
}

impl ObjectStore for LocalStore {
    fn list_files(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.resolve(prefix);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        self.collect_files(&dir, &mut keys)?;
        keys.sort();
        debug!(prefix, count = keys.len(), "listed stored files");
        Ok(keys)
    }

    fn read_to_string(&self, path: &str) -> Result<String, StoreError> {
        let full = self.resolve(path);
        if !full.exists() {
            return Err(StoreError::NotFound {
                path: path.to_string(),
            });
        }
        std::fs::read_to_string(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::InvalidData {
                StoreError::NotText {
                    path: path.to_string(),
                }
            } else {
                StoreError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }

    fn put(&self, path: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: path.to_string(),
                source,
            })?;
        }
        std::fs::write(&full, bytes).map_err(|source| StoreError::Io {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_lists_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        store
            .put("clinical-data/17/donor.tsv", b"study_id\nST0001\n")
            .unwrap();
        store
            .put("clinical-data/17/study.tsv", b"study_id\nST0001\n")
            .unwrap();
        store.put("rules/5.12/rule.json", b"{}").unwrap();

        let keys = store.list_files("clinical-data/17").unwrap();
        assert_eq!(
            keys,
            vec![
                "clinical-data/17/donor.tsv".to_string(),
                "clinical-data/17/study.tsv".to_string(),
            ]
        );

        let content = store.read_to_string("clinical-data/17/donor.tsv").unwrap();
        assert!(content.starts_with("study_id"));
    }

    #[test]
    fn missing_prefix_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.list_files("nothing/here").unwrap().is_empty());
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let err = store.read_to_string("absent.tsv").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
