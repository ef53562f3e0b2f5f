use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::{ObjectStore, StoreError};

/// In-memory store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for MemoryStore {
    fn list_files(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        let normalized = prefix.trim_end_matches('/');
        Ok(objects
            .keys()
            .filter(|key| {
                key.strip_prefix(normalized)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
            .cloned()
            .collect())
    }

    fn read_to_string(&self, path: &str) -> Result<String, StoreError> {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        let bytes = objects.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        String::from_utf8(bytes.clone()).map_err(|_| StoreError::NotText {
            path: path.to_string(),
        })
    }

    fn put(&self, path: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_matching_is_path_aware() {
        let store = MemoryStore::new();
        store.put("rules/5.12/a.json", b"{}").unwrap();
        store.put("rules/5.12.1/b.json", b"{}").unwrap();

        let keys = store.list_files("rules/5.12").unwrap();
        assert_eq!(keys, vec!["rules/5.12/a.json".to_string()]);
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let store = MemoryStore::new();
        store.put("blob.bin", &[0xff, 0xfe]).unwrap();
        let err = store.read_to_string("blob.bin").unwrap_err();
        assert!(matches!(err, StoreError::NotText { .. }));
    }
}
