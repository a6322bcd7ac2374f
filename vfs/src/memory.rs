use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::VfsError;
use crate::provider::VfsProvider;

/// In-memory provider for tests and embedded content.
#[derive(Default)]
pub struct MemoryProvider {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), data.into());
    }
}

impl VfsProvider for MemoryProvider {
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.read().contains_key(path)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, VfsError> {
        let files = self.files.read();
        let mut result: Vec<String> = files
            .keys()
            .filter(|k| prefix.is_empty() || k.starts_with(&format!("{prefix}/")))
            .cloned()
            .collect();
        result.sort();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_exists() {
        let provider = MemoryProvider::new();
        provider.insert("scene.json", b"{}".to_vec());
        assert!(provider.exists("scene.json"));
        assert!(!provider.exists("missing.json"));
        assert_eq!(provider.read("scene.json").unwrap(), b"{}");
        assert!(matches!(
            provider.read("missing.json"),
            Err(VfsError::NotFound(_))
        ));
    }

    #[test]
    fn test_list() {
        let provider = MemoryProvider::new();
        provider.insert("tex/a.png", vec![1]);
        provider.insert("tex/b.png", vec![2]);
        provider.insert("scene.json", vec![3]);
        assert_eq!(provider.list("tex").unwrap(), vec!["tex/a.png", "tex/b.png"]);
        assert_eq!(provider.list("").unwrap().len(), 3);
    }
}
