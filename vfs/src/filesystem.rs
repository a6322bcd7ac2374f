use std::path::{Path, PathBuf};

use crate::error::VfsError;
use crate::provider::VfsProvider;

/// Provider backed by a directory on the native filesystem.
pub struct FileSystemProvider {
    root: PathBuf,
}

impl FileSystemProvider {
    /// Create a provider rooted at `root`. The directory does not have to
    /// exist yet; lookups against a missing root simply miss.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for segment in path.split('/') {
            full.push(segment);
        }
        full
    }

    fn collect(dir: &Path, base: &Path, out: &mut Vec<String>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                Self::collect(&path, base, out)?;
            } else if let Ok(rel) = path.strip_prefix(base) {
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(())
    }
}

impl VfsProvider for FileSystemProvider {
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        Ok(std::fs::read(self.resolve(path))?)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, VfsError> {
        let dir = self.resolve(prefix);
        let mut out = Vec::new();
        Self::collect(&dir, &self.root, &mut out)?;
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_from_directory() {
        let dir = std::env::temp_dir().join("scenic-vfs-fs-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("hello.txt"), b"hi").unwrap();

        let provider = FileSystemProvider::new(&dir);
        assert!(provider.exists("hello.txt"));
        assert_eq!(provider.read("hello.txt").unwrap(), b"hi");
        assert!(matches!(
            provider.read("nope.txt"),
            Err(VfsError::NotFound(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
