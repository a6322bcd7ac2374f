use std::collections::HashMap;

use crate::error::VfsError;
use crate::path;
use crate::provider::VfsProvider;

/// Virtual file system that routes paths to mounted providers.
///
/// Paths are structured as `"source_name/rest/of/path"`. The first path
/// segment selects the provider. If no source name matches, the default
/// source (if set) is tried with the full path.
///
/// A `Vfs` instance is owned by the scene that was loaded through it and
/// travels with it; there is no process-wide filesystem state.
///
/// # Example
///
/// ```
/// use scenic_vfs::{MemoryProvider, Vfs};
///
/// let provider = MemoryProvider::new();
/// provider.insert("scene.json", b"{}".to_vec());
///
/// let mut vfs = Vfs::new();
/// vfs.mount("assets", provider);
/// vfs.set_default("assets");
///
/// assert_eq!(vfs.read("assets/scene.json").unwrap(), b"{}");
/// assert_eq!(vfs.read("scene.json").unwrap(), b"{}");
/// ```
#[derive(Default)]
pub struct Vfs {
    sources: HashMap<String, Box<dyn VfsProvider>>,
    default_source: Option<String>,
}

impl Vfs {
    /// Create an empty VFS with no mounted sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a provider under the given source name.
    ///
    /// Mounting under an existing name stacks the new provider in front:
    /// lookups try the newest mount first and fall back to older ones.
    pub fn mount(&mut self, name: impl Into<String>, provider: impl VfsProvider) {
        let name = name.into();
        let provider: Box<dyn VfsProvider> = Box::new(provider);
        match self.sources.remove(&name) {
            Some(existing) => {
                self.sources
                    .insert(name, Box::new(Stacked(provider, existing)));
            }
            None => {
                self.sources.insert(name, provider);
            }
        }
    }

    /// Whether a provider is mounted under `name`.
    pub fn is_mounted(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Set the default source name used when a path does not match any mount.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_source = Some(name.into());
    }

    fn resolve<'a>(&'a self, raw: &str) -> Result<(&'a dyn VfsProvider, String), VfsError> {
        let normalized = path::normalize(raw)?;
        let (source, rest) = path::split_source(&normalized);
        if let Some(provider) = self.sources.get(source) {
            if !rest.is_empty() {
                return Ok((provider.as_ref(), rest.to_string()));
            }
        }
        if let Some(default) = &self.default_source {
            if let Some(provider) = self.sources.get(default) {
                return Ok((provider.as_ref(), normalized));
            }
        }
        Err(VfsError::NoSuchSource(source.to_string()))
    }

    /// Read the entire contents of a file.
    pub fn read(&self, raw_path: &str) -> Result<Vec<u8>, VfsError> {
        let (provider, resolved) = self.resolve(raw_path)?;
        provider.read(&resolved)
    }

    /// Read a file as UTF-8 text.
    pub fn read_to_string(&self, raw_path: &str) -> Result<String, VfsError> {
        let bytes = self.read(raw_path)?;
        String::from_utf8(bytes).map_err(|e| VfsError::InvalidPath(e.to_string()))
    }

    /// Check whether a file exists.
    pub fn contains(&self, raw_path: &str) -> bool {
        match self.resolve(raw_path) {
            Ok((provider, resolved)) => provider.exists(&resolved),
            Err(_) => false,
        }
    }

    /// List files under a directory prefix.
    pub fn list(&self, raw_path: &str) -> Result<Vec<String>, VfsError> {
        let (provider, resolved) = self.resolve(raw_path)?;
        provider.list(&resolved)
    }
}

/// Two providers mounted under the same name; the front one wins.
struct Stacked(Box<dyn VfsProvider>, Box<dyn VfsProvider>);

impl VfsProvider for Stacked {
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError> {
        match self.0.read(path) {
            Err(VfsError::NotFound(_)) => self.1.read(path),
            other => other,
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.0.exists(path) || self.1.exists(path)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, VfsError> {
        let mut result = self.0.list(prefix).unwrap_or_default();
        result.extend(self.1.list(prefix).unwrap_or_default());
        result.sort();
        result.dedup();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProvider;

    #[test]
    fn test_routes_by_source_name() {
        let assets = MemoryProvider::new();
        assets.insert("a.txt", b"assets".to_vec());
        let builtin = MemoryProvider::new();
        builtin.insert("a.txt", b"builtin".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("assets", assets);
        vfs.mount("builtin", builtin);

        assert_eq!(vfs.read("assets/a.txt").unwrap(), b"assets");
        assert_eq!(vfs.read("builtin/a.txt").unwrap(), b"builtin");
        assert!(matches!(
            vfs.read("unknown/a.txt"),
            Err(VfsError::NoSuchSource(_))
        ));
    }

    #[test]
    fn test_default_source_fallback() {
        let assets = MemoryProvider::new();
        assets.insert("tex/a.png", vec![1]);

        let mut vfs = Vfs::new();
        vfs.mount("assets", assets);
        assert!(!vfs.contains("tex/a.png"));

        vfs.set_default("assets");
        assert!(vfs.contains("tex/a.png"));
        assert_eq!(vfs.read("tex/a.png").unwrap(), vec![1]);
    }

    #[test]
    fn test_stacked_mounts_prefer_newest() {
        let base = MemoryProvider::new();
        base.insert("a.txt", b"base".to_vec());
        base.insert("only-base.txt", b"base".to_vec());
        let overlay = MemoryProvider::new();
        overlay.insert("a.txt", b"overlay".to_vec());

        let mut vfs = Vfs::new();
        vfs.mount("assets", base);
        vfs.mount("assets", overlay);

        assert_eq!(vfs.read("assets/a.txt").unwrap(), b"overlay");
        assert_eq!(vfs.read("assets/only-base.txt").unwrap(), b"base");
    }
}
