use crate::error::VfsError;

/// A single storage backend mountable into a [`Vfs`](crate::Vfs).
///
/// Providers receive paths already normalized and stripped of their source
/// prefix. All providers are read-only from the engine's point of view;
/// scene content is never written back.
pub trait VfsProvider: Send + Sync + 'static {
    /// Read the entire contents of a file.
    fn read(&self, path: &str) -> Result<Vec<u8>, VfsError>;

    /// Check whether a file exists.
    fn exists(&self, path: &str) -> bool;

    /// List the files under a directory prefix (recursively), as paths
    /// relative to the provider root.
    fn list(&self, prefix: &str) -> Result<Vec<String>, VfsError>;
}
