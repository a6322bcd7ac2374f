use thiserror::Error;

/// Errors that can occur during virtual file system operations.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The requested path was not found in the provider.
    #[error("not found: {0}")]
    NotFound(String),
    /// An IO error occurred while accessing a provider.
    #[error("IO error: {0}")]
    Io(std::io::Error),
    /// The path is invalid (empty, contains `..`, or other normalization failure).
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// No provider is mounted at the given source name.
    #[error("no such source: {0}")]
    NoSuchSource(String),
    /// A packed archive is malformed.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),
}

impl From<std::io::Error> for VfsError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            VfsError::NotFound(err.to_string())
        } else {
            VfsError::Io(err)
        }
    }
}
