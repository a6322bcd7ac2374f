//! Seam to the external scene-format parser.

use scenic_graphics::scene::Scene;
use scenic_vfs::Vfs;
use thiserror::Error;

/// Error returned by a [`SceneParser`].
#[derive(Debug, Error)]
#[error("scene parse failed: {0}")]
pub struct ParseError(pub String);

/// Turns a declarative scene document into a [`Scene`] object graph.
///
/// Implemented by the scene-format collaborator and injected into the
/// [`Player`](crate::Player). The parser runs on the main actor thread and
/// receives ownership of the VFS the player assembled for the source; the
/// returned scene keeps that VFS for later content lookups.
pub trait SceneParser: Send + 'static {
    /// Parse the scene whose entry document is `entry` inside `vfs`.
    fn parse(&mut self, entry: &str, vfs: Vfs) -> Result<Scene, ParseError>;
}
