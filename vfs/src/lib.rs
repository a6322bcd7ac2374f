//! Virtual file system abstraction for the Scenic engine.
//!
//! Provides a unified API for reading scene content from multiple storage
//! backends through the [`VfsProvider`] trait and the [`Vfs`] router.
//!
//! There is deliberately no global filesystem state: every loaded scene
//! owns its own `Vfs` instance and passes it by reference to whatever
//! collaborator needs content lookup.
//!
//! # Providers
//!
//! - [`MemoryProvider`] - In-memory storage for tests and embedded content
//! - [`FileSystemProvider`] - A directory on the native filesystem
//! - [`PkgProvider`] - A packed scene archive (version string, entry table,
//!   raw file data), read lazily from disk
//!
//! Custom providers can implement the [`VfsProvider`] trait for other
//! storage backends.

mod error;
mod filesystem;
mod memory;
pub mod path;
mod pkg;
mod provider;
mod vfs;

pub use error::VfsError;
pub use filesystem::FileSystemProvider;
pub use memory::MemoryProvider;
pub use pkg::PkgProvider;
pub use provider::VfsProvider;
pub use vfs::Vfs;
