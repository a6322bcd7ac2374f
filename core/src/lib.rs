//! # Scenic Core
//!
//! Core crate for the Scenic engine.
//!
//! This crate holds the pieces that the rest of the engine builds on but
//! that carry no graphics knowledge of their own:
//!
//! - [`looper`] - Single-threaded actors with FIFO mailboxes. The engine
//!   runs exactly two of them: a main actor that owns scene loading, and a
//!   render actor that owns the GPU context.
//! - [`timer`] - The adaptive frame timer that paces draw requests, and the
//!   background tick thread it runs on.

pub mod looper;
pub mod timer;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
