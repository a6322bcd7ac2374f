//! # Scenic Graphics
//!
//! Render-graph compiler/executor for the Scenic engine.
//!
//! ## Overview
//!
//! This crate turns a parsed [`Scene`](scene::Scene) into a per-frame DAG
//! of GPU passes and runs it:
//!
//! - [`graph`] - The dependency graph, versioned texture resources and the
//!   builder with automatic hazard resolution and deferred linking
//! - [`compiler`] - Walks the scene and emits the pass/resource graph
//! - [`renderer`] - Orders, prepares and executes the compiled passes
//! - [`cache`] - Content-addressed texture cache and reuse pool
//! - [`backend`] - The GPU seam: a trait plus a headless implementation
//! - [`passes`] - Copy, custom-shader and present passes
//!
//! Everything in this crate runs on the render actor's thread; the only
//! value that crosses threads is the `Scene` itself, moved in whole.
//!
//! ## Example
//!
//! ```
//! use scenic_graphics::backend::DummyBackend;
//! use scenic_graphics::compiler::scene_to_graph;
//! use scenic_graphics::renderer::SceneRenderer;
//! use scenic_graphics::scene::Scene;
//! use scenic_vfs::Vfs;
//!
//! let mut scene = Scene::new("demo", Vfs::new());
//! let graph = scene_to_graph(&mut scene);
//! let mut renderer = SceneRenderer::new(Box::new(DummyBackend::default()));
//! renderer.compile(&mut scene, graph);
//! renderer.draw_frame(&mut scene).unwrap();
//! ```

pub mod backend;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod graph;
pub mod passes;
pub mod renderer;
pub mod reserved;
pub mod scene;
pub mod shader;
pub mod types;

pub use backend::{DummyBackend, FrameEncoder, GpuBackend};
pub use cache::{TextureCache, TextureKey};
pub use compiler::scene_to_graph;
pub use error::GraphicsError;
pub use graph::{RenderGraph, RenderGraphBuilder};
pub use renderer::SceneRenderer;
pub use scene::Scene;
pub use types::{BlendMode, FillMode, TextureFormat};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_render_graph_creation() {
        let graph = RenderGraph::new();
        assert_eq!(graph.node_count(), 0);
    }
}
