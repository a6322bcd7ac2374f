//! The scene data model.
//!
//! A [`Scene`] is produced by the external scene-format parser on the main
//! actor and moved (ownership transfer, not shared mutation) to the render
//! actor, which keeps it for the lifetime of the compiled graph. Everything
//! in it is plain data except the [`ShaderValueUpdater`] capability object,
//! which the parser supplies to give uniforms their format-specific
//! meaning.
//!
//! The scene graph is an arena: nodes live in a flat vector, children are
//! ID lists, and the parent link is a plain ID used for lookup only.

mod camera;
mod effect;
mod material;
mod node;
mod render_target;
mod texture;
mod updater;

pub use camera::Camera;
pub use effect::{EffectCommand, ImageEffectLayer, SceneImageEffect};
pub use material::{Material, Mesh, VertexAttribute, VertexLayout};
pub use node::{SceneGraph, SceneNode, SceneNodeId, Transform};
pub use render_target::{RenderTargetBind, RenderTargetDescriptor};
pub use texture::{Image, SceneTexture, SpriteAnimation, SpriteFrame};
pub use updater::{NullShaderValueUpdater, ShaderValueUpdater, SpriteMap};

use std::collections::HashMap;

use scenic_vfs::Vfs;

use crate::reserved;

/// A parsed, renderable scene.
pub struct Scene {
    /// Identity of the loaded scene source, for logs.
    pub id: String,
    /// Content lookup for everything this scene references. Owned by the
    /// scene; there is no global filesystem state.
    pub vfs: Vfs,
    pub graph: SceneGraph,
    /// Named textures with their decoded images and sprite metadata.
    pub textures: HashMap<String, SceneTexture>,
    /// Named render-target descriptors.
    pub render_targets: HashMap<String, RenderTargetDescriptor>,
    pub cameras: HashMap<String, Camera>,
    pub shader_updater: Box<dyn ShaderValueUpdater>,
    /// Authored scene size (width, height).
    pub ortho: [u32; 2],
    pub clear_color: [f32; 4],
    /// Seconds of animation time accumulated so far.
    pub elapsed_time: f64,
    /// Cost of the previous frame in seconds.
    pub frame_time: f64,
}

impl Scene {
    /// Create an empty scene owning `vfs`.
    ///
    /// The default render target is pre-registered, bound to the output
    /// surface at scale 1.
    pub fn new(id: impl Into<String>, vfs: Vfs) -> Self {
        let mut render_targets = HashMap::new();
        render_targets.insert(
            reserved::DEFAULT_TARGET.to_string(),
            RenderTargetDescriptor::screen_bound(1.0),
        );
        Self {
            id: id.into(),
            vfs,
            graph: SceneGraph::new(),
            textures: HashMap::new(),
            render_targets,
            cameras: HashMap::new(),
            shader_updater: Box::new(NullShaderValueUpdater),
            ortho: [1920, 1080],
            clear_color: [0.0, 0.0, 0.0, 1.0],
            elapsed_time: 0.0,
            frame_time: 0.0,
        }
    }

    /// Record the cost of the frame that just finished.
    pub fn pass_frame_time(&mut self, dt: f64) {
        self.frame_time = dt;
        self.elapsed_time += dt;
    }
}

static_assertions::assert_impl_all!(Scene: Send);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scene_has_default_target() {
        let scene = Scene::new("test", Vfs::new());
        assert!(scene.render_targets.contains_key(reserved::DEFAULT_TARGET));
    }

    #[test]
    fn test_frame_time_accumulates() {
        let mut scene = Scene::new("test", Vfs::new());
        scene.pass_frame_time(0.1);
        scene.pass_frame_time(0.2);
        assert!((scene.elapsed_time - 0.3).abs() < 1e-9);
        assert!((scene.frame_time - 0.2).abs() < 1e-9);
    }
}
