use std::collections::HashMap;

use crate::shader::ShaderValue;

use super::node::SceneNode;
use super::texture::SpriteAnimation;

/// Sprite animations of a pass, keyed by texture binding index.
pub type SpriteMap = HashMap<usize, SpriteAnimation>;

/// Per-frame uniform population, implemented by the scene-format
/// collaborator.
///
/// Custom-shader passes do not know what any uniform means; they hand the
/// updater an `exists` probe (is this member present in the reflected
/// block?) and an `update` sink (write this member now) and let it fill in
/// whatever the scene format defines: time, pointer position, model
/// matrices, sprite frame data.
pub trait ShaderValueUpdater: Send {
    /// Called once per frame before any pass executes.
    fn frame_begin(&mut self);

    /// Called once per frame after all passes executed.
    fn frame_end(&mut self);

    /// Fill default uniform values for a freshly prepared pass.
    fn init_uniforms(&mut self, node: &SceneNode, exists: &dyn Fn(&str) -> bool) {
        let _ = (node, exists);
    }

    /// Write this pass's per-frame uniform values.
    fn update_uniforms(
        &mut self,
        node: &SceneNode,
        sprites: &mut SpriteMap,
        exists: &dyn Fn(&str) -> bool,
        update: &mut dyn FnMut(&str, ShaderValue),
    );

    /// Pointer moved over the output surface (normalized coordinates).
    fn mouse_input(&mut self, x: f64, y: f64);

    /// The output surface was (re)configured.
    fn set_screen_size(&mut self, width: u32, height: u32);

    /// Texel size of the default render target changed.
    fn set_texel_size(&mut self, x: f32, y: f32) {
        let _ = (x, y);
    }
}

/// Updater that writes nothing. Used when a scene carries no dynamic
/// uniforms, and by tests.
#[derive(Debug, Default)]
pub struct NullShaderValueUpdater;

impl ShaderValueUpdater for NullShaderValueUpdater {
    fn frame_begin(&mut self) {}
    fn frame_end(&mut self) {}
    fn update_uniforms(
        &mut self,
        _node: &SceneNode,
        _sprites: &mut SpriteMap,
        _exists: &dyn Fn(&str) -> bool,
        _update: &mut dyn FnMut(&str, ShaderValue),
    ) {
    }
    fn mouse_input(&mut self, _x: f64, _y: f64) {}
    fn set_screen_size(&mut self, _width: u32, _height: u32) {}
}
