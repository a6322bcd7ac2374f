//! Final presentation pass.

use crate::backend::{GpuBackend, GpuTexture};
use crate::cache::TextureKey;
use crate::types::FillMode;

use super::{FrameContext, PassState, PrepareContext, RenderPass};

/// Blits the composed default target onto the output surface.
///
/// Appended by the executor after every compiled graph; it is not part of
/// the scene-derived pass set.
#[derive(Debug)]
pub struct PresentPass {
    source: String,
    fill_mode: FillMode,
    source_tex: Option<GpuTexture>,
    state: PassState,
}

impl PresentPass {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fill_mode: FillMode::default(),
            source_tex: None,
            state: PassState::default(),
        }
    }

    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.fill_mode = mode;
    }
}

impl RenderPass for PresentPass {
    fn name(&self) -> &str {
        "present"
    }

    fn prepare(&mut self, ctx: PrepareContext<'_>) {
        let Some(rt) = ctx.scene.render_targets.get(&self.source) else {
            log::warn!("present source '{}' not found", self.source);
            return;
        };
        let content = TextureKey::from_render_target(rt);
        // The frame source must never be reassigned under us.
        match ctx.cache.query(ctx.backend, &self.source, content, true) {
            Ok(texture) => self.source_tex = Some(texture),
            Err(e) => {
                log::error!("present source allocation failed: {e}");
                return;
            }
        }
        self.state.set_prepared();
    }

    fn execute(&mut self, ctx: FrameContext<'_>) {
        let Some(source) = &self.source_tex else {
            return;
        };
        ctx.encoder.blit_to_surface(source.clone(), self.fill_mode);
    }

    fn destroy(&mut self, _backend: &dyn GpuBackend) {
        self.source_tex = None;
    }

    fn prepared(&self) -> bool {
        self.state.prepared()
    }

    fn set_release_texs(&mut self, keys: Vec<String>) {
        self.state.set_release_texs(keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, DummyBackend, FrameEncoder};
    use crate::cache::TextureCache;
    use crate::reserved;
    use crate::scene::{RenderTargetDescriptor, Scene};
    use scenic_vfs::Vfs;

    #[test]
    fn test_present_blits_default_target() {
        let mut scene = Scene::new("test", Vfs::new());
        scene.render_targets.insert(
            reserved::DEFAULT_TARGET.into(),
            RenderTargetDescriptor::sized(320, 200),
        );
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        let mut pass = PresentPass::new(reserved::DEFAULT_TARGET);
        pass.set_fill_mode(FillMode::Aspect);
        pass.prepare(PrepareContext {
            scene: &mut scene,
            backend: &backend,
            cache: &mut cache,
        });
        assert!(pass.prepared());

        let mut encoder = FrameEncoder::new();
        pass.execute(FrameContext {
            scene: &mut scene,
            encoder: &mut encoder,
        });
        assert!(matches!(
            encoder.commands(),
            [Command::BlitToSurface {
                mode: FillMode::Aspect,
                ..
            }]
        ));
    }
}
