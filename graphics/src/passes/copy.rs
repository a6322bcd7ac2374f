//! Full-image resource copy pass.

use crate::backend::{GpuBackend, GpuTexture};
use crate::cache::TextureKey;
use crate::reserved;

use super::{FrameContext, PassState, PrepareContext, RenderPass};

/// Copies one engine-managed target into another.
///
/// Inserted by the builder's self-write hazard resolution, by effect
/// chains that snapshot a buffer, and by deferred links.
#[derive(Debug)]
pub struct CopyPass {
    src: String,
    dst: String,
    src_tex: Option<GpuTexture>,
    dst_tex: Option<GpuTexture>,
    state: PassState,
}

impl CopyPass {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            src_tex: None,
            dst_tex: None,
            state: PassState::default(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }
}

impl RenderPass for CopyPass {
    fn name(&self) -> &str {
        "copy"
    }

    fn prepare(&mut self, ctx: PrepareContext<'_>) {
        if !reserved::is_reserved(&self.src) || !reserved::is_reserved(&self.dst) {
            log::error!(
                "copy pass requires engine targets, got '{}' -> '{}'",
                self.src,
                self.dst
            );
            return;
        }
        // The destination inherits the source target's shape.
        let Some(rt) = ctx.scene.render_targets.get(&self.src).cloned() else {
            log::warn!("copy source target '{}' not found, skipping", self.src);
            return;
        };
        ctx.scene
            .render_targets
            .entry(self.dst.clone())
            .or_insert_with(|| rt.clone());

        let content = TextureKey::from_render_target(&rt);
        let persist = !rt.allow_reuse;
        let src_tex = ctx.cache.query(ctx.backend, &self.src, content, persist);
        let dst_tex = ctx.cache.query(ctx.backend, &self.dst, content, persist);
        match (src_tex, dst_tex) {
            (Ok(src), Ok(dst)) => {
                self.src_tex = Some(src);
                self.dst_tex = Some(dst);
            }
            (src, dst) => {
                if let Err(e) = src.and(dst) {
                    log::error!("copy pass allocation failed: {e}");
                }
                return;
            }
        }

        self.state.release(ctx.cache);
        self.state.set_prepared();
    }

    fn execute(&mut self, ctx: FrameContext<'_>) {
        let (Some(src), Some(dst)) = (&self.src_tex, &self.dst_tex) else {
            return;
        };
        ctx.encoder.copy_texture(src.clone(), dst.clone());
    }

    fn destroy(&mut self, _backend: &dyn GpuBackend) {
        self.src_tex = None;
        self.dst_tex = None;
    }

    fn prepared(&self) -> bool {
        self.state.prepared()
    }

    fn set_release_texs(&mut self, keys: Vec<String>) {
        self.state.set_release_texs(keys);
    }

    fn rebind_input(&mut self, index: usize, key: &str) {
        if index == 0 {
            self.src = key.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Command, DummyBackend, FrameEncoder};
    use crate::cache::TextureCache;
    use crate::scene::{RenderTargetDescriptor, Scene};
    use scenic_vfs::Vfs;

    fn prepared_copy(scene: &mut Scene) -> (CopyPass, DummyBackend, TextureCache) {
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();
        scene
            .render_targets
            .insert("_rt_a".into(), RenderTargetDescriptor::sized(64, 64));

        let mut pass = CopyPass::new("_rt_a", "_rt_b");
        pass.prepare(PrepareContext {
            scene,
            backend: &backend,
            cache: &mut cache,
        });
        (pass, backend, cache)
    }

    #[test]
    fn test_prepare_propagates_target_shape() {
        let mut scene = Scene::new("test", Vfs::new());
        let (pass, _backend, _cache) = prepared_copy(&mut scene);
        assert!(pass.prepared());
        assert_eq!(
            scene.render_targets.get("_rt_b"),
            scene.render_targets.get("_rt_a")
        );
    }

    #[test]
    fn test_execute_records_copy() {
        let mut scene = Scene::new("test", Vfs::new());
        let (mut pass, _backend, _cache) = prepared_copy(&mut scene);

        let mut encoder = FrameEncoder::new();
        pass.execute(FrameContext {
            scene: &mut scene,
            encoder: &mut encoder,
        });
        assert!(matches!(
            encoder.commands(),
            [Command::CopyTexture { src, dst }] if !src.same_allocation(dst)
        ));
    }

    #[test]
    fn test_missing_source_degrades() {
        let mut scene = Scene::new("test", Vfs::new());
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();
        let mut pass = CopyPass::new("_rt_missing", "_rt_b");
        pass.prepare(PrepareContext {
            scene: &mut scene,
            backend: &backend,
            cache: &mut cache,
        });
        assert!(!pass.prepared());

        // An unprepared pass records nothing.
        let mut encoder = FrameEncoder::new();
        pass.execute(FrameContext {
            scene: &mut scene,
            encoder: &mut encoder,
        });
        assert!(encoder.commands().is_empty());
    }

    #[test]
    fn test_imported_source_rejected() {
        let mut scene = Scene::new("test", Vfs::new());
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();
        let mut pass = CopyPass::new("textures/a.png", "_rt_b");
        pass.prepare(PrepareContext {
            scene: &mut scene,
            backend: &backend,
            cache: &mut cache,
        });
        assert!(!pass.prepared());
    }
}
