//! Compiled-graph executor.
//!
//! [`SceneRenderer`] owns the GPU backend, the texture cache and the
//! compiled pass list. It lives on the render actor thread; nothing here
//! is shared with the main actor.
//!
//! Scene replacement is a compile: the previous graph's passes are
//! destroyed only after the backend drained in-flight work, then the new
//! graph is ordered, release lists are attached, and every pass prepares
//! once. Per frame, prepared passes execute in topological order into one
//! command list; unprepared passes are skipped so a partial failure
//! renders nothing for that pass instead of stopping the loop.

use crate::backend::{FrameEncoder, GpuBackend};
use crate::cache::TextureCache;
use crate::error::GraphicsError;
use crate::graph::RenderGraph;
use crate::passes::{FrameContext, PrepareContext, PresentPass, RenderPass};
use crate::reserved;
use crate::scene::{RenderTargetBind, Scene};
use crate::types::FillMode;

/// Executes compiled render graphs frame by frame.
pub struct SceneRenderer {
    backend: Box<dyn GpuBackend>,
    cache: TextureCache,
    passes: Vec<Box<dyn RenderPass>>,
    present: Option<PresentPass>,
    /// Kept for diagnostics after the passes are extracted.
    graph: Option<RenderGraph>,
    fill_mode: FillMode,
    pass_loaded: bool,
}

impl SceneRenderer {
    pub fn new(backend: Box<dyn GpuBackend>) -> Self {
        log::info!("renderer using {} backend", backend.name());
        Self {
            backend,
            cache: TextureCache::new(),
            passes: Vec::new(),
            present: None,
            graph: None,
            fill_mode: FillMode::default(),
            pass_loaded: false,
        }
    }

    pub fn backend(&self) -> &dyn GpuBackend {
        self.backend.as_ref()
    }

    /// Whether a compiled graph is ready to draw.
    pub fn loaded(&self) -> bool {
        self.pass_loaded
    }

    /// Compile a freshly built graph against its scene.
    ///
    /// Resolves deferred links, sizes bound render targets, orders the
    /// passes, attaches last-read release lists and prepares everything.
    /// The previous graph is torn down first, after the GPU finished any
    /// frame still referencing it.
    pub fn compile(&mut self, scene: &mut Scene, mut graph: RenderGraph) {
        self.pass_loaded = false;
        self.backend.wait_idle();
        self.destroy_passes();

        graph.resolve_deferred();

        let surface = self.backend.surface_size();
        resolve_target_sizes(scene, surface);
        self.fit_cameras(scene);
        scene.shader_updater.set_screen_size(surface.0, surface.1);
        if let Some(rt) = scene.render_targets.get(reserved::DEFAULT_TARGET) {
            if rt.width > 0 && rt.height > 0 {
                scene
                    .shader_updater
                    .set_texel_size(1.0 / rt.width as f32, 1.0 / rt.height as f32);
            }
        }

        let order = graph.topological_order();
        let release = graph.last_read_texs(&order);
        let mut passes = Vec::with_capacity(order.len());
        for (&id, release_keys) in order.iter().zip(release) {
            let Some(mut pass) = graph.take_pass(id) else {
                log::warn!("pass node {id} has no pass object, skipping");
                continue;
            };
            pass.set_release_texs(release_keys);
            passes.push(pass);
        }

        for pass in &mut passes {
            if !pass.prepared() {
                pass.prepare(PrepareContext {
                    scene: &mut *scene,
                    backend: self.backend.as_ref(),
                    cache: &mut self.cache,
                });
                if !pass.prepared() {
                    log::warn!("pass '{}' failed to prepare, will render nothing", pass.name());
                }
            }
        }

        let mut present = PresentPass::new(reserved::DEFAULT_TARGET);
        present.set_fill_mode(self.fill_mode);
        present.prepare(PrepareContext {
            scene: &mut *scene,
            backend: self.backend.as_ref(),
            cache: &mut self.cache,
        });

        log::info!(
            "compiled graph for scene '{}': {} passes",
            scene.id,
            passes.len()
        );
        self.passes = passes;
        self.present = Some(present);
        self.graph = Some(graph);
        self.pass_loaded = true;
    }

    /// Record and submit one frame.
    pub fn draw_frame(&mut self, scene: &mut Scene) -> Result<(), GraphicsError> {
        if !self.pass_loaded {
            return Ok(());
        }
        let mut encoder = FrameEncoder::new();
        for pass in &mut self.passes {
            if pass.prepared() {
                pass.execute(FrameContext {
                    scene: &mut *scene,
                    encoder: &mut encoder,
                });
            }
        }
        if let Some(present) = &mut self.present {
            present.execute(FrameContext {
                scene: &mut *scene,
                encoder: &mut encoder,
            });
        }
        self.backend.submit(encoder)?;
        self.backend.present()
    }

    /// Change how the frame is fitted to the surface and refit cameras.
    pub fn set_fill_mode(&mut self, scene: Option<&mut Scene>, mode: FillMode) {
        self.fill_mode = mode;
        if let Some(present) = &mut self.present {
            present.set_fill_mode(mode);
        }
        if let Some(scene) = scene {
            self.fit_cameras(scene);
        }
    }

    fn fit_cameras(&self, scene: &mut Scene) {
        let (sw, sh) = self.backend.surface_size();
        let [ow, oh] = scene.ortho;
        for camera in scene.cameras.values_mut() {
            camera.fit(ow as f32, oh as f32, sw, sh, self.fill_mode);
        }
    }

    /// The compiled graph as `.dot` text, if one is loaded.
    pub fn graphviz(&self) -> Option<String> {
        self.graph.as_ref().map(RenderGraph::to_graphviz)
    }

    fn destroy_passes(&mut self) {
        for mut pass in self.passes.drain(..) {
            pass.destroy(self.backend.as_ref());
        }
        if let Some(mut present) = self.present.take() {
            present.destroy(self.backend.as_ref());
        }
        self.graph = None;
    }

    /// Tear down all GPU state. Called at actor shutdown.
    pub fn destroy(&mut self) {
        self.pass_loaded = false;
        self.backend.wait_idle();
        self.destroy_passes();
        self.cache.clear();
    }
}

/// Resolve screen-bound and target-bound render target sizes.
fn resolve_target_sizes(scene: &mut Scene, surface: (u32, u32)) {
    for rt in scene.render_targets.values_mut() {
        if let RenderTargetBind::Screen { scale } = rt.bind {
            rt.width = (surface.0 as f64 * scale) as u32;
            rt.height = (surface.1 as f64 * scale) as u32;
        }
    }

    let sizes: std::collections::HashMap<String, (u32, u32)> = scene
        .render_targets
        .iter()
        .map(|(name, rt)| (name.clone(), (rt.width, rt.height)))
        .collect();
    for (name, rt) in scene.render_targets.iter_mut() {
        let RenderTargetBind::Target {
            name: bind_name,
            scale,
        } = &rt.bind
        else {
            continue;
        };
        match sizes.get(bind_name) {
            Some(&(w, h)) => {
                rt.width = (w as f64 * scale) as u32;
                rt.height = (h as f64 * scale) as u32;
            }
            None => log::error!("unknown render target bind '{bind_name}' for '{name}'"),
        }
    }

    for (name, rt) in &scene.render_targets {
        if rt.width * rt.height <= 4 {
            log::error!(
                "degenerate size for render target '{}': {}x{}",
                name,
                rt.width,
                rt.height
            );
        }
    }
}
