//! Pass implementations.
//!
//! Every pass moves through the same lifecycle:
//!
//! ```text
//! Created --prepare()--> Prepared --execute()*--> destroy()
//! ```
//!
//! `prepare` runs exactly once per pass instance, on graph compile: it
//! resolves symbolic texture names through the cache, builds pipelines and
//! allocates fixed GPU objects. `execute` runs once per frame and only
//! updates per-frame uniform data and records draw/copy commands; it must
//! not allocate GPU objects. `destroy` runs when the owning graph is
//! discarded, after the GPU finished the last frame that referenced it.
//!
//! A pass whose `prepare` fails stays unprepared and is skipped by the
//! executor; the failure is logged and retried on the next scene load.

mod copy;
mod custom_shader;
mod present;

pub use copy::CopyPass;
pub use custom_shader::{CustomShaderDesc, CustomShaderPass};
pub use present::PresentPass;

use crate::backend::{FrameEncoder, GpuBackend};
use crate::cache::TextureCache;
use crate::scene::Scene;

/// Everything available while a pass prepares.
pub struct PrepareContext<'a> {
    pub scene: &'a mut Scene,
    pub backend: &'a dyn GpuBackend,
    pub cache: &'a mut TextureCache,
}

/// Everything available while a pass executes one frame.
pub struct FrameContext<'a> {
    pub scene: &'a mut Scene,
    pub encoder: &'a mut FrameEncoder,
}

/// The three-stage pass lifecycle plus the builder's rebind hook.
///
/// Passes live on the render actor thread; `Send` only exists so the
/// (empty) actor state can move onto that thread at startup.
pub trait RenderPass: Send {
    /// Diagnostic name.
    fn name(&self) -> &str;

    /// Resolve bindings and allocate fixed GPU objects. Runs once.
    fn prepare(&mut self, ctx: PrepareContext<'_>);

    /// Record this frame's commands. Must not allocate GPU objects.
    fn execute(&mut self, ctx: FrameContext<'_>);

    /// Release all GPU objects.
    fn destroy(&mut self, backend: &dyn GpuBackend);

    /// Whether `prepare` completed successfully.
    fn prepared(&self) -> bool;

    /// Symbolic names this pass is the last reader of; released to the
    /// reuse pool at the end of `prepare`.
    fn set_release_texs(&mut self, keys: Vec<String>);

    /// Rebind the `index`-th input to a different symbolic name.
    ///
    /// Called by the graph builder when hazard resolution or a deferred
    /// link rewrites what the pass consumes.
    fn rebind_input(&mut self, _index: usize, _key: &str) {}
}

/// Lifecycle state shared by all pass kinds.
#[derive(Debug, Default)]
pub(crate) struct PassState {
    prepared: bool,
    release_texs: Vec<String>,
}

impl PassState {
    pub fn prepared(&self) -> bool {
        self.prepared
    }

    pub fn set_prepared(&mut self) {
        self.prepared = true;
    }

    pub fn set_release_texs(&mut self, keys: Vec<String>) {
        self.release_texs = keys;
    }

    /// Release the last-read names to the reuse pool.
    pub fn release(&self, cache: &mut TextureCache) {
        for key in &self.release_texs {
            cache.mark_share_ready(key);
        }
    }
}
