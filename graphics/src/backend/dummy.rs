//! Headless GPU backend.
//!
//! Allocates nothing and executes nothing, but hands out valid handles and
//! records what it was asked to do. The whole graph pipeline (compile,
//! prepare, per-frame execute) runs against it without hardware, which is
//! how the crate's tests drive the executor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::GraphicsError;

use super::{
    Command, FrameEncoder, GpuBackend, GpuBuffer, GpuPipeline, GpuTexture, GpuTextureDescriptor,
    PipelineDescriptor,
};

/// Counters and captured state shared with test code.
///
/// Cloned out of the backend before it is moved to the render actor, so
/// tests can observe frames from the outside.
#[derive(Debug, Default)]
pub struct DummyState {
    next_id: AtomicU64,
    textures_created: AtomicU64,
    buffers_created: AtomicU64,
    pipelines_created: AtomicU64,
    pipelines_destroyed: AtomicU64,
    frames_submitted: AtomicU64,
    uploads: AtomicU64,
    last_frame: Mutex<Vec<Command>>,
}

impl DummyState {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn textures_created(&self) -> u64 {
        self.textures_created.load(Ordering::SeqCst)
    }

    pub fn buffers_created(&self) -> u64 {
        self.buffers_created.load(Ordering::SeqCst)
    }

    pub fn pipelines_created(&self) -> u64 {
        self.pipelines_created.load(Ordering::SeqCst)
    }

    pub fn pipelines_destroyed(&self) -> u64 {
        self.pipelines_destroyed.load(Ordering::SeqCst)
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> u64 {
        self.uploads.load(Ordering::SeqCst)
    }

    /// The command list of the most recently submitted frame.
    pub fn last_frame(&self) -> Vec<Command> {
        self.last_frame.lock().clone()
    }
}

/// Headless backend with a configurable surface size.
#[derive(Debug)]
pub struct DummyBackend {
    surface: (u32, u32),
    state: Arc<DummyState>,
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl DummyBackend {
    pub fn new(surface_width: u32, surface_height: u32) -> Self {
        Self {
            surface: (surface_width, surface_height),
            state: Arc::new(DummyState::default()),
        }
    }

    /// Shared observation handle for tests.
    pub fn state(&self) -> Arc<DummyState> {
        Arc::clone(&self.state)
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &str {
        "dummy"
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    fn create_texture(
        &self,
        descriptor: &GpuTextureDescriptor,
    ) -> Result<GpuTexture, GraphicsError> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "zero-sized texture '{}'",
                descriptor.label
            )));
        }
        log::trace!(
            "dummy: create texture '{}' ({}x{})",
            descriptor.label,
            descriptor.width,
            descriptor.height
        );
        self.state.textures_created.fetch_add(1, Ordering::SeqCst);
        Ok(GpuTexture::new(self.state.next_id(), descriptor.clone()))
    }

    fn upload_texture(&self, texture: &GpuTexture, data: &[u8]) -> Result<(), GraphicsError> {
        log::trace!(
            "dummy: upload {} bytes to texture {}",
            data.len(),
            texture.id()
        );
        self.state.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn create_buffer(&self, data: &[u8]) -> Result<GpuBuffer, GraphicsError> {
        log::trace!("dummy: create buffer of {} bytes", data.len());
        self.state.buffers_created.fetch_add(1, Ordering::SeqCst);
        Ok(GpuBuffer(self.state.next_id()))
    }

    fn create_pipeline(
        &self,
        descriptor: &PipelineDescriptor,
    ) -> Result<GpuPipeline, GraphicsError> {
        log::trace!("dummy: create pipeline '{}'", descriptor.label);
        self.state.pipelines_created.fetch_add(1, Ordering::SeqCst);
        Ok(GpuPipeline(self.state.next_id()))
    }

    fn destroy_pipeline(&self, pipeline: GpuPipeline) {
        log::trace!("dummy: destroy pipeline {}", pipeline.0);
        self.state.pipelines_destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn submit(&self, encoder: FrameEncoder) -> Result<(), GraphicsError> {
        log::trace!("dummy: submit {} commands", encoder.commands().len());
        self.state.frames_submitted.fetch_add(1, Ordering::SeqCst);
        *self.state.last_frame.lock() = encoder.commands().to_vec();
        Ok(())
    }

    fn present(&self) -> Result<(), GraphicsError> {
        Ok(())
    }

    fn wait_idle(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextureUsage;

    #[test]
    fn test_create_and_observe() {
        let backend = DummyBackend::new(640, 480);
        let state = backend.state();

        let texture = backend
            .create_texture(&GpuTextureDescriptor {
                label: "t".into(),
                width: 16,
                height: 16,
                usage: TextureUsage::SAMPLED | TextureUsage::RENDER_ATTACHMENT,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(state.textures_created(), 1);

        let mut encoder = FrameEncoder::new();
        encoder.begin_render_pass(texture, Some([0.0; 4]));
        encoder.draw(4);
        encoder.end_render_pass();
        backend.submit(encoder).unwrap();

        assert_eq!(state.frames_submitted(), 1);
        assert_eq!(state.last_frame().len(), 3);
    }

    #[test]
    fn test_zero_sized_texture_rejected() {
        let backend = DummyBackend::default();
        let result = backend.create_texture(&GpuTextureDescriptor::default());
        assert!(result.is_err());
    }
}
