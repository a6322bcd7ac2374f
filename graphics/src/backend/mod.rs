//! GPU backend abstraction layer.
//!
//! All GPU API specifics live behind the [`GpuBackend`] trait. The graph
//! executor records a frame as a list of typed [`Command`]s through a
//! [`FrameEncoder`] and hands the finished list to the backend in one
//! submit; resource creation happens only at pass prepare time, never
//! during a frame.
//!
//! The crate ships one implementation, [`DummyBackend`](dummy::DummyBackend):
//! a headless backend that allocates nothing and records what it was asked
//! to do, so the whole graph pipeline runs without hardware. Real backends
//! are external collaborators implementing the same trait.
//!
//! The single-writer rule applies to everything here: resources are
//! created and destroyed exclusively on the render actor's thread.

pub mod dummy;

use std::sync::Arc;

use crate::error::GraphicsError;
use crate::scene::VertexLayout;
use crate::shader::ShaderProgram;
use crate::types::{BlendMode, FillMode, TextureFormat, TextureSample, TextureUsage};

pub use dummy::DummyBackend;

/// Descriptor for creating a GPU texture.
#[derive(Debug, Clone)]
pub struct GpuTextureDescriptor {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub sample: TextureSample,
    pub mip_level_count: u32,
    pub usage: TextureUsage,
}

impl Default for GpuTextureDescriptor {
    fn default() -> Self {
        Self {
            label: String::new(),
            width: 0,
            height: 0,
            format: TextureFormat::Rgba8,
            sample: TextureSample::default(),
            mip_level_count: 1,
            usage: TextureUsage::SAMPLED,
        }
    }
}

#[derive(Debug)]
struct GpuTextureInner {
    id: u64,
    descriptor: GpuTextureDescriptor,
}

/// Handle to a GPU texture. Cheap to clone; the underlying allocation is
/// released when the backend is told to and all handles are gone.
#[derive(Debug, Clone)]
pub struct GpuTexture {
    inner: Arc<GpuTextureInner>,
}

impl GpuTexture {
    /// Construct a handle. Only backends create these.
    pub fn new(id: u64, descriptor: GpuTextureDescriptor) -> Self {
        Self {
            inner: Arc::new(GpuTextureInner { id, descriptor }),
        }
    }

    /// Backend-assigned identity.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn descriptor(&self) -> &GpuTextureDescriptor {
        &self.inner.descriptor
    }

    pub fn width(&self) -> u32 {
        self.inner.descriptor.width
    }

    pub fn height(&self) -> u32 {
        self.inner.descriptor.height
    }

    /// Whether two handles refer to the same allocation.
    pub fn same_allocation(&self, other: &GpuTexture) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Handle to a GPU vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuBuffer(pub u64);

/// Handle to a compiled pipeline (shaders + fixed state + layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuPipeline(pub u64);

/// Descriptor for building a pipeline at pass prepare time.
///
/// Configured fluently, once per pass during prepare:
///
/// ```ignore
/// let desc = PipelineDescriptor::new("glow", shader)
///     .with_vertex_layout(mesh.layout.clone())
///     .with_blend(BlendMode::Additive)
///     .with_color_format(TextureFormat::Rgba8)
///     .with_samplers(2);
/// let pipeline = backend.create_pipeline(&desc)?;
/// ```
#[derive(Debug, Clone)]
pub struct PipelineDescriptor {
    pub label: String,
    pub shader: Arc<ShaderProgram>,
    pub vertex_layout: VertexLayout,
    pub blend: BlendMode,
    pub color_format: TextureFormat,
    pub sampler_count: u32,
}

impl PipelineDescriptor {
    pub fn new(label: impl Into<String>, shader: Arc<ShaderProgram>) -> Self {
        Self {
            label: label.into(),
            shader,
            vertex_layout: VertexLayout::default(),
            blend: BlendMode::default(),
            color_format: TextureFormat::Rgba8,
            sampler_count: 0,
        }
    }

    pub fn with_vertex_layout(mut self, layout: VertexLayout) -> Self {
        self.vertex_layout = layout;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_samplers(mut self, count: u32) -> Self {
        self.sampler_count = count;
        self
    }
}

/// One recorded GPU operation.
#[derive(Debug, Clone)]
pub enum Command {
    /// Full-image copy with barrier transitions on both sides.
    CopyTexture { src: GpuTexture, dst: GpuTexture },
    /// Scaled copy to the output surface honoring the fill mode.
    BlitToSurface { src: GpuTexture, mode: FillMode },
    BeginRenderPass {
        target: GpuTexture,
        clear: Option<[f32; 4]>,
    },
    BindPipeline(GpuPipeline),
    BindTextures(Vec<GpuTexture>),
    BindVertexBuffer(GpuBuffer),
    /// Upload this frame's uniform block contents for a pipeline.
    WriteUniforms { pipeline: GpuPipeline, data: Vec<u8> },
    Draw { vertex_count: u32 },
    EndRenderPass,
}

/// Records the typed command list for one frame.
#[derive(Debug, Default)]
pub struct FrameEncoder {
    commands: Vec<Command>,
}

impl FrameEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn copy_texture(&mut self, src: GpuTexture, dst: GpuTexture) {
        self.commands.push(Command::CopyTexture { src, dst });
    }

    pub fn blit_to_surface(&mut self, src: GpuTexture, mode: FillMode) {
        self.commands.push(Command::BlitToSurface { src, mode });
    }

    pub fn begin_render_pass(&mut self, target: GpuTexture, clear: Option<[f32; 4]>) {
        self.commands.push(Command::BeginRenderPass { target, clear });
    }

    pub fn bind_pipeline(&mut self, pipeline: GpuPipeline) {
        self.commands.push(Command::BindPipeline(pipeline));
    }

    pub fn bind_textures(&mut self, textures: Vec<GpuTexture>) {
        self.commands.push(Command::BindTextures(textures));
    }

    pub fn bind_vertex_buffer(&mut self, buffer: GpuBuffer) {
        self.commands.push(Command::BindVertexBuffer(buffer));
    }

    pub fn write_uniforms(&mut self, pipeline: GpuPipeline, data: Vec<u8>) {
        self.commands.push(Command::WriteUniforms { pipeline, data });
    }

    pub fn draw(&mut self, vertex_count: u32) {
        self.commands.push(Command::Draw { vertex_count });
    }

    pub fn end_render_pass(&mut self) {
        self.commands.push(Command::EndRenderPass);
    }
}

/// Trait implemented by GPU backends.
///
/// Creation methods are called at pass prepare time only; `submit` and
/// `present` once per frame. All calls happen on the render actor thread.
pub trait GpuBackend: Send {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Size of the output surface in pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Create a texture allocation.
    fn create_texture(&self, descriptor: &GpuTextureDescriptor)
        -> Result<GpuTexture, GraphicsError>;

    /// Upload pixel data into an existing texture.
    fn upload_texture(&self, texture: &GpuTexture, data: &[u8]) -> Result<(), GraphicsError>;

    /// Create a vertex buffer from raw bytes.
    fn create_buffer(&self, data: &[u8]) -> Result<GpuBuffer, GraphicsError>;

    /// Build a pipeline from compiled shader stages and fixed state.
    fn create_pipeline(&self, descriptor: &PipelineDescriptor)
        -> Result<GpuPipeline, GraphicsError>;

    /// Release a pipeline. Textures are released by dropping their handles.
    fn destroy_pipeline(&self, pipeline: GpuPipeline);

    /// Execute one frame's command list.
    fn submit(&self, encoder: FrameEncoder) -> Result<(), GraphicsError>;

    /// Present the output surface.
    fn present(&self) -> Result<(), GraphicsError>;

    /// Block until no previously submitted work references GPU objects.
    /// Called before destroying a graph that may still be in flight.
    fn wait_idle(&self);
}

static_assertions::assert_impl_all!(GpuTexture: Send, Sync);
