use crate::types::{TextureFormat, TextureSample};

/// How a render target's size is derived.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RenderTargetBind {
    /// The size is fixed at parse time.
    #[default]
    Fixed,
    /// Bound to the output surface size, scaled.
    Screen { scale: f64 },
    /// Bound to another named target's size, scaled.
    Target { name: String, scale: f64 },
}

/// Descriptor of a named render target.
///
/// Targets with `allow_reuse` may share a physical texture with other
/// targets of identical shape once their producer releases them.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub sample: TextureSample,
    pub allow_reuse: bool,
    pub mip_levels: u32,
    pub bind: RenderTargetBind,
}

impl Default for RenderTargetDescriptor {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            format: TextureFormat::Rgba8,
            sample: TextureSample::default(),
            allow_reuse: false,
            mip_levels: 1,
            bind: RenderTargetBind::Fixed,
        }
    }
}

impl RenderTargetDescriptor {
    /// A fixed-size target.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// A target following the output surface size.
    pub fn screen_bound(scale: f64) -> Self {
        Self {
            bind: RenderTargetBind::Screen { scale },
            ..Default::default()
        }
    }

    /// A reusable scratch target with the same shape as this one.
    pub fn reusable_like(&self) -> Self {
        Self {
            allow_reuse: true,
            mip_levels: 1,
            ..self.clone()
        }
    }
}
