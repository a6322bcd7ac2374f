//! Plain value types shared across the graphics crate.

use bitflags::bitflags;

/// Pixel format of a texture or render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit single channel.
    R8,
    /// 8-bit two channel.
    Rg8,
    /// 8-bit RGBA.
    #[default]
    Rgba8,
    /// BC1 block compression.
    Bc1,
    /// BC2 block compression.
    Bc2,
    /// BC3 block compression.
    Bc3,
}

impl TextureFormat {
    /// Bytes per pixel for uncompressed formats, or per block for
    /// block-compressed ones.
    pub fn bytes_per_unit(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rg8 => 2,
            TextureFormat::Rgba8 => 4,
            TextureFormat::Bc1 => 8,
            TextureFormat::Bc2 | TextureFormat::Bc3 => 16,
        }
    }
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Texture filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

/// Wrap and filter configuration for sampling a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureSample {
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub mag_filter: TextureFilter,
    pub min_filter: TextureFilter,
}

/// Coarse usage class of a texture allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureUsageClass {
    #[default]
    Color,
    Depth,
}

bitflags! {
    /// Fine-grained backend usage flags for a texture allocation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        const SAMPLED = 1 << 0;
        const RENDER_ATTACHMENT = 1 << 1;
        const COPY_SRC = 1 << 2;
        const COPY_DST = 1 << 3;
    }
}

/// How a pass blends its output over the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    Disable,
    #[default]
    Normal,
    Translucent,
    Additive,
}

/// How the finished frame is fitted to the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Stretch to fill, ignoring aspect ratio.
    Stretch,
    /// Fit inside the surface, letterboxing as needed.
    Aspect,
    /// Fill the surface, cropping as needed.
    #[default]
    AspectCrop,
}

impl FillMode {
    /// Decode the wire value used by the host property bag.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(FillMode::Stretch),
            1 => Some(FillMode::Aspect),
            2 => Some(FillMode::AspectCrop),
            _ => None,
        }
    }
}
