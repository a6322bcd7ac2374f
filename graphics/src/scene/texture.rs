use std::sync::Arc;

use crate::types::{TextureFormat, TextureSample};

/// Decoded image data handed over by the scene parser.
///
/// `id` is the stable identity of the source (typically the content path);
/// repeated uploads of the same id are deduplicated by the texture cache.
/// Sprite sheets carry one data slot per sheet image.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub sample: TextureSample,
    pub slots: Vec<Vec<u8>>,
}

impl Image {
    /// A single-slot image.
    pub fn new(id: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            format: TextureFormat::Rgba8,
            sample: TextureSample::default(),
            slots: vec![data],
        }
    }
}

/// One frame of a sprite animation.
#[derive(Debug, Clone, Copy)]
pub struct SpriteFrame {
    /// Which image slot this frame samples from.
    pub image_index: usize,
    /// Seconds this frame stays visible.
    pub duration: f32,
    /// UV rectangle inside the slot.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Frame-sequence metadata for an animated (sprite) texture.
#[derive(Debug, Clone, Default)]
pub struct SpriteAnimation {
    pub frames: Vec<SpriteFrame>,
    current: usize,
    elapsed: f32,
}

impl SpriteAnimation {
    pub fn new(frames: Vec<SpriteFrame>) -> Self {
        Self {
            frames,
            current: 0,
            elapsed: 0.0,
        }
    }

    /// Advance the animation by `dt` seconds and return the current frame.
    pub fn tick(&mut self, dt: f32) -> Option<&SpriteFrame> {
        if self.frames.is_empty() {
            return None;
        }
        self.elapsed += dt;
        loop {
            let duration = self.frames[self.current].duration.max(1e-6);
            if self.elapsed < duration {
                break;
            }
            self.elapsed -= duration;
            self.current = (self.current + 1) % self.frames.len();
        }
        Some(&self.frames[self.current])
    }

    /// The current frame without advancing.
    pub fn current(&self) -> Option<&SpriteFrame> {
        self.frames.get(self.current)
    }
}

/// A named texture of the scene: decoded image plus optional sprite
/// animation metadata.
#[derive(Debug, Clone)]
pub struct SceneTexture {
    pub name: String,
    pub image: Arc<Image>,
    pub sprite: Option<SpriteAnimation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: usize, duration: f32) -> SpriteFrame {
        SpriteFrame {
            image_index: index,
            duration,
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    #[test]
    fn test_sprite_advances_and_wraps() {
        let mut anim = SpriteAnimation::new(vec![frame(0, 0.1), frame(1, 0.1), frame(2, 0.1)]);
        assert_eq!(anim.current().unwrap().image_index, 0);
        assert_eq!(anim.tick(0.1).unwrap().image_index, 1);
        assert_eq!(anim.tick(0.25).unwrap().image_index, 0);
    }

    #[test]
    fn test_empty_sprite() {
        let mut anim = SpriteAnimation::default();
        assert!(anim.tick(1.0).is_none());
    }
}
