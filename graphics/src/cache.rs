//! Content-addressed texture cache and reuse pool.
//!
//! The cache has two jobs:
//!
//! - **Imported content**: [`TextureCache::create_from_image`] deduplicates
//!   uploads by the source image's identity, so repeated references to the
//!   same content share one GPU texture.
//! - **Render targets**: [`TextureCache::query`] binds symbolic target
//!   names to physical allocations keyed by a content hash of the
//!   allocation's shape. Once a producer releases a binding with
//!   [`TextureCache::mark_share_ready`], a later query for a *different*
//!   symbolic name with the same shape aliases the same physical texture.
//!   This is what lets ping-pong pairs, per-effect scratch buffers and
//!   per-layer composites share a small working set instead of one
//!   allocation per logical name.
//!
//! The cache persists across scene reloads and evicts nothing explicitly;
//! entries simply become reassignable once share-ready and not persistent.
//!
//! No internal locking: the cache has a single writer thread by
//! construction: every call happens on the render actor. Any change to
//! that threading model must revisit this type.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::backend::{GpuBackend, GpuTexture, GpuTextureDescriptor};
use crate::error::GraphicsError;
use crate::scene::{Image, RenderTargetDescriptor};
use crate::types::{TextureFormat, TextureSample, TextureUsage, TextureUsageClass};

/// Shape of a physical texture allocation, used as cache content key.
///
/// The hash is a pure function of the fields: equal field tuples hash
/// equally, and any differing field changes the hash (with overwhelming
/// probability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub width: u32,
    pub height: u32,
    pub usage: TextureUsageClass,
    pub format: TextureFormat,
    pub sample: TextureSample,
    pub mip_levels: u32,
}

/// Hash of a [`TextureKey`]'s contents.
pub type TexHash = u64;

impl TextureKey {
    /// Deterministic content hash of the key's fields.
    pub fn hash_value(&self) -> TexHash {
        // DefaultHasher with default keys is deterministic for the
        // process lifetime, which is all the pool needs.
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// The allocation shape implied by a render-target descriptor.
    pub fn from_render_target(rt: &RenderTargetDescriptor) -> Self {
        Self {
            width: rt.width,
            height: rt.height,
            usage: TextureUsageClass::Color,
            format: rt.format,
            sample: rt.sample,
            mip_levels: rt.mip_levels,
        }
    }
}

/// All GPU textures of one imported image: one slot per sprite-sheet page.
#[derive(Debug, Clone, Default)]
pub struct ImageSlots {
    pub slots: Vec<GpuTexture>,
    pub active: usize,
}

impl ImageSlots {
    /// The currently active slot, if any.
    pub fn active_texture(&self) -> Option<&GpuTexture> {
        self.slots.get(self.active)
    }
}

/// One entry of the reuse pool.
#[derive(Debug)]
struct QueryTex {
    content_hash: TexHash,
    /// The producer released this entry; it may be rebound.
    share_ready: bool,
    /// Never reassign, even when share-ready.
    persist: bool,
    /// Symbolic keys that have ever been bound to this entry.
    #[allow(dead_code)]
    query_keys: HashSet<String>,
    texture: GpuTexture,
}

/// Texture cache and reuse pool. One per render actor.
#[derive(Default)]
pub struct TextureCache {
    imported: HashMap<String, ImageSlots>,
    pool: Vec<QueryTex>,
    /// Symbolic name -> pool index.
    bindings: HashMap<String, usize>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical pool allocations.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Upload an imported image, deduplicated by its source identity.
    pub fn create_from_image(
        &mut self,
        backend: &dyn GpuBackend,
        image: &Image,
    ) -> Result<ImageSlots, GraphicsError> {
        if let Some(existing) = self.imported.get(&image.id) {
            return Ok(existing.clone());
        }
        let mut slots = Vec::with_capacity(image.slots.len());
        for (index, data) in image.slots.iter().enumerate() {
            let texture = backend.create_texture(&GpuTextureDescriptor {
                label: format!("{}#{}", image.id, index),
                width: image.width,
                height: image.height,
                format: image.format,
                sample: image.sample,
                mip_level_count: 1,
                usage: TextureUsage::SAMPLED | TextureUsage::COPY_DST,
            })?;
            backend.upload_texture(&texture, data)?;
            slots.push(texture);
        }
        let slots = ImageSlots { slots, active: 0 };
        self.imported.insert(image.id.clone(), slots.clone());
        Ok(slots)
    }

    /// Resolve a symbolic target name to a physical texture.
    ///
    /// Resolution order:
    /// 1. the name is already bound: return its texture;
    /// 2. a share-ready, non-persistent entry with the same content hash
    ///    exists: rebind the name to it;
    /// 3. allocate a new physical texture.
    ///
    /// `persist` pins the entry: it will never be reassigned to another
    /// name, even after [`mark_share_ready`](Self::mark_share_ready).
    pub fn query(
        &mut self,
        backend: &dyn GpuBackend,
        key: &str,
        content: TextureKey,
        persist: bool,
    ) -> Result<GpuTexture, GraphicsError> {
        if let Some(&index) = self.bindings.get(key) {
            let entry = &mut self.pool[index];
            entry.share_ready = false;
            entry.persist = persist;
            return Ok(entry.texture.clone());
        }

        let content_hash = content.hash_value();
        for (index, entry) in self.pool.iter_mut().enumerate() {
            if !entry.share_ready || entry.content_hash != content_hash {
                continue;
            }
            entry.share_ready = false;
            entry.persist = persist;
            entry.query_keys.insert(key.to_string());
            self.bindings.insert(key.to_string(), index);
            log::debug!("texture pool: '{}' aliases entry {}", key, index);
            return Ok(entry.texture.clone());
        }

        let texture = backend.create_texture(&GpuTextureDescriptor {
            label: key.to_string(),
            width: content.width,
            height: content.height,
            format: content.format,
            sample: content.sample,
            mip_level_count: content.mip_levels,
            usage: TextureUsage::SAMPLED
                | TextureUsage::RENDER_ATTACHMENT
                | TextureUsage::COPY_SRC
                | TextureUsage::COPY_DST,
        })?;
        let mut query_keys = HashSet::new();
        query_keys.insert(key.to_string());
        self.pool.push(QueryTex {
            content_hash,
            share_ready: false,
            persist,
            query_keys,
            texture: texture.clone(),
        });
        self.bindings.insert(key.to_string(), self.pool.len() - 1);
        Ok(texture)
    }

    /// Release a symbolic binding: the entry becomes reassignable to a
    /// different name on a future [`query`](Self::query).
    ///
    /// No-op for persistent entries and unknown names.
    pub fn mark_share_ready(&mut self, key: &str) {
        let Some(&index) = self.bindings.get(key) else {
            return;
        };
        let entry = &mut self.pool[index];
        if entry.persist {
            return;
        }
        entry.share_ready = true;
        self.bindings.remove(key);
    }

    /// Drop every cached texture. Only called on teardown or device loss;
    /// steady-state reuse never evicts.
    pub fn clear(&mut self) {
        self.imported.clear();
        self.pool.clear();
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;
    use rstest::rstest;

    fn key() -> TextureKey {
        TextureKey {
            width: 256,
            height: 256,
            usage: TextureUsageClass::Color,
            format: TextureFormat::Rgba8,
            sample: TextureSample::default(),
            mip_levels: 1,
        }
    }

    #[test]
    fn test_hash_is_pure() {
        assert_eq!(key().hash_value(), key().hash_value());
    }

    #[rstest]
    #[case::width(TextureKey { width: 257, ..key() })]
    #[case::height(TextureKey { height: 255, ..key() })]
    #[case::usage(TextureKey { usage: TextureUsageClass::Depth, ..key() })]
    #[case::format(TextureKey { format: TextureFormat::R8, ..key() })]
    #[case::sample(TextureKey {
        sample: TextureSample { wrap_s: crate::types::TextureWrap::Repeat, ..Default::default() },
        ..key()
    })]
    #[case::mips(TextureKey { mip_levels: 4, ..key() })]
    fn test_hash_changes_with_any_field(#[case] changed: TextureKey) {
        assert_ne!(key().hash_value(), changed.hash_value());
    }

    #[test]
    fn test_share_ready_entries_alias() {
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        let first = cache.query(&backend, "ping", key(), false).unwrap();
        cache.mark_share_ready("ping");
        let second = cache.query(&backend, "pong", key(), false).unwrap();

        assert!(first.same_allocation(&second));
        assert_eq!(cache.pool_size(), 1);
    }

    #[test]
    fn test_live_entries_do_not_alias() {
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        let first = cache.query(&backend, "a", key(), false).unwrap();
        // "a" was never released.
        let second = cache.query(&backend, "b", key(), false).unwrap();
        assert!(!first.same_allocation(&second));
        assert_eq!(cache.pool_size(), 2);
    }

    #[test]
    fn test_different_shape_does_not_alias() {
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        cache.query(&backend, "a", key(), false).unwrap();
        cache.mark_share_ready("a");
        let other = TextureKey {
            width: 512,
            ..key()
        };
        cache.query(&backend, "b", other, false).unwrap();
        assert_eq!(cache.pool_size(), 2);
    }

    #[test]
    fn test_persist_survives_share_ready() {
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();

        let first = cache.query(&backend, "held", key(), true).unwrap();
        cache.mark_share_ready("held");
        // Binding is intact: same entry without re-specifying content.
        let again = cache.query(&backend, "held", key(), true).unwrap();
        assert!(first.same_allocation(&again));

        // And it is not reassignable to another name.
        let other = cache.query(&backend, "other", key(), false).unwrap();
        assert!(!first.same_allocation(&other));
    }

    #[test]
    fn test_rebinding_same_key_returns_same_texture() {
        let backend = DummyBackend::default();
        let mut cache = TextureCache::new();
        let first = cache.query(&backend, "t", key(), false).unwrap();
        let second = cache.query(&backend, "t", key(), false).unwrap();
        assert!(first.same_allocation(&second));
        assert_eq!(cache.pool_size(), 1);
    }

    #[test]
    fn test_image_upload_dedup() {
        let backend = DummyBackend::default();
        let state = backend.state();
        let mut cache = TextureCache::new();

        let image = Image::new("textures/bg", 4, 4, vec![0; 64]);
        let a = cache.create_from_image(&backend, &image).unwrap();
        let b = cache.create_from_image(&backend, &image).unwrap();
        assert_eq!(state.uploads(), 1);
        assert!(a.slots[0].same_allocation(&b.slots[0]));
    }
}
