//! Reserved symbolic texture names.
//!
//! Names starting with the reserved prefix denote engine-managed
//! (Temporary) render targets; everything else names imported scene
//! content.

/// Prefix of all engine-managed target names.
pub const RESERVED_PREFIX: &str = "_rt_";

/// The target the finished frame is composed into.
pub const DEFAULT_TARGET: &str = "_rt_default";

/// Placeholder in an effect material's texture list that the compiler
/// replaces with the effect chain's previous target.
pub const EFFECT_INPUT: &str = "_rt_effect_input";

/// Prefix of per-layer composition targets.
pub const LAYER_COMPOSITE_PREFIX: &str = "_rt_layer_composite_";

/// Prefix of effect ping-pong scratch targets.
pub const EFFECT_PINGPONG_PREFIX: &str = "_rt_effect_pingpong_";

/// Prefix of targets that alias another scene node's composed output.
pub const LINK_PREFIX: &str = "_rt_link_";

/// Whether `name` is an engine-managed (Temporary) target name.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// The composition target name for a layer.
pub fn layer_composite(index: u32) -> String {
    format!("{LAYER_COMPOSITE_PREFIX}{index}")
}

/// The `side`-th ping-pong scratch target of a layer's effect chain.
pub fn effect_pingpong(layer: u32, side: u32) -> String {
    format!("{EFFECT_PINGPONG_PREFIX}{layer}_{side}")
}

/// The link-target name aliasing the composed output of scene node `id`.
pub fn link_target(id: u32) -> String {
    format!("{LINK_PREFIX}{id}")
}

/// Parse a link-target name back to its scene node id.
pub fn parse_link_target(name: &str) -> Option<u32> {
    name.strip_prefix(LINK_PREFIX)?.parse().ok()
}
