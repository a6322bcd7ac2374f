//! String keys of the host property bag.

/// Path of the scene package or directory to load.
pub const SOURCE: &str = "source";
/// Path of the shared assets directory.
pub const ASSETS: &str = "assets";
/// Target frame rate.
pub const FPS: &str = "fps";
/// How the frame is fitted to the surface; wire values of
/// [`FillMode`](scenic_graphics::types::FillMode).
pub const FILL_MODE: &str = "fillmode";
/// Mute audio.
pub const MUTE: &str = "mute";
/// Audio volume in `0.0..=1.0`.
pub const VOLUME: &str = "volume";
/// Write a `.dot` dump of each compiled graph next to the working
/// directory. Debug-only side channel.
pub const GRAPHVIZ: &str = "graphviz";
