//! Seam to the host's audio output.
//!
//! Decoding and mixing live outside the engine; the main actor only
//! forwards the host's volume and mute properties.

/// Receives audio property changes.
pub trait AudioSink: Send + 'static {
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
}

/// Sink for hosts without audio output.
#[derive(Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn set_volume(&mut self, _volume: f32) {}
    fn set_muted(&mut self, _muted: bool) {}
}
