//! # Scenic App
//!
//! The host-facing facade of the Scenic engine.
//!
//! A [`Player`] owns the engine's two actors:
//!
//! - the **main** actor parses scenes (through the host-supplied
//!   [`SceneParser`]) and owns non-GPU state such as audio settings;
//! - the **render** actor owns the GPU backend, the texture cache and the
//!   compiled render graph.
//!
//! The actors never call each other; everything crosses as posted
//! messages, and the only shared value is the parsed `Scene`, moved in
//! whole from main to render. An adaptive frame timer paces the render
//! actor's draw messages.
//!
//! The host integrates by constructing a `Player` with its parser and
//! audio sink, handing over a GPU backend, and driving the string-keyed
//! property bag (`source`, `assets`, `fps`, `fillmode`, ...).

mod audio;
mod main_actor;
mod messages;
mod parser;
mod player;
pub mod properties;
mod render_actor;

pub use audio::{AudioSink, NullAudioSink};
pub use messages::{MainMessage, PropertyValue, RenderInit, RenderMessage};
pub use parser::{ParseError, SceneParser};
pub use player::Player;
