//! Frame pacing.
//!
//! - [`ThreadTimer`] - A background thread that invokes a callback at a
//!   controllable interval.
//! - [`FrameTimer`] - The adaptive frame pacer built on top of it: measures
//!   per-frame wall-clock cost over a sliding window, derives the tick
//!   interval from the configured target rate, and bounds the number of
//!   draw requests that may be in flight at once.

mod frame_timer;
mod thread_timer;

pub use frame_timer::FrameTimer;
pub use thread_timer::{ThreadTimer, TimerHandle};
