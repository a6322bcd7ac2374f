//! Adaptive frame pacer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::thread_timer::ThreadTimer;

/// Number of frame-cost samples in the sliding window.
const FRAMETIME_WINDOW: usize = 5;

/// Upper bound on draw requests scheduled but not yet completed.
const MAX_BUSY: i32 = 3;

struct FrameShared {
    /// Smoothed frame cost in microseconds (mean of the window).
    frametime_us: AtomicU64,
    /// Interval derived from the target rate, in microseconds.
    idealtime_us: AtomicU64,
    /// Draw requests scheduled but not yet finished.
    busy_count: AtomicI32,
    samples: Mutex<VecDeque<Duration>>,
}

impl FrameShared {
    fn frametime(&self) -> Duration {
        Duration::from_micros(self.frametime_us.load(Ordering::Acquire))
    }

    fn idealtime(&self) -> Duration {
        Duration::from_micros(self.idealtime_us.load(Ordering::Acquire))
    }

    fn push_sample(&self, cost: Duration) {
        let mut samples = self.samples.lock();
        samples.push_back(cost);
        while samples.len() > FRAMETIME_WINDOW {
            samples.pop_front();
        }
        let total: Duration = samples.iter().sum();
        let mean = total / samples.len() as u32;
        self.frametime_us
            .store(mean.as_micros() as u64, Ordering::Release);
    }
}

/// Paces the render actor's per-frame draw message.
///
/// Each tick posts one draw request through the configured callback. Two
/// mechanisms keep a slow GPU from flooding the render mailbox:
///
/// - at most [`MAX_BUSY`] requests may be in flight; further ticks are
///   swallowed until [`frame_end`](FrameTimer::frame_end) retires one;
/// - when the measured frame cost exceeds the ideal interval, the tick
///   interval backs off to half the measured cost instead of the ideal.
///
/// All methods take `&self`; the pacer is shared between the embedding
/// thread (configuration) and the render actor (frame begin/end) behind an
/// `Arc`.
pub struct FrameTimer {
    shared: Arc<FrameShared>,
    timer: Mutex<ThreadTimer>,
    callback: Mutex<Option<Arc<dyn Fn() + Send + Sync>>>,
    required_fps: AtomicU64,
    clock: Mutex<Option<Instant>>,
}

impl FrameTimer {
    /// Create a stopped pacer with the given target rate.
    pub fn new(required_fps: u16) -> Self {
        let timer = Self {
            shared: Arc::new(FrameShared {
                frametime_us: AtomicU64::new(0),
                idealtime_us: AtomicU64::new(0),
                busy_count: AtomicI32::new(0),
                samples: Mutex::new(VecDeque::with_capacity(FRAMETIME_WINDOW)),
            }),
            timer: Mutex::new(ThreadTimer::new(Duration::from_millis(100))),
            callback: Mutex::new(None),
            required_fps: AtomicU64::new(0),
            clock: Mutex::new(None),
        };
        timer.set_required_fps(required_fps);
        timer
    }

    /// Set the per-tick callback. Must be called before [`run`](Self::run).
    pub fn set_callback(&self, callback: impl Fn() + Send + Sync + 'static) {
        if self.running() {
            return;
        }
        *self.callback.lock() = Some(Arc::new(callback));
    }

    /// The configured target rate.
    pub fn required_fps(&self) -> u16 {
        self.required_fps.load(Ordering::Acquire) as u16
    }

    /// Change the target rate.
    ///
    /// Re-seeds the sample window with the new ideal interval so the pacer
    /// does not carry stale costs across a rate change.
    pub fn set_required_fps(&self, fps: u16) {
        let fps = fps.max(1);
        self.required_fps.store(fps as u64, Ordering::Release);
        let ideal = Duration::from_micros(1_000_000 / fps as u64);
        self.shared
            .idealtime_us
            .store(ideal.as_micros() as u64, Ordering::Release);
        self.shared.samples.lock().clear();
        for _ in 0..FRAMETIME_WINDOW {
            self.shared.push_sample(ideal);
        }
    }

    /// Smoothed frame cost: the arithmetic mean of the sample window.
    pub fn frame_time(&self) -> Duration {
        self.shared.frametime()
    }

    /// The effective frame interval: the measured cost when the renderer
    /// cannot keep up, otherwise the ideal interval.
    pub fn ideal_time(&self) -> Duration {
        let frametime = self.shared.frametime();
        let idealtime = self.shared.idealtime();
        frametime.max(idealtime)
    }

    /// Number of draw requests currently in flight.
    pub fn busy_count(&self) -> i32 {
        self.shared.busy_count.load(Ordering::Acquire)
    }

    /// Whether the tick thread is running.
    pub fn running(&self) -> bool {
        self.timer.lock().running()
    }

    /// Start pacing.
    pub fn run(&self) {
        let Some(callback) = self.callback.lock().clone() else {
            log::warn!("frame timer started without a callback");
            return;
        };
        let shared = Arc::clone(&self.shared);
        let mut timer = self.timer.lock();
        timer.handle().set_interval(self.shared.idealtime());
        timer.start(move |timer| {
            let frametime = shared.frametime();
            let idealtime = shared.idealtime();
            let wait = if frametime > idealtime {
                frametime / 2
            } else {
                idealtime
            };
            timer.set_interval(wait);

            // Saturate instead of queueing draw requests a slow GPU can
            // never catch up with.
            let scheduled = shared
                .busy_count
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |busy| {
                    (busy < MAX_BUSY).then_some(busy + 1)
                })
                .is_ok();
            if scheduled {
                callback();
            }
        });
    }

    /// Stop pacing.
    pub fn stop(&self) {
        self.timer.lock().stop();
    }

    /// Mark the start of a frame on the render thread.
    pub fn frame_begin(&self) {
        *self.clock.lock() = Some(Instant::now());
    }

    /// Mark the end of a frame: records the measured cost and retires one
    /// in-flight draw request.
    pub fn frame_end(&self) {
        if let Some(begin) = self.clock.lock().take() {
            self.shared.push_sample(begin.elapsed());
        }
        let _ = self
            .shared
            .busy_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |busy| {
                (busy > 0).then_some(busy - 1)
            });
    }
}

impl Drop for FrameTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

static_assertions::assert_impl_all!(FrameTimer: Send, Sync);
