//! Background tick thread with a controllable interval.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

struct TimerState {
    interval: Duration,
    running: bool,
}

struct TimerShared {
    state: Mutex<TimerState>,
    condvar: Condvar,
}

/// Cheap handle for adjusting a running [`ThreadTimer`].
///
/// The tick callback receives a clone of this so it can adapt its own
/// interval.
#[derive(Clone)]
pub struct TimerHandle {
    shared: Arc<TimerShared>,
}

impl TimerHandle {
    /// Change the interval used for subsequent ticks.
    pub fn set_interval(&self, interval: Duration) {
        self.shared.state.lock().interval = interval;
    }

    /// Current tick interval.
    pub fn interval(&self) -> Duration {
        self.shared.state.lock().interval
    }
}

/// A timer thread that calls back at a fixed (but adjustable) interval.
///
/// The callback runs on the timer's own thread. Ticks never queue up: if
/// the callback is slow, the next wait simply starts after it returns.
pub struct ThreadTimer {
    shared: Arc<TimerShared>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadTimer {
    /// Create a stopped timer with the given initial interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            shared: Arc::new(TimerShared {
                state: Mutex::new(TimerState {
                    interval,
                    running: false,
                }),
                condvar: Condvar::new(),
            }),
            thread: None,
        }
    }

    /// Handle for adjusting the interval, usable from any thread.
    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Whether the tick thread is running.
    pub fn running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Start ticking. Does nothing if already running.
    pub fn start(&mut self, mut callback: impl FnMut(&TimerHandle) + Send + 'static) {
        {
            let mut state = self.shared.state.lock();
            if state.running {
                return;
            }
            state.running = true;
        }
        let shared = Arc::clone(&self.shared);
        let handle = self.handle();
        self.thread = Some(
            std::thread::Builder::new()
                .name("timer".into())
                .spawn(move || loop {
                    {
                        let mut state = shared.state.lock();
                        if !state.running {
                            return;
                        }
                        let interval = state.interval;
                        shared.condvar.wait_for(&mut state, interval);
                        if !state.running {
                            return;
                        }
                    }
                    callback(&handle);
                })
                .expect("failed to spawn timer thread"),
        );
    }

    /// Stop ticking and join the timer thread.
    pub fn stop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if !state.running {
                return;
            }
            state.running = false;
        }
        self.condvar_notify();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn condvar_notify(&self) {
        self.shared.condvar.notify_one();
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_ticks_and_stops() {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = Arc::clone(&count);
        let mut timer = ThreadTimer::new(Duration::from_millis(5));
        timer.start(move |_| {
            tick_count.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.running());

        std::thread::sleep(Duration::from_millis(100));
        timer.stop();
        assert!(!timer.running());

        let ticked = count.load(Ordering::SeqCst);
        assert!(ticked >= 2, "expected at least 2 ticks, got {ticked}");

        // No further ticks after stop.
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), ticked);
    }

    #[test]
    fn test_callback_can_change_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = Arc::clone(&count);
        let mut timer = ThreadTimer::new(Duration::from_millis(1));
        timer.start(move |handle| {
            tick_count.fetch_add(1, Ordering::SeqCst);
            handle.set_interval(Duration::from_secs(3600));
        });
        std::thread::sleep(Duration::from_millis(100));
        timer.stop();
        // The first tick parks the timer for an hour.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
