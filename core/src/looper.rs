//! Single-threaded actors with FIFO mailboxes.
//!
//! A [`Looper`] owns one thread and one message queue. Messages posted to
//! its [`LooperHandle`] are delivered to the registered [`Handler`] strictly
//! in post order, one at a time, on the looper's own thread. Actors never
//! call each other synchronously; the only cross-actor interaction is
//! posting a message and returning immediately.
//!
//! Stopping a looper flips its running flag and wakes the condition
//! variable. Messages that were posted but not yet delivered are dropped.
//! Posting through a handle after the looper stopped is a safe no-op: the
//! handle only holds a [`Weak`] reference to the mailbox, so a dead looper
//! answers with [`PostError::Stopped`] instead of crashing.
//!
//! # Example
//!
//! ```
//! use scenic_core::looper::{Handler, Looper};
//!
//! struct Counter(u32);
//!
//! impl Handler for Counter {
//!     type Message = u32;
//!     fn on_message(&mut self, msg: u32) {
//!         self.0 += msg;
//!     }
//! }
//!
//! let mut looper = Looper::spawn("worker", Counter(0));
//! let handle = looper.handle();
//! handle.post(1).unwrap();
//! handle.post(2).unwrap();
//! looper.stop();
//! assert!(handle.post(3).is_err());
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

/// Receives the messages delivered by a [`Looper`].
///
/// `on_message` runs on the looper thread. The handler owns whatever state
/// the actor encapsulates; no other thread can reach it.
pub trait Handler: Send + 'static {
    /// The message type this handler accepts.
    type Message: Send + 'static;

    /// Called for every delivered message, in post order.
    fn on_message(&mut self, message: Self::Message);
}

/// Error returned when posting to a looper that is no longer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostError;

impl std::fmt::Display for PostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "looper stopped")
    }
}

impl std::error::Error for PostError {}

struct MailboxState<M> {
    queue: VecDeque<M>,
    running: bool,
}

struct Mailbox<M> {
    state: Mutex<MailboxState<M>>,
    condvar: Condvar,
}

impl<M> Mailbox<M> {
    fn new() -> Self {
        Self {
            state: Mutex::new(MailboxState {
                queue: VecDeque::new(),
                running: true,
            }),
            condvar: Condvar::new(),
        }
    }
}

/// A single-threaded actor: one thread, one FIFO mailbox, one handler.
pub struct Looper<M: Send + 'static> {
    name: String,
    mailbox: Arc<Mailbox<M>>,
    thread: Option<JoinHandle<()>>,
}

impl<M: Send + 'static> Looper<M> {
    /// Spawn the looper thread and start delivering messages to `handler`.
    pub fn spawn<H>(name: &str, mut handler: H) -> Self
    where
        H: Handler<Message = M>,
    {
        let mailbox = Arc::new(Mailbox::new());
        let thread_mailbox = Arc::clone(&mailbox);
        let thread_name = name.to_string();
        let thread = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                log::info!("{} looper started", thread_name);
                loop {
                    let message = {
                        let mut state = thread_mailbox.state.lock();
                        loop {
                            if !state.running {
                                // Undelivered messages are dropped on stop.
                                state.queue.clear();
                                log::info!("{} looper stopped", thread_name);
                                return;
                            }
                            if let Some(message) = state.queue.pop_front() {
                                break message;
                            }
                            thread_mailbox.condvar.wait(&mut state);
                        }
                    };
                    handler.on_message(message);
                }
            })
            .expect("failed to spawn looper thread");

        Self {
            name: name.to_string(),
            mailbox,
            thread: Some(thread),
        }
    }

    /// The looper's name, used for the thread name and log lines.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a cheap, cloneable posting handle.
    pub fn handle(&self) -> LooperHandle<M> {
        LooperHandle {
            mailbox: Arc::downgrade(&self.mailbox),
        }
    }

    /// Whether the looper is still accepting messages.
    pub fn is_running(&self) -> bool {
        self.mailbox.state.lock().running
    }

    /// Stop the looper and join its thread.
    ///
    /// Pending messages are never delivered. Safe to call more than once.
    pub fn stop(&mut self) {
        {
            let mut state = self.mailbox.state.lock();
            if !state.running {
                return;
            }
            state.running = false;
        }
        self.mailbox.condvar.notify_one();
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() != std::thread::current().id() {
                let _ = thread.join();
            }
        }
    }
}

impl<M: Send + 'static> Drop for Looper<M> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Posting endpoint for a [`Looper`].
///
/// Holds only a weak reference: handles may outlive their looper, and
/// posting to a dead looper is a defined no-op.
pub struct LooperHandle<M> {
    mailbox: Weak<Mailbox<M>>,
}

impl<M> Clone for LooperHandle<M> {
    fn clone(&self) -> Self {
        Self {
            mailbox: self.mailbox.clone(),
        }
    }
}

impl<M: Send + 'static> LooperHandle<M> {
    /// Post a message for FIFO delivery on the looper thread.
    ///
    /// Returns [`PostError`] if the looper has stopped or been dropped;
    /// the message is discarded in that case.
    pub fn post(&self, message: M) -> Result<(), PostError> {
        let Some(mailbox) = self.mailbox.upgrade() else {
            return Err(PostError);
        };
        {
            let mut state = mailbox.state.lock();
            if !state.running {
                return Err(PostError);
            }
            state.queue.push_back(message);
        }
        mailbox.condvar.notify_one();
        Ok(())
    }
}

static_assertions::assert_impl_all!(LooperHandle<u32>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    struct Recorder {
        sender: mpsc::Sender<u32>,
    }

    impl Handler for Recorder {
        type Message = u32;
        fn on_message(&mut self, message: u32) {
            self.sender.send(message).unwrap();
        }
    }

    #[test]
    fn test_fifo_delivery() {
        let (sender, receiver) = mpsc::channel();
        let mut looper = Looper::spawn("fifo", Recorder { sender });
        let handle = looper.handle();

        for i in 0..32 {
            handle.post(i).unwrap();
        }
        let received: Vec<u32> = (0..32)
            .map(|_| receiver.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(received, (0..32).collect::<Vec<_>>());
        looper.stop();
    }

    struct Blocker {
        release: mpsc::Receiver<()>,
        sender: mpsc::Sender<u32>,
    }

    impl Handler for Blocker {
        type Message = u32;
        fn on_message(&mut self, message: u32) {
            // First message parks the looper until released, proving that a
            // later message cannot begin before an earlier one completes.
            if message == 0 {
                self.release.recv().unwrap();
            }
            self.sender.send(message).unwrap();
        }
    }

    #[test]
    fn test_delivery_completes_before_next_begins() {
        let (release_tx, release_rx) = mpsc::channel();
        let (sender, receiver) = mpsc::channel();
        let mut looper = Looper::spawn(
            "blocker",
            Blocker {
                release: release_rx,
                sender,
            },
        );
        let handle = looper.handle();

        handle.post(0).unwrap();
        handle.post(1).unwrap();
        assert!(receiver.try_recv().is_err());

        release_tx.send(()).unwrap();
        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)).unwrap(), 0);
        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        looper.stop();
    }

    #[test]
    fn test_post_after_stop_is_noop() {
        let (sender, receiver) = mpsc::channel();
        let mut looper = Looper::spawn("stopped", Recorder { sender });
        let handle = looper.handle();

        looper.stop();
        assert!(!looper.is_running());
        assert_eq!(handle.post(7), Err(PostError));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_handle_outlives_looper() {
        let (sender, _receiver) = mpsc::channel();
        let handle = {
            let looper = Looper::spawn("short-lived", Recorder { sender });
            looper.handle()
        };
        assert_eq!(handle.post(1), Err(PostError));
    }

    #[test]
    fn test_pending_messages_dropped_on_stop() {
        let (release_tx, release_rx) = mpsc::channel();
        let (sender, receiver) = mpsc::channel();
        let mut looper = Looper::spawn(
            "pending",
            Blocker {
                release: release_rx,
                sender,
            },
        );
        let handle = looper.handle();

        handle.post(0).unwrap();
        handle.post(1).unwrap();
        handle.post(2).unwrap();

        // Initiate the stop while the first message is still being
        // handled. stop() flips the running flag immediately (the mailbox
        // lock is not held during delivery) and then blocks joining, so
        // the queued messages must never be delivered.
        std::thread::sleep(Duration::from_millis(100));
        let stopper = std::thread::spawn(move || looper.stop());
        std::thread::sleep(Duration::from_millis(100));
        release_tx.send(()).unwrap();
        stopper.join().unwrap();

        assert_eq!(receiver.recv_timeout(Duration::from_secs(5)).unwrap(), 0);
        assert!(receiver.try_recv().is_err());
    }
}
