//! Last-value-wins debouncing
//!
//! `Debouncer` is the clock-injected state machine: callers pass `now`, so it
//! can be driven deterministically from tests or from any event loop.
//! `DebouncedSender` runs one on a background thread and emits settled values
//! into an `async_channel`, the same shape as the file watchers' flush loop.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Pending-value debouncer.
///
/// Every `observe` replaces the pending value and restarts the quiescence
/// window. `poll` yields the value once the window has elapsed without a
/// newer observation. A superseded value is dropped and never emitted.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a new value at `now`, replacing any pending one.
    ///
    /// Returns true when a pending value was superseded.
    pub fn observe(&mut self, value: T, now: Instant) -> bool {
        let superseded = self.pending.is_some();
        self.pending = Some(Pending {
            value,
            deadline: now + self.window,
        });
        superseded
    }

    /// When the pending value settles, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }
}

// ============================================
// THREADED DRIVER
// ============================================

/// Debouncer running on its own thread.
///
/// Values go in through `observe`; settled values come out of the receiver
/// returned by `spawn`. Dropping the sender lets the last pending value
/// settle, emits it, and joins the thread.
pub struct DebouncedSender<T: Send + 'static> {
    tx: Option<mpsc::Sender<T>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> DebouncedSender<T> {
    pub fn spawn(window: Duration) -> (Self, async_channel::Receiver<T>) {
        let (tx, rx) = mpsc::channel();
        let (out_tx, out_rx) = async_channel::bounded(100);

        let worker = thread::spawn(move || {
            debounce_loop(Debouncer::new(window), rx, out_tx);
        });

        (
            Self {
                tx: Some(tx),
                worker: Some(worker),
            },
            out_rx,
        )
    }

    /// Submit a value. Returns false once the worker has stopped.
    pub fn observe(&self, value: T) -> bool {
        match &self.tx {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }
}

impl<T: Send + 'static> Drop for DebouncedSender<T> {
    fn drop(&mut self) {
        // Closing the input lets the worker drain and exit
        self.tx.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn debounce_loop<T>(
    mut debouncer: Debouncer<T>,
    rx: mpsc::Receiver<T>,
    out: async_channel::Sender<T>,
) {
    debug!(window_ms = debouncer.window().as_millis() as u64, "Debounce worker started");
    loop {
        let received = match debouncer.deadline() {
            Some(deadline) => rx.recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(value) => {
                if debouncer.observe(value, Instant::now()) {
                    debug!("Debounce superseded pending value");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(value) = debouncer.poll(Instant::now()) {
                    debug!("Debounce window elapsed, emitting");
                    if out.send_blocking(value).is_err() {
                        // Receiver dropped, nobody is listening
                        return;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(deadline) = debouncer.deadline() {
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    if let Some(value) = debouncer.poll(Instant::now()) {
                        if out.try_send(value).is_err() {
                            warn!("Dropped final debounced value, output channel full or closed");
                        }
                    }
                }
                info!("Debounce worker shutting down");
                return;
            }
        }
    }
}
