//! Event notification worker.
//!
//! Notifications are delivered in FIFO order by one dedicated thread per
//! environment, never by the thread that committed the mutation.

use crate::config::Config;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const BARRIER_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A deferred listener callback plus the event name used for logging.
pub(crate) struct Notification {
    event: &'static str,
    deliver: Box<dyn FnOnce() + Send + 'static>,
}

impl Notification {
    pub(crate) fn new(event: &'static str, deliver: impl FnOnce() + Send + 'static) -> Self {
        Self {
            event,
            deliver: Box::new(deliver),
        }
    }
}

enum Job {
    Deliver {
        notification: Notification,
        queued_at: Instant,
    },
    Barrier(Sender<()>),
    Wake,
}

pub(crate) struct EventNotifier {
    tx: Sender<Job>,
    cancelled: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_thread: ThreadId,
}

impl EventNotifier {
    /// Spawn the worker thread.
    ///
    /// # Panics
    /// Panics if the worker thread cannot be spawned.
    pub(crate) fn spawn(config: &Config) -> Self {
        let (tx, rx) = unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let worker_cancelled = Arc::clone(&cancelled);
        let trace_enabled = config.event_trace;

        let handle = thread::Builder::new()
            .name(config.event_thread_name.clone())
            .spawn(move || run_worker(rx, worker_cancelled, trace_enabled))
            .expect("spawn table event worker");

        Self {
            tx,
            cancelled,
            worker_thread: handle.thread().id(),
            worker: Mutex::new(Some(handle)),
        }
    }

    pub(crate) fn enqueue(&self, notification: Notification) {
        if self.cancelled.load(Ordering::Acquire) {
            debug!(
                event = notification.event,
                "discarding notification for disposed table environment"
            );
            return;
        }
        let job = Job::Deliver {
            notification,
            queued_at: Instant::now(),
        };
        if self.tx.send(job).is_err() {
            debug!("event worker is gone; notification discarded");
        }
    }

    pub(crate) fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker_thread
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Block until every notification queued before this call was delivered.
    pub(crate) fn await_idle(&self) {
        if self.is_worker_thread() {
            debug!("await_pending_events called from the event worker; not waiting");
            return;
        }
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.is_cancelled() || self.tx.send(Job::Barrier(ack_tx)).is_err() {
            return;
        }
        loop {
            match ack_rx.recv_timeout(BARRIER_POLL_INTERVAL) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) if self.is_cancelled() => return,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }

    /// Cancel the worker; queued notifications are discarded.
    ///
    /// With `join` unset the worker is detached and finishes its current
    /// delivery on its own.
    pub(crate) fn shutdown(&self, join: bool) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if self.tx.send(Job::Wake).is_err() {
            debug!("event worker already stopped");
        }
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        if self.is_worker_thread() {
            // Joining ourselves would never return; the loop exits on its own.
            debug!("table environment disposed from its event worker; detaching");
            return;
        }
        if !join {
            debug!("table environment disposed under its own lock; detaching event worker");
            return;
        }
        if let Err(panic) = handle.join() {
            warn!(
                "event worker did not stop cleanly: {}",
                panic_message(panic.as_ref())
            );
        }
    }
}

fn run_worker(rx: Receiver<Job>, cancelled: Arc<AtomicBool>, trace_enabled: bool) {
    for job in rx.iter() {
        if cancelled.load(Ordering::Acquire) {
            break;
        }
        match job {
            Job::Deliver {
                notification,
                queued_at,
            } => {
                let event = notification.event;
                if let Err(panic) = catch_unwind(AssertUnwindSafe(notification.deliver)) {
                    error!(
                        target: "tabletop_core::events",
                        event = event,
                        "unexpected failure while delivering notification: {}",
                        panic_message(panic.as_ref())
                    );
                }
                if trace_enabled {
                    info!(
                        target: "tabletop_core::events",
                        event = event,
                        latency_ms = queued_at.elapsed().as_secs_f64() * 1000.0,
                        "notification delivered"
                    );
                }
            }
            Job::Barrier(ack) => {
                let _ = ack.send(());
            }
            Job::Wake => {}
        }
    }
    // Drop leftover jobs so barrier waiters see a disconnect.
    while rx.try_recv().is_ok() {}
    debug!(target: "tabletop_core::events", "event worker stopped");
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
