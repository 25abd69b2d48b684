//! The environment-wide re-entrant lock.

use super::notifier::{EventNotifier, Notification};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::{Cell, RefCell};

#[derive(Default)]
pub(crate) struct LockState {
    depth: Cell<usize>,
    pending: RefCell<Vec<Notification>>,
}

/// Re-entrant lock shared by every object of one table environment.
///
/// Notifications fired while the lock is held are buffered and handed to the
/// event worker when the outermost guard is released.
pub(crate) struct TableEnvironmentLock {
    mutex: ReentrantMutex<LockState>,
    notifier: EventNotifier,
}

impl TableEnvironmentLock {
    pub(crate) fn new(notifier: EventNotifier) -> Self {
        Self {
            mutex: ReentrantMutex::new(LockState::default()),
            notifier,
        }
    }

    pub(crate) fn lock(&self) -> TableEnvironmentGuard<'_> {
        let guard = self.mutex.lock();
        guard.depth.set(guard.depth.get() + 1);
        TableEnvironmentGuard {
            guard,
            notifier: &self.notifier,
        }
    }

    pub(crate) fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    /// Stop the event worker.
    ///
    /// A listener may be blocked on this lock, so the worker is only joined
    /// when the calling thread does not hold it.
    pub(crate) fn shutdown(&self) {
        self.notifier.shutdown(!self.is_held_by_current_thread());
    }

    fn is_held_by_current_thread(&self) -> bool {
        // Re-entrant: succeeds for the owning thread, which has a non-zero depth.
        self.mutex
            .try_lock()
            .is_some_and(|state| state.depth.get() > 0)
    }
}

/// Proof that the current thread holds the table environment lock.
///
/// Guards nest: the lock is released, and buffered notifications are
/// dispatched, when the outermost guard is dropped.
pub struct TableEnvironmentGuard<'a> {
    guard: ReentrantMutexGuard<'a, LockState>,
    notifier: &'a EventNotifier,
}

impl TableEnvironmentGuard<'_> {
    /// Queue a notification for delivery after the lock is fully released.
    pub(crate) fn fire(&self, event: &'static str, deliver: impl FnOnce() + Send + 'static) {
        self.guard
            .pending
            .borrow_mut()
            .push(Notification::new(event, deliver));
    }

    /// Nesting depth of the lock on this thread, including this guard.
    pub fn hold_count(&self) -> usize {
        self.guard.depth.get()
    }
}

impl Drop for TableEnvironmentGuard<'_> {
    fn drop(&mut self) {
        let depth = self.guard.depth.get().saturating_sub(1);
        self.guard.depth.set(depth);
        if depth == 0 {
            let pending = self.guard.pending.take();
            // Still locked here, so queue order matches commit order.
            for notification in pending {
                self.notifier.enqueue(notification);
            }
        }
    }
}
