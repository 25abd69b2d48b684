//! Listener interfaces and event payloads.

use super::{Component, Container};
use crate::environment::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

/// Payload of component-level notifications.
#[derive(Debug, Clone)]
pub struct ComponentEvent {
    component: Component,
}

impl ComponentEvent {
    pub(crate) fn new(component: Component) -> Self {
        Self { component }
    }

    /// The component that fired the event.
    pub fn component(&self) -> &Component {
        &self.component
    }
}

/// Payload of container-level notifications.
#[derive(Debug, Clone)]
pub struct ContainerEvent {
    container: Container,
}

impl ContainerEvent {
    pub(crate) fn new(container: Container) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }
}

/// Payload of component added/removed notifications.
#[derive(Debug, Clone)]
pub struct ContainerContentChangedEvent {
    container: Container,
    component: Component,
    index: usize,
}

impl ContainerContentChangedEvent {
    pub(crate) fn new(container: Container, component: Component, index: usize) -> Self {
        Self {
            container,
            component,
            index,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The component that was added or removed.
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Index of the component at the time of the change.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Receives component-level notifications on the environment's event thread.
pub trait ComponentListener: Send + Sync {
    fn component_bounds_changed(&self, _event: &ComponentEvent) {}

    fn component_orientation_changed(&self, _event: &ComponentEvent) {}

    fn component_surface_design_changed(&self, _event: &ComponentEvent) {}
}

/// Receives container-level notifications on the environment's event thread.
pub trait ContainerListener: Send + Sync {
    fn component_added(&self, _event: &ContainerContentChangedEvent) {}

    fn component_removed(&self, _event: &ContainerContentChangedEvent) {}

    fn container_layout_changed(&self, _event: &ContainerEvent) {}
}

/// Copy-on-write listener list; snapshots are captured when an event fires.
pub(crate) struct ListenerList<L: ?Sized> {
    listeners: Arc<Vec<Arc<L>>>,
}

impl<L: ?Sized> Default for ListenerList<L> {
    fn default() -> Self {
        Self {
            listeners: Arc::new(Vec::new()),
        }
    }
}

impl<L: ?Sized> ListenerList<L> {
    fn position(&self, listener: &Arc<L>) -> Option<usize> {
        self.listeners
            .iter()
            .position(|existing| same_listener(existing, listener))
    }

    /// Returns `false` when the listener was already registered.
    pub(crate) fn add(&mut self, listener: Arc<L>) -> bool {
        if self.position(&listener).is_some() {
            return false;
        }
        let mut next: Vec<Arc<L>> = self.listeners.iter().cloned().collect();
        next.push(listener);
        self.listeners = Arc::new(next);
        true
    }

    /// Returns `false` when the listener was not registered.
    pub(crate) fn remove(&mut self, listener: &Arc<L>) -> bool {
        let Some(index) = self.position(listener) else {
            return false;
        };
        let mut next: Vec<Arc<L>> = self.listeners.iter().cloned().collect();
        next.remove(index);
        self.listeners = Arc::new(next);
        true
    }

    pub(crate) fn snapshot(&self) -> Option<Arc<Vec<Arc<L>>>> {
        if self.listeners.is_empty() {
            None
        } else {
            Some(Arc::clone(&self.listeners))
        }
    }
}

fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Invoke `call` on each listener, isolating panics per listener.
pub(crate) fn dispatch<L: ?Sized>(event: &'static str, listeners: &[Arc<L>], call: impl Fn(&L)) {
    for listener in listeners {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| call(&**listener))) {
            error!(
                target: "tabletop_core::events",
                event = event,
                "unexpected listener failure: {}",
                panic_message(panic.as_ref())
            );
        }
    }
}
