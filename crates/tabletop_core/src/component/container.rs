//! Containers: components that own an ordered list of children.

use super::listener::{dispatch, ListenerList};
use super::{Component, ContainerContentChangedEvent, ContainerEvent, ContainerListener};
use crate::environment::TableEnvironmentGuard;
use crate::error::TableError;
use crate::geometry::Point;
use crate::layout::ContainerLayout;
use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Range};
use std::sync::Arc;

const COMPONENT_ADDED: &str = "component_added";
const COMPONENT_REMOVED: &str = "component_removed";
const LAYOUT_CHANGED: &str = "container_layout_changed";

pub(crate) struct ContainerState {
    /// Bottom-to-top stacking order.
    children: Vec<Component>,
    layout: ContainerLayout,
    listeners: ListenerList<dyn ContainerListener>,
}

impl ContainerState {
    pub(crate) fn new(layout: ContainerLayout) -> Self {
        Self {
            children: Vec::new(),
            layout,
            listeners: ListenerList::default(),
        }
    }
}

/// Handle to a component that holds other components.
///
/// Dereferences to [`Component`] for the shared component operations.
#[derive(Clone)]
pub struct Container {
    component: Component,
    contents: Arc<Mutex<ContainerState>>,
}

impl Container {
    pub(crate) fn from_parts(component: Component, contents: Arc<Mutex<ContainerState>>) -> Self {
        Self {
            component,
            contents,
        }
    }

    pub fn as_component(&self) -> &Component {
        &self.component
    }

    pub fn into_component(self) -> Component {
        self.component
    }

    /// Children in bottom-to-top order.
    pub fn components(&self) -> Vec<Component> {
        let _guard = self.environment().lock();
        self.children_locked()
    }

    pub fn component_count(&self) -> usize {
        let _guard = self.environment().lock();
        self.len_locked()
    }

    pub fn component_at(&self, index: usize) -> Result<Component, TableError> {
        let _guard = self.environment().lock();
        self.contents
            .lock()
            .children
            .get(index)
            .cloned()
            .ok_or_else(|| TableError::argument(format!("component index {} out of range", index)))
    }

    pub fn component_index(&self, component: &Component) -> Option<usize> {
        let _guard = self.environment().lock();
        self.index_locked(component)
    }

    /// Topmost child whose bounds contain `location`.
    pub fn component_at_location(&self, location: Point) -> Option<Component> {
        let _guard = self.environment().lock();
        self.component_at_location_locked(location)
    }

    /// Append `component` on top.
    pub fn add_component(&self, component: &Component) -> Result<(), TableError> {
        self.add_components(std::slice::from_ref(component))
    }

    pub fn add_component_at(&self, component: &Component, index: usize) -> Result<(), TableError> {
        self.add_components_at(std::slice::from_ref(component), index)
    }

    /// Append `components` on top, in order.
    pub fn add_components(&self, components: &[Component]) -> Result<(), TableError> {
        let guard = self.environment().lock();
        let index = self.len_locked();
        if self.insert_locked(&guard, index, components)? {
            self.bump_revision_locked();
        }
        Ok(())
    }

    /// Insert `components` starting at `index`, in order.
    ///
    /// The whole batch is validated before anything is attached, so a failure
    /// leaves the container untouched. One `component_added` notification is
    /// fired per component in ascending index order, then `bounds_changed` if
    /// the container's bounds changed. The table revision is bumped once.
    ///
    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] when `index` is past the end, or
    /// when a component already has a container, belongs to another
    /// environment, is a tabletop, appears twice, or is this container or one
    /// of its ancestors.
    pub fn add_components_at(&self, components: &[Component], index: usize) -> Result<(), TableError> {
        let guard = self.environment().lock();
        if self.insert_locked(&guard, index, components)? {
            self.bump_revision_locked();
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] if `component` is not a child.
    pub fn remove_component(&self, component: &Component) -> Result<(), TableError> {
        let guard = self.environment().lock();
        let index = self.index_locked(component).ok_or_else(|| {
            TableError::argument("component is not contained in this container")
        })?;
        if self.remove_locked(&guard, index..index + 1)?.1 {
            self.bump_revision_locked();
        }
        Ok(())
    }

    pub fn remove_component_at(&self, index: usize) -> Result<Component, TableError> {
        let guard = self.environment().lock();
        if index >= self.len_locked() {
            return Err(TableError::argument(format!(
                "component index {} out of range",
                index
            )));
        }
        let (mut removed, changed) = self.remove_locked(&guard, index..index + 1)?;
        if changed {
            self.bump_revision_locked();
        }
        removed
            .pop()
            .ok_or_else(|| TableError::state("removal produced no component"))
    }

    /// Remove the children in `range`.
    ///
    /// `component_removed` notifications fire from the highest index down.
    ///
    /// # Returns
    /// The removed components in their former order.
    pub fn remove_components(&self, range: Range<usize>) -> Result<Vec<Component>, TableError> {
        let guard = self.environment().lock();
        let (removed, changed) = self.remove_locked(&guard, range)?;
        if changed {
            self.bump_revision_locked();
        }
        Ok(removed)
    }

    pub fn remove_all_components(&self) -> Vec<Component> {
        let guard = self.environment().lock();
        let count = self.len_locked();
        match self.remove_locked(&guard, 0..count) {
            Ok((removed, changed)) => {
                if changed {
                    self.bump_revision_locked();
                }
                removed
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn layout(&self) -> ContainerLayout {
        let _guard = self.environment().lock();
        self.contents.lock().layout
    }

    /// Replace the layout and re-lay-out every child before returning.
    ///
    /// The revision is bumped even when `layout` equals the current layout.
    pub fn set_layout(&self, layout: ContainerLayout) {
        let guard = self.environment().lock();
        self.set_layout_locked(&guard, layout);
        self.bump_revision_locked();
    }

    /// Re-apply the current layout to every child.
    pub fn apply_layout(&self) {
        let guard = self.environment().lock();
        let old_bounds = self.bounds_locked();
        if self.layout_locked(&guard) {
            self.fire_bounds_changed_if(&guard, old_bounds);
            self.bump_revision_locked();
        }
    }

    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] if `listener` is already registered.
    pub fn add_container_listener(&self, listener: Arc<dyn ContainerListener>) -> Result<(), TableError> {
        let _guard = self.environment().lock();
        if self.contents.lock().listeners.add(listener) {
            Ok(())
        } else {
            Err(TableError::argument("container listener is already registered"))
        }
    }

    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] if `listener` is not registered.
    pub fn remove_container_listener(
        &self,
        listener: &Arc<dyn ContainerListener>,
    ) -> Result<(), TableError> {
        let _guard = self.environment().lock();
        if self.contents.lock().listeners.remove(listener) {
            Ok(())
        } else {
            Err(TableError::argument("container listener is not registered"))
        }
    }

    // Everything below expects the caller to hold the environment lock.

    pub(crate) fn children_locked(&self) -> Vec<Component> {
        self.contents.lock().children.clone()
    }

    pub(crate) fn len_locked(&self) -> usize {
        self.contents.lock().children.len()
    }

    pub(crate) fn layout_id_locked(&self) -> ContainerLayout {
        self.contents.lock().layout
    }

    pub(crate) fn index_locked(&self, component: &Component) -> Option<usize> {
        self.contents
            .lock()
            .children
            .iter()
            .position(|child| child == component)
    }

    pub(crate) fn component_at_location_locked(&self, location: Point) -> Option<Component> {
        self.children_locked()
            .into_iter()
            .rev()
            .find(|child| child.bounds_locked().contains(location))
    }

    fn validate_insert(&self, index: usize, components: &[Component]) -> Result<(), TableError> {
        let count = self.len_locked();
        if index > count {
            return Err(TableError::argument(format!(
                "insertion index {} out of range 0..={}",
                index, count
            )));
        }
        for (position, component) in components.iter().enumerate() {
            if !component.environment().same(self.environment()) {
                return Err(TableError::argument(
                    "component was created by a different table environment",
                ));
            }
            if component.parent_locked().is_some() {
                return Err(TableError::argument("component already has a container"));
            }
            if component.is_tabletop_locked() {
                return Err(TableError::argument(
                    "a tabletop cannot be added to a container",
                ));
            }
            if components[..position].contains(component) {
                return Err(TableError::argument(
                    "component appears more than once in the batch",
                ));
            }
            if component.is_same_or_ancestor_of(&self.component) {
                return Err(TableError::argument(
                    "a container cannot contain itself or one of its ancestors",
                ));
            }
        }
        Ok(())
    }

    /// Returns `true` if anything was inserted.
    pub(crate) fn insert_locked(
        &self,
        guard: &TableEnvironmentGuard<'_>,
        index: usize,
        components: &[Component],
    ) -> Result<bool, TableError> {
        self.validate_insert(index, components)?;
        if components.is_empty() {
            return Ok(false);
        }

        let old_bounds = self.bounds_locked();
        for component in components {
            component.set_parent_locked(Some(self));
        }
        {
            let mut contents = self.contents.lock();
            for (offset, component) in components.iter().enumerate() {
                contents.children.insert(index + offset, component.clone());
            }
        }
        self.layout_locked(guard);

        for (offset, component) in components.iter().enumerate() {
            self.fire_content_changed(guard, COMPONENT_ADDED, component, index + offset);
        }
        self.fire_bounds_changed_if(guard, old_bounds);
        Ok(true)
    }

    /// Returns the removed components and whether anything changed.
    pub(crate) fn remove_locked(
        &self,
        guard: &TableEnvironmentGuard<'_>,
        range: Range<usize>,
    ) -> Result<(Vec<Component>, bool), TableError> {
        let count = self.len_locked();
        if range.start > range.end || range.end > count {
            return Err(TableError::argument(format!(
                "removal range {}..{} out of range 0..{}",
                range.start, range.end, count
            )));
        }
        if range.is_empty() {
            return Ok((Vec::new(), false));
        }

        let old_bounds = self.bounds_locked();
        let removed: Vec<Component> = self.contents.lock().children.drain(range.clone()).collect();
        for component in &removed {
            component.set_parent_locked(None);
        }
        self.layout_locked(guard);

        for (offset, component) in removed.iter().enumerate().rev() {
            self.fire_content_changed(guard, COMPONENT_REMOVED, component, range.start + offset);
        }
        self.fire_bounds_changed_if(guard, old_bounds);
        Ok((removed, true))
    }

    pub(crate) fn set_layout_locked(&self, guard: &TableEnvironmentGuard<'_>, layout: ContainerLayout) {
        let old_bounds = self.bounds_locked();
        self.contents.lock().layout = layout;
        self.layout_locked(guard);

        let listeners = self.contents.lock().listeners.snapshot();
        if let Some(listeners) = listeners {
            let event = ContainerEvent::new(self.clone());
            guard.fire(LAYOUT_CHANGED, move || {
                dispatch(LAYOUT_CHANGED, listeners.as_slice(), |listener| {
                    listener.container_layout_changed(&event)
                })
            });
        }
        self.fire_bounds_changed_if(guard, old_bounds);
    }

    /// Move every child to the position the layout assigns it.
    ///
    /// Returns `true` if any child moved.
    pub(crate) fn layout_locked(&self, guard: &TableEnvironmentGuard<'_>) -> bool {
        let (layout, children) = {
            let contents = self.contents.lock();
            (contents.layout, contents.children.clone())
        };
        let origin = self.location_locked();
        let mut moved = false;
        for (index, child) in children.iter().enumerate() {
            let target = layout.component_location(origin, child.location_locked(), index);
            moved |= child.set_location_locked(guard, target);
        }
        moved
    }

    fn fire_content_changed(
        &self,
        guard: &TableEnvironmentGuard<'_>,
        event: &'static str,
        component: &Component,
        index: usize,
    ) {
        let Some(listeners) = self.contents.lock().listeners.snapshot() else {
            return;
        };
        let payload = ContainerContentChangedEvent::new(self.clone(), component.clone(), index);
        guard.fire(event, move || {
            dispatch(event, listeners.as_slice(), |listener| {
                if event == COMPONENT_ADDED {
                    listener.component_added(&payload)
                } else {
                    listener.component_removed(&payload)
                }
            })
        });
    }
}

impl Deref for Container {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.component
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component
    }
}

impl Eq for Container {}

impl PartialEq<Component> for Container {
    fn eq(&self, other: &Component) -> bool {
        self.component == *other
    }
}

impl Hash for Container {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.component.hash(state);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Container").field(&self.component).finish()
    }
}
