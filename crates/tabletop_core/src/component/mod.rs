//! Scene-graph nodes: components and containers.
//!
//! A [`Component`] is a cheap, clonable handle to a node. A container's child
//! list is the only strong owner of its children; children point back to
//! their container weakly, and the tabletop points back to its table weakly,
//! so the graph never forms reference cycles.
//!
//! Node state sits behind per-node cells that are only touched while the
//! environment lock is held; the environment lock is what serializes access.

mod container;
mod listener;
mod memento;

pub use container::Container;
pub use listener::{
    ComponentEvent, ComponentListener, ContainerContentChangedEvent, ContainerEvent,
    ContainerListener,
};
pub use memento::ComponentFactory;

use crate::design::ComponentSurfaceDesign;
use crate::environment::{TableEnvironment, TableEnvironmentGuard};
use crate::error::TableError;
use crate::geometry::{Dimension, Point, Rectangle};
use crate::orientation::{CardOrientation, ComponentOrientation};
use crate::strategy::{ComponentStrategy, StrategyKind};
use crate::table::{Table, TableInner};
use container::ContainerState;
use listener::{dispatch, ListenerList};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

const BOUNDS_CHANGED: &str = "component_bounds_changed";
const ORIENTATION_CHANGED: &str = "component_orientation_changed";
const SURFACE_DESIGN_CHANGED: &str = "component_surface_design_changed";

pub(crate) struct ComponentNode {
    env: TableEnvironment,
    strategy: Arc<ComponentStrategy>,
    state: Mutex<ComponentState>,
    contents: Option<Arc<Mutex<ContainerState>>>,
}

struct ComponentState {
    location: Point,
    orientation: ComponentOrientation,
    surface_designs: BTreeMap<ComponentOrientation, ComponentSurfaceDesign>,
    parent: Weak<ComponentNode>,
    /// Set only on a tabletop.
    table: Option<Weak<TableInner>>,
    listeners: ListenerList<dyn ComponentListener>,
}

impl ComponentState {
    fn size(&self) -> Dimension {
        self.surface_designs
            .get(&self.orientation)
            .map(ComponentSurfaceDesign::size)
            .unwrap_or(Dimension::ZERO)
    }
}

/// Handle to a positioned, oriented game piece.
///
/// Equality and hashing use node identity.
#[derive(Clone)]
pub struct Component {
    node: Arc<ComponentNode>,
}

impl Component {
    pub(crate) fn new(env: &TableEnvironment, strategy: Arc<ComponentStrategy>) -> Self {
        let contents = strategy
            .default_layout()
            .map(|layout| Arc::new(Mutex::new(ContainerState::new(layout))));
        let state = ComponentState {
            location: strategy.default_location(),
            orientation: strategy.default_orientation(),
            surface_designs: strategy.default_surface_designs().clone(),
            parent: Weak::new(),
            table: None,
            listeners: ListenerList::default(),
        };
        Self {
            node: Arc::new(ComponentNode {
                env: env.clone(),
                strategy,
                state: Mutex::new(state),
                contents,
            }),
        }
    }

    /// The environment that created this component.
    pub fn environment(&self) -> &TableEnvironment {
        &self.node.env
    }

    pub fn strategy(&self) -> &Arc<ComponentStrategy> {
        &self.node.strategy
    }

    pub fn kind(&self) -> StrategyKind {
        self.node.strategy.kind()
    }

    pub fn is_container(&self) -> bool {
        self.node.contents.is_some()
    }

    /// This component viewed as a container, if it is one.
    pub fn as_container(&self) -> Option<Container> {
        self.node
            .contents
            .as_ref()
            .map(|contents| Container::from_parts(self.clone(), Arc::clone(contents)))
    }

    /// The container that currently owns this component.
    pub fn container(&self) -> Option<Container> {
        let _guard = self.environment().lock();
        self.parent_locked()
    }

    /// The table this component is (transitively) placed on.
    pub fn table(&self) -> Option<Table> {
        let _guard = self.environment().lock();
        self.table_locked()
    }

    pub fn location(&self) -> Point {
        let _guard = self.environment().lock();
        self.location_locked()
    }

    /// Move the component; containers move their whole subtree.
    pub fn set_location(&self, location: Point) {
        let guard = self.environment().lock();
        if self.set_location_locked(&guard, location) {
            self.bump_revision_locked();
        }
    }

    pub fn translate(&self, offset: Dimension) {
        let guard = self.environment().lock();
        if self.translate_locked(&guard, offset) {
            self.bump_revision_locked();
        }
    }

    /// Size of the surface design for the current orientation.
    pub fn size(&self) -> Dimension {
        let _guard = self.environment().lock();
        self.node.state.lock().size()
    }

    /// Bounds in table coordinates; a container's bounds include every descendant.
    pub fn bounds(&self) -> Rectangle {
        let _guard = self.environment().lock();
        self.bounds_locked()
    }

    pub fn orientation(&self) -> ComponentOrientation {
        let _guard = self.environment().lock();
        self.node.state.lock().orientation
    }

    pub fn supported_orientations(&self) -> &'static [ComponentOrientation] {
        self.node.strategy.supported_orientations()
    }

    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] when the strategy does not
    /// support `orientation`.
    pub fn set_orientation(&self, orientation: ComponentOrientation) -> Result<(), TableError> {
        self.require_supported(orientation)?;
        let guard = self.environment().lock();
        if self.set_orientation_locked(&guard, orientation) {
            self.bump_revision_locked();
        }
        Ok(())
    }

    /// Turn a card over.
    ///
    /// # Returns
    /// The new orientation.
    ///
    /// # Errors
    /// Returns [`TableError::IllegalState`] when the component is not a card.
    pub fn flip(&self) -> Result<ComponentOrientation, TableError> {
        let guard = self.environment().lock();
        let current = self.node.state.lock().orientation;
        let ComponentOrientation::Card(side) = current else {
            return Err(TableError::state(format!(
                "only cards can be flipped, not '{}' components",
                self.strategy().id()
            )));
        };
        let flipped = ComponentOrientation::Card(CardOrientation::inverse(side));
        if self.set_orientation_locked(&guard, flipped) {
            self.bump_revision_locked();
        }
        Ok(flipped)
    }

    pub fn surface_design(
        &self,
        orientation: ComponentOrientation,
    ) -> Result<ComponentSurfaceDesign, TableError> {
        self.require_supported(orientation)?;
        let _guard = self.environment().lock();
        let state = self.node.state.lock();
        state
            .surface_designs
            .get(&orientation)
            .cloned()
            .ok_or_else(|| TableError::state(format!("no surface design for '{}'", orientation)))
    }

    pub fn surface_designs(&self) -> BTreeMap<ComponentOrientation, ComponentSurfaceDesign> {
        let _guard = self.environment().lock();
        self.node.state.lock().surface_designs.clone()
    }

    pub fn set_surface_design(
        &self,
        orientation: ComponentOrientation,
        design: ComponentSurfaceDesign,
    ) -> Result<(), TableError> {
        self.set_surface_designs(BTreeMap::from([(orientation, design)]))
    }

    /// Replace the designs of the given orientations; others are kept.
    ///
    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] if any key is an unsupported
    /// orientation; nothing is changed in that case.
    pub fn set_surface_designs(
        &self,
        designs: BTreeMap<ComponentOrientation, ComponentSurfaceDesign>,
    ) -> Result<(), TableError> {
        for orientation in designs.keys() {
            self.require_supported(*orientation)?;
        }
        let guard = self.environment().lock();
        if self.set_surface_designs_locked(&guard, &designs) {
            self.bump_revision_locked();
        }
        Ok(())
    }

    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] if `listener` is already registered.
    pub fn add_component_listener(
        &self,
        listener: Arc<dyn ComponentListener>,
    ) -> Result<(), TableError> {
        let _guard = self.environment().lock();
        if self.node.state.lock().listeners.add(listener) {
            Ok(())
        } else {
            Err(TableError::argument("component listener is already registered"))
        }
    }

    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] if `listener` is not registered.
    pub fn remove_component_listener(
        &self,
        listener: &Arc<dyn ComponentListener>,
    ) -> Result<(), TableError> {
        let _guard = self.environment().lock();
        if self.node.state.lock().listeners.remove(listener) {
            Ok(())
        } else {
            Err(TableError::argument("component listener is not registered"))
        }
    }

    fn require_supported(&self, orientation: ComponentOrientation) -> Result<(), TableError> {
        if self.node.strategy.supports(orientation) {
            Ok(())
        } else {
            Err(TableError::argument(format!(
                "orientation '{}' is not supported by strategy '{}'",
                orientation,
                self.strategy().id()
            )))
        }
    }

    // Everything below expects the caller to hold the environment lock.

    pub(crate) fn parent_locked(&self) -> Option<Container> {
        let parent = self.node.state.lock().parent.upgrade()?;
        Component { node: parent }.as_container()
    }

    pub(crate) fn is_tabletop_locked(&self) -> bool {
        self.node.state.lock().table.is_some()
    }

    pub(crate) fn attach_to_table(&self, table: Weak<TableInner>) {
        self.node.state.lock().table = Some(table);
    }

    pub(crate) fn set_parent_locked(&self, parent: Option<&Container>) {
        self.node.state.lock().parent = parent
            .map(|container| Arc::downgrade(&container.as_component().node))
            .unwrap_or_default();
    }

    /// `true` if `self` is `other` or one of its ancestors.
    pub(crate) fn is_same_or_ancestor_of(&self, other: &Component) -> bool {
        let mut current = Some(other.clone());
        while let Some(component) = current {
            if component == *self {
                return true;
            }
            current = component.parent_locked().map(Container::into_component);
        }
        false
    }

    pub(crate) fn table_locked(&self) -> Option<Table> {
        let mut root = self.clone();
        while let Some(parent) = root.parent_locked() {
            root = parent.into_component();
        }
        let table = root.node.state.lock().table.clone()?;
        table.upgrade().map(Table::from_inner)
    }

    pub(crate) fn bump_revision_locked(&self) {
        if let Some(table) = self.table_locked() {
            table.increment_revision_locked();
        }
    }

    pub(crate) fn location_locked(&self) -> Point {
        self.node.state.lock().location
    }

    pub(crate) fn bounds_locked(&self) -> Rectangle {
        let base = {
            let state = self.node.state.lock();
            Rectangle::from_parts(state.location, state.size())
        };
        match self.as_container() {
            Some(container) => container
                .children_locked()
                .iter()
                .fold(base, |bounds, child| bounds.union(&child.bounds_locked())),
            None => base,
        }
    }

    /// Returns `true` if the component moved.
    pub(crate) fn set_location_locked(&self, guard: &TableEnvironmentGuard<'_>, location: Point) -> bool {
        let offset = location - self.location_locked();
        self.translate_locked(guard, offset)
    }

    pub(crate) fn translate_locked(&self, guard: &TableEnvironmentGuard<'_>, offset: Dimension) -> bool {
        if offset == Dimension::ZERO {
            return false;
        }
        {
            let mut state = self.node.state.lock();
            state.location = state.location + offset;
        }
        self.fire_component_event(guard, BOUNDS_CHANGED, |listener, event| {
            listener.component_bounds_changed(event)
        });
        if let Some(container) = self.as_container() {
            for child in container.children_locked() {
                child.translate_locked(guard, offset);
            }
        }
        true
    }

    /// Caller validates `orientation`. Returns `true` if it changed.
    pub(crate) fn set_orientation_locked(
        &self,
        guard: &TableEnvironmentGuard<'_>,
        orientation: ComponentOrientation,
    ) -> bool {
        let old_bounds = self.bounds_locked();
        {
            let mut state = self.node.state.lock();
            if state.orientation == orientation {
                return false;
            }
            state.orientation = orientation;
        }
        self.fire_component_event(guard, ORIENTATION_CHANGED, |listener, event| {
            listener.component_orientation_changed(event)
        });
        self.fire_bounds_changed_if(guard, old_bounds);
        true
    }

    /// Caller validates the orientations. Returns `true` if any design changed.
    pub(crate) fn set_surface_designs_locked(
        &self,
        guard: &TableEnvironmentGuard<'_>,
        designs: &BTreeMap<ComponentOrientation, ComponentSurfaceDesign>,
    ) -> bool {
        let old_bounds = self.bounds_locked();
        let changed = {
            let mut state = self.node.state.lock();
            let mut changed = false;
            for (orientation, design) in designs {
                if state.surface_designs.get(orientation) != Some(design) {
                    state.surface_designs.insert(*orientation, design.clone());
                    changed = true;
                }
            }
            changed
        };
        if !changed {
            return false;
        }
        self.fire_component_event(guard, SURFACE_DESIGN_CHANGED, |listener, event| {
            listener.component_surface_design_changed(event)
        });
        self.fire_bounds_changed_if(guard, old_bounds);
        true
    }

    pub(crate) fn fire_bounds_changed_if(&self, guard: &TableEnvironmentGuard<'_>, old_bounds: Rectangle) -> bool {
        if self.bounds_locked() == old_bounds {
            return false;
        }
        self.fire_component_event(guard, BOUNDS_CHANGED, |listener, event| {
            listener.component_bounds_changed(event)
        });
        true
    }

    fn fire_component_event(
        &self,
        guard: &TableEnvironmentGuard<'_>,
        event: &'static str,
        call: fn(&dyn ComponentListener, &ComponentEvent),
    ) {
        let Some(listeners) = self.node.state.lock().listeners.snapshot() else {
            return;
        };
        let payload = ComponentEvent::new(self.clone());
        guard.fire(event, move || {
            dispatch(event, listeners.as_slice(), |listener| call(listener, &payload))
        });
    }

    pub(crate) fn surface_designs_locked(&self) -> BTreeMap<ComponentOrientation, ComponentSurfaceDesign> {
        self.node.state.lock().surface_designs.clone()
    }

    pub(crate) fn orientation_locked(&self) -> ComponentOrientation {
        self.node.state.lock().orientation
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Component {}

impl Hash for Component {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.node), state);
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("strategy", &self.node.strategy.id().as_str())
            .field("node", &Arc::as_ptr(&self.node))
            .finish()
    }
}

#[cfg(test)]
mod tests;
