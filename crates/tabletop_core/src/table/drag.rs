//! Drag-and-drop sessions.
//!
//! A session lifts one component out of its container into an invisible
//! mobile container placed on top of the tabletop. Dragging moves the mobile
//! container; dropping or cancelling tears it down again.

use super::{Table, TableInner};
use crate::component::{Component, Container};
use crate::constants::NULL_CONTAINER_STRATEGY_ID;
use crate::environment::{TableEnvironment, TableEnvironmentGuard};
use crate::error::TableError;
use crate::geometry::Point;
use crate::layout::ContainerLayout;
use parking_lot::Mutex;
use std::fmt;
use std::slice;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Lifecycle of a drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragState {
    /// Created but the component has not been lifted yet.
    NotStarted,
    Active,
    /// Terminal: the component was placed in a drop target.
    Dropped,
    /// Terminal: the component went back to where it came from.
    Cancelled,
}

impl DragState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Dropped | Self::Cancelled)
    }
}

pub(crate) struct DragSession {
    table: Weak<TableInner>,
    env: TableEnvironment,
    component: Component,
    source: Container,
    mobile: Container,
    initial_location: Point,
    /// Filled in when the component is lifted.
    origins: Mutex<Origins>,
    state: Mutex<DragState>,
}

#[derive(Default, Clone, Copy)]
struct Origins {
    source_index: usize,
    component: Point,
    mobile: Point,
}

impl DragSession {
    pub(super) fn new(
        table: &Table,
        component: Component,
        source: Container,
        location: Point,
    ) -> Result<Self, TableError> {
        let env = table.environment().clone();
        let strategy = env.strategies().require(NULL_CONTAINER_STRATEGY_ID)?;
        let mobile = env.create_container(strategy)?;
        Ok(Self {
            table: table.downgrade(),
            env,
            component,
            source,
            mobile,
            initial_location: location,
            origins: Mutex::new(Origins::default()),
            state: Mutex::new(DragState::NotStarted),
        })
    }

    pub(super) fn mobile(&self) -> &Component {
        self.mobile.as_component()
    }

    fn table_locked(&self) -> Result<Table, TableError> {
        self.table
            .upgrade()
            .map(Table::from_inner)
            .ok_or_else(|| TableError::state("the table of this drag session no longer exists"))
    }

    fn require_active(&self, operation: &str) -> Result<(), TableError> {
        match *self.state.lock() {
            DragState::Active => Ok(()),
            state => Err(TableError::state(format!(
                "cannot {} a drag session that is {:?}",
                operation, state
            ))),
        }
    }

    /// Move the component from its source into the mobile container.
    pub(super) fn begin_locked(&self, guard: &TableEnvironmentGuard<'_>) -> Result<(), TableError> {
        let table = self.table_locked()?;
        let tabletop = table.tabletop();
        let source_index = self
            .source
            .index_locked(&self.component)
            .ok_or_else(|| TableError::argument("component is not contained in its container"))?;

        if self.mobile.layout_id_locked() != ContainerLayout::Absolute {
            self.mobile.set_layout_locked(guard, ContainerLayout::Absolute);
        }
        self.mobile.set_location_locked(guard, self.initial_location);
        *self.origins.lock() = Origins {
            source_index,
            component: self.component.location_locked(),
            mobile: self.initial_location,
        };

        self.source
            .remove_locked(guard, source_index..source_index + 1)?;
        self.mobile
            .insert_locked(guard, 0, slice::from_ref(&self.component))?;
        let top = tabletop.len_locked();
        tabletop.insert_locked(guard, top, slice::from_ref(self.mobile.as_component()))?;
        tabletop.bump_revision_locked();

        *self.state.lock() = DragState::Active;
        debug!(
            strategy = %self.component.strategy().id(),
            source_index,
            location = %self.initial_location,
            "drag started"
        );
        Ok(())
    }

    fn drag_locked(&self, guard: &TableEnvironmentGuard<'_>, location: Point) -> bool {
        let mobile_origin = self.origins.lock().mobile;
        let target = mobile_origin + (location - self.initial_location);
        self.mobile.set_location_locked(guard, target)
    }

    /// Take the mobile container off the tabletop and empty it.
    fn tear_down_locked(&self, guard: &TableEnvironmentGuard<'_>, table: &Table) -> Result<(), TableError> {
        if let Some(index) = self.mobile.index_locked(&self.component) {
            self.mobile.remove_locked(guard, index..index + 1)?;
        }
        let tabletop = table.tabletop();
        if let Some(index) = tabletop.index_locked(self.mobile.as_component()) {
            tabletop.remove_locked(guard, index..index + 1)?;
        }
        Ok(())
    }

    fn finish_locked(self: &Arc<Self>, table: &Table, state: DragState) {
        *self.state.lock() = state;
        table.clear_drag_locked(self);
        table.tabletop().bump_revision_locked();
    }
}

/// Handle to a single-use drag session, obtained from [`Table::begin_drag`].
///
/// Every method fails with [`TableError::IllegalState`] once the session has
/// been dropped or cancelled.
#[derive(Clone)]
pub struct DragContext {
    session: Arc<DragSession>,
}

impl DragContext {
    pub(super) fn new(session: Arc<DragSession>) -> Self {
        Self { session }
    }

    pub fn state(&self) -> DragState {
        let _guard = self.session.env.lock();
        *self.session.state.lock()
    }

    /// The component being dragged.
    pub fn component(&self) -> &Component {
        &self.session.component
    }

    /// The container the component was lifted from.
    pub fn source(&self) -> &Container {
        &self.session.source
    }

    /// Move the dragged component by the pointer delta since the drag started.
    pub fn drag(&self, location: Point) -> Result<(), TableError> {
        let session = &self.session;
        let guard = session.env.lock();
        session.require_active("drag")?;
        if session.drag_locked(&guard, location) {
            session.mobile.bump_revision_locked();
        }
        Ok(())
    }

    /// Finish the drag by placing the component in the container under `location`.
    ///
    /// The deepest container whose bounds contain `location` is chosen,
    /// starting from the tabletop; the component is added on top of it.
    ///
    /// # Returns
    /// The container that received the component.
    pub fn drop(&self, location: Point) -> Result<Container, TableError> {
        let session = &self.session;
        let guard = session.env.lock();
        session.require_active("drop")?;
        let table = session.table_locked()?;

        session.drag_locked(&guard, location);
        session.tear_down_locked(&guard, &table)?;

        let target = drop_target_locked(table.tabletop(), location);
        let top = target.len_locked();
        target.insert_locked(&guard, top, slice::from_ref(&session.component))?;
        session.finish_locked(&table, DragState::Dropped);
        debug!(location = %location, target = %target.strategy().id(), "drag dropped");
        Ok(target)
    }

    /// Abort the drag and put the component back where it was.
    pub fn cancel(&self) -> Result<(), TableError> {
        let session = &self.session;
        let guard = session.env.lock();
        session.require_active("cancel")?;
        let table = session.table_locked()?;
        let origins = *session.origins.lock();

        session.tear_down_locked(&guard, &table)?;
        session.component.set_location_locked(&guard, origins.component);
        session.mobile.set_location_locked(&guard, origins.mobile);
        let index = origins.source_index.min(session.source.len_locked());
        session
            .source
            .insert_locked(&guard, index, slice::from_ref(&session.component))?;
        session.finish_locked(&table, DragState::Cancelled);
        debug!(source_index = index, "drag cancelled");
        Ok(())
    }
}

fn drop_target_locked(tabletop: &Container, location: Point) -> Container {
    let mut target = tabletop.clone();
    // Loose components covering a container do not hide it from the drop.
    while let Some(child) = target
        .children_locked()
        .into_iter()
        .rev()
        .filter_map(|component| component.as_container())
        .find(|container| container.bounds_locked().contains(location))
    {
        target = child;
    }
    target
}

impl fmt::Debug for DragContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragContext")
            .field("component", &self.session.component)
            .field("state", &*self.session.state.lock())
            .finish()
    }
}
