//! Tables: the root of a scene graph.
//!
//! A table owns exactly one tabletop container for its whole life, counts
//! revisions of everything placed beneath it, and tracks at most one active
//! drag session.

mod drag;

pub use drag::{DragContext, DragState};

use crate::component::{Component, Container};
use crate::environment::TableEnvironment;
use crate::error::{MementoError, TableError};
use crate::geometry::Point;
use crate::memento::Memento;
use crate::strategy::{ComponentStrategy, StrategyKind};
use drag::DragSession;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

const TABLETOP: &str = "tabletop";

pub(crate) struct TableInner {
    env: TableEnvironment,
    tabletop: Container,
    state: Mutex<TableState>,
}

#[derive(Default)]
struct TableState {
    revision: u64,
    drag: Option<Arc<DragSession>>,
}

/// Handle to a table; clones share the same table.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

impl Table {
    pub(crate) fn new(env: &TableEnvironment, strategy: Arc<ComponentStrategy>) -> Result<Table, TableError> {
        if strategy.kind() != StrategyKind::Tabletop {
            return Err(TableError::argument(format!(
                "strategy '{}' is not a tabletop strategy",
                strategy.id()
            )));
        }
        let tabletop = env.create_container(strategy)?;
        let inner = Arc::new_cyclic(|table| {
            tabletop.attach_to_table(table.clone());
            TableInner {
                env: env.clone(),
                tabletop,
                state: Mutex::new(TableState::default()),
            }
        });
        Ok(Table { inner })
    }

    pub(crate) fn from_inner(inner: Arc<TableInner>) -> Table {
        Table { inner }
    }

    pub fn environment(&self) -> &TableEnvironment {
        &self.inner.env
    }

    /// The root container; never replaced.
    pub fn tabletop(&self) -> &Container {
        &self.inner.tabletop
    }

    /// Current revision; starts at zero and only ever grows.
    pub fn revision_number(&self) -> u64 {
        let _guard = self.environment().lock();
        self.inner.state.lock().revision
    }

    pub(crate) fn increment_revision_locked(&self) {
        let mut state = self.inner.state.lock();
        state.revision += 1;
        trace!(revision = state.revision, "table revision incremented");
    }

    /// `{ "tabletop": <container memento> }`.
    ///
    /// # Errors
    /// Returns [`TableError::IllegalState`] while a drag is active, since the
    /// tabletop then holds the transient mobile container.
    pub fn create_memento(&self) -> Result<Memento, TableError> {
        let _guard = self.environment().lock();
        if self.is_dragging_locked() {
            return Err(TableError::state("cannot snapshot a table while a drag is active"));
        }
        Ok(Memento::new().with(TABLETOP, self.inner.tabletop.memento_locked()))
    }

    /// Replace the tabletop's state and contents.
    ///
    /// # Errors
    /// Returns [`TableError::IllegalState`] while a drag is active, and
    /// [`TableError::MementoFormat`] when `memento` is malformed; the table is
    /// unchanged in both cases.
    pub fn set_memento(&self, memento: &Memento) -> Result<(), TableError> {
        let _guard = self.environment().lock();
        if self.is_dragging_locked() {
            return Err(TableError::state("cannot restore a table while a drag is active"));
        }
        let tabletop = memento.require_map(TABLETOP)?;
        if !Container::is_memento(tabletop) {
            return Err(MementoError::wrong_type(TABLETOP, "container memento").into());
        }
        self.inner.tabletop.set_memento(tabletop)
    }

    /// Lift `component` out of its container and start dragging it from `location`.
    ///
    /// # Errors
    /// Returns [`TableError::IllegalState`] when another drag is active, and
    /// [`TableError::ArgumentInvalid`] when `component` is not placed on this
    /// table, is the tabletop itself, or has no container.
    pub fn begin_drag(&self, location: Point, component: &Component) -> Result<DragContext, TableError> {
        let guard = self.environment().lock();
        if self.is_dragging_locked() {
            return Err(TableError::state("a drag is already active on this table"));
        }
        if !component.environment().same(self.environment()) {
            return Err(TableError::argument(
                "component was created by a different table environment",
            ));
        }
        if component == self.inner.tabletop.as_component() {
            return Err(TableError::argument("the tabletop cannot be dragged"));
        }
        if component.table_locked().as_ref() != Some(self) {
            return Err(TableError::argument("component is not placed on this table"));
        }
        let source = component
            .parent_locked()
            .ok_or_else(|| TableError::argument("component has no container"))?;

        let session = Arc::new(DragSession::new(self, component.clone(), source, location)?);
        session.begin_locked(&guard)?;
        self.inner.state.lock().drag = Some(Arc::clone(&session));
        Ok(DragContext::new(session))
    }

    pub fn is_dragging(&self) -> bool {
        let _guard = self.environment().lock();
        self.is_dragging_locked()
    }

    /// The drag session in progress, if any.
    pub fn active_drag(&self) -> Option<DragContext> {
        let _guard = self.environment().lock();
        let session = self.inner.state.lock().drag.clone()?;
        Some(DragContext::new(session))
    }

    fn is_dragging_locked(&self) -> bool {
        self.inner.state.lock().drag.is_some()
    }

    /// `true` if `component` is the active drag's mobile container or one of
    /// its ancestors.
    pub(crate) fn holds_mobile_container_locked(&self, component: &Component) -> bool {
        let session = self.inner.state.lock().drag.clone();
        session.is_some_and(|session| component.is_same_or_ancestor_of(session.mobile()))
    }

    pub(crate) fn clear_drag_locked(&self, session: &Arc<DragSession>) {
        let mut state = self.inner.state.lock();
        if state
            .drag
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(active, session))
        {
            state.drag = None;
        }
    }

    pub(crate) fn downgrade(&self) -> std::sync::Weak<TableInner> {
        Arc::downgrade(&self.inner)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Table {}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("tabletop", &self.inner.tabletop)
            .finish_non_exhaustive()
    }
}
