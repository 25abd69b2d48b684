//! Shared test-only helpers for tabletop_core.

use crate::component::{
    Component, ComponentEvent, ComponentListener, Container, ContainerContentChangedEvent,
    ContainerEvent, ContainerListener,
};
use crate::design::{ComponentSurfaceDesign, ComponentSurfaceDesignId};
use crate::environment::TableEnvironment;
use crate::geometry::Dimension;
use crate::layout::ContainerLayout;
use crate::orientation::{ComponentOrientation, NullOrientation};
use crate::strategy::{ComponentStrategy, ComponentStrategyId, StrategyKind, StrategyRegistry};
use crate::table::Table;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// 1x1 plain component.
pub(crate) const UNIT_STRATEGY_ID: &str = "test.unit";
/// 10x10 container with absolute layout.
pub(crate) const BOX_STRATEGY_ID: &str = "test.box";

/// Serializes tests that mutate process environment variables.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Restores an environment variable value on drop.
pub(crate) struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    #[allow(unused_unsafe)]
    pub(crate) fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: callers hold `env_lock()`.
        unsafe { std::env::set_var(key, value) };
        Self {
            key: key.to_string(),
            previous,
        }
    }

    #[allow(unused_unsafe)]
    pub(crate) fn remove(key: &str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: callers hold `env_lock()`.
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    #[allow(unused_unsafe)]
    fn drop(&mut self) {
        // SAFETY: the guard is dropped while `env_lock()` is still held.
        match self.previous.as_deref() {
            Some(previous) => unsafe { std::env::set_var(&self.key, previous) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

fn null_designs(width: i32, height: i32) -> BTreeMap<ComponentOrientation, ComponentSurfaceDesign> {
    let design = ComponentSurfaceDesign::new(
        ComponentSurfaceDesignId::new(format!("test.{}x{}", width, height)),
        Dimension::new(width, height),
    )
    .expect("test design");
    BTreeMap::from([(ComponentOrientation::Null(NullOrientation::Default), design)])
}

/// Built-in strategies plus [`UNIT_STRATEGY_ID`] and [`BOX_STRATEGY_ID`].
pub(crate) fn test_registry() -> StrategyRegistry {
    let null = ComponentOrientation::Null(NullOrientation::Default);
    let mut registry = StrategyRegistry::with_builtins();
    registry
        .register(
            ComponentStrategy::new(
                ComponentStrategyId::new(UNIT_STRATEGY_ID),
                StrategyKind::NullComponent,
                null,
                null_designs(1, 1),
                None,
            )
            .expect("unit strategy"),
        )
        .expect("register unit strategy");
    registry
        .register(
            ComponentStrategy::new(
                ComponentStrategyId::new(BOX_STRATEGY_ID),
                StrategyKind::NullContainer,
                null,
                null_designs(10, 10),
                Some(ContainerLayout::Absolute),
            )
            .expect("box strategy"),
        )
        .expect("register box strategy");
    registry
}

pub(crate) fn test_environment() -> TableEnvironment {
    TableEnvironment::new(test_registry())
}

pub(crate) fn test_table() -> (TableEnvironment, Table) {
    let env = test_environment();
    let table = env.create_table().expect("table");
    (env, table)
}

pub(crate) fn unit(env: &TableEnvironment) -> Component {
    env.create_component_by_id(UNIT_STRATEGY_ID).expect("unit component")
}

pub(crate) fn boxed(env: &TableEnvironment) -> Container {
    env.create_component_by_id(BOX_STRATEGY_ID)
        .expect("box component")
        .as_container()
        .expect("box is a container")
}

/// One delivered notification, as seen by [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Recorded {
    Added(Component, usize),
    Removed(Component, usize),
    LayoutChanged(Container),
    BoundsChanged(Component),
    OrientationChanged(Component),
    SurfaceDesignChanged(Component),
}

/// Records every notification it receives, in delivery order.
#[derive(Default)]
pub(crate) struct RecordingListener {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingListener {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<Recorded> {
        self.events.lock().clone()
    }

    pub(crate) fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.events.lock())
    }

    fn record(&self, event: Recorded) {
        self.events.lock().push(event);
    }
}

impl ComponentListener for RecordingListener {
    fn component_bounds_changed(&self, event: &ComponentEvent) {
        self.record(Recorded::BoundsChanged(event.component().clone()));
    }

    fn component_orientation_changed(&self, event: &ComponentEvent) {
        self.record(Recorded::OrientationChanged(event.component().clone()));
    }

    fn component_surface_design_changed(&self, event: &ComponentEvent) {
        self.record(Recorded::SurfaceDesignChanged(event.component().clone()));
    }
}

impl ContainerListener for RecordingListener {
    fn component_added(&self, event: &ContainerContentChangedEvent) {
        self.record(Recorded::Added(event.component().clone(), event.index()));
    }

    fn component_removed(&self, event: &ContainerContentChangedEvent) {
        self.record(Recorded::Removed(event.component().clone(), event.index()));
    }

    fn container_layout_changed(&self, event: &ContainerEvent) {
        self.record(Recorded::LayoutChanged(event.container().clone()));
    }
}

/// Register `listener` for both component and container events of `container`.
pub(crate) fn observe(container: &Container, listener: &Arc<RecordingListener>) {
    container
        .add_component_listener(Arc::clone(listener) as Arc<dyn ComponentListener>)
        .expect("component listener");
    container
        .add_container_listener(Arc::clone(listener) as Arc<dyn ContainerListener>)
        .expect("container listener");
}
