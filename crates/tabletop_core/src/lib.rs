//! Core table component model for Tabletop (components, containers, tables).

/// Component and container scene-graph nodes.
pub mod component;
/// Configuration loading and defaults.
pub mod config;
/// Shared layout and naming constants.
pub mod constants;
/// Component surface designs and the design registry.
pub mod design;
/// Table environment: lock, notification worker and factories.
pub mod environment;
/// Error types for the component model.
pub mod error;
/// Table-space geometry primitives.
pub mod geometry;
/// Container layout strategies.
pub mod layout;
/// Attribute-map snapshots used for persistence and cloning.
pub mod memento;
/// Closed per-kind orientation sets.
pub mod orientation;
/// Component strategies and the strategy registry.
pub mod strategy;
/// Tables and drag-and-drop sessions.
pub mod table;

#[cfg(test)]
pub(crate) mod test_support;

pub use component::{
    Component, ComponentEvent, ComponentFactory, ComponentListener, Container,
    ContainerContentChangedEvent, ContainerEvent, ContainerListener,
};
pub use config::Config;
pub use constants::*;
pub use design::{ComponentSurfaceDesign, ComponentSurfaceDesignId, DesignRegistry};
pub use environment::{TableEnvironment, TableEnvironmentGuard};
pub use error::{MementoError, TableError};
pub use geometry::{Dimension, Point, Rectangle};
pub use layout::ContainerLayout;
pub use memento::{Memento, MementoValue};
pub use orientation::{
    CardOrientation, CardPileOrientation, ComponentOrientation, NullOrientation,
    TabletopOrientation,
};
pub use strategy::{ComponentStrategy, ComponentStrategyId, StrategyKind, StrategyRegistry};
pub use table::{DragContext, DragState, Table};
