//! Component strategies: read-only descriptors of a component kind.
//!
//! Strategies are resolved by stable string id through a [`StrategyRegistry`]
//! that the application builds once at startup and hands to the
//! [`TableEnvironment`](crate::TableEnvironment).

use crate::constants::*;
use crate::design::{ComponentSurfaceDesign, ComponentSurfaceDesignId};
use crate::error::TableError;
use crate::geometry::{Dimension, Point};
use crate::layout::ContainerLayout;
use crate::orientation::{
    CardOrientation, CardPileOrientation, ComponentOrientation, NullOrientation,
    TabletopOrientation,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Card,
    CardPile,
    Tabletop,
    NullComponent,
    NullContainer,
}

impl StrategyKind {
    /// `true` for kinds whose components own children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::CardPile | Self::Tabletop | Self::NullContainer)
    }
}

/// Stable identifier of a component strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentStrategyId(Arc<str>);

impl ComponentStrategyId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentStrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Defaults and supported orientations for one kind of component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentStrategy {
    id: ComponentStrategyId,
    kind: StrategyKind,
    default_location: Point,
    default_orientation: ComponentOrientation,
    default_surface_designs: BTreeMap<ComponentOrientation, ComponentSurfaceDesign>,
    default_layout: Option<ContainerLayout>,
}

impl ComponentStrategy {
    /// Create a strategy.
    ///
    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] when the default orientation is
    /// not supported by `kind`, when the design map does not cover exactly the
    /// supported orientations, or when a layout is given for a non-container
    /// kind (or omitted for a container kind).
    pub fn new(
        id: ComponentStrategyId,
        kind: StrategyKind,
        default_orientation: ComponentOrientation,
        default_surface_designs: BTreeMap<ComponentOrientation, ComponentSurfaceDesign>,
        default_layout: Option<ContainerLayout>,
    ) -> Result<Self, TableError> {
        let supported = ComponentOrientation::values_for(kind);
        if !supported.contains(&default_orientation) {
            return Err(TableError::argument(format!(
                "strategy '{}' default orientation '{}' is not supported",
                id, default_orientation
            )));
        }
        validate_design_keys(supported, &default_surface_designs)?;
        if kind.is_container() != default_layout.is_some() {
            return Err(TableError::argument(format!(
                "strategy '{}' must declare a default layout if and only if it is a container",
                id
            )));
        }
        Ok(Self {
            id,
            kind,
            default_location: Point::ORIGIN,
            default_orientation,
            default_surface_designs,
            default_layout,
        })
    }

    pub fn with_default_location(mut self, location: Point) -> Self {
        self.default_location = location;
        self
    }

    pub fn id(&self) -> &ComponentStrategyId {
        &self.id
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn supported_orientations(&self) -> &'static [ComponentOrientation] {
        ComponentOrientation::values_for(self.kind)
    }

    pub fn supports(&self, orientation: ComponentOrientation) -> bool {
        self.supported_orientations().contains(&orientation)
    }

    pub fn default_location(&self) -> Point {
        self.default_location
    }

    pub fn default_orientation(&self) -> ComponentOrientation {
        self.default_orientation
    }

    pub fn default_surface_designs(&self) -> &BTreeMap<ComponentOrientation, ComponentSurfaceDesign> {
        &self.default_surface_designs
    }

    /// Default layout; `None` for non-container strategies.
    pub fn default_layout(&self) -> Option<ContainerLayout> {
        self.default_layout
    }
}

/// Check that `designs` has exactly one entry per supported orientation.
pub(crate) fn validate_design_keys(
    supported: &[ComponentOrientation],
    designs: &BTreeMap<ComponentOrientation, ComponentSurfaceDesign>,
) -> Result<(), TableError> {
    if designs.len() != supported.len()
        || !supported.iter().all(|orientation| designs.contains_key(orientation))
    {
        let given: Vec<&str> = designs.keys().map(|o| o.name()).collect();
        let expected: Vec<&str> = supported.iter().map(|o| o.name()).collect();
        return Err(TableError::argument(format!(
            "surface designs cover {:?} but the supported orientations are {:?}",
            given, expected
        )));
    }
    Ok(())
}

/// Registry of strategies keyed by their stable id.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<ComponentStrategyId, Arc<ComponentStrategy>>,
}

impl StrategyRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in card, card pile, tabletop and null strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for strategy in builtin_strategies() {
            registry.strategies.insert(strategy.id.clone(), Arc::new(strategy));
        }
        registry
    }

    /// Register `strategy`; an id may only be registered once.
    pub fn register(&mut self, strategy: ComponentStrategy) -> Result<Arc<ComponentStrategy>, TableError> {
        if self.strategies.contains_key(strategy.id()) {
            return Err(TableError::argument(format!(
                "component strategy '{}' is already registered",
                strategy.id()
            )));
        }
        let strategy = Arc::new(strategy);
        self.strategies
            .insert(strategy.id().clone(), Arc::clone(&strategy));
        Ok(strategy)
    }

    pub fn get(&self, id: &str) -> Option<Arc<ComponentStrategy>> {
        self.strategies.get(&ComponentStrategyId::new(id)).cloned()
    }

    /// Resolve `id` or fail with an argument error.
    pub fn require(&self, id: &str) -> Result<Arc<ComponentStrategy>, TableError> {
        self.get(id)
            .ok_or_else(|| TableError::argument(format!("unknown component strategy '{}'", id)))
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

fn builtin_design(id: &str, width: i32, height: i32) -> ComponentSurfaceDesign {
    ComponentSurfaceDesign::new(
        ComponentSurfaceDesignId::new(id),
        Dimension::new(width, height),
    )
    .unwrap_or_else(|_| ComponentSurfaceDesign::null())
}

fn builtin_strategies() -> Vec<ComponentStrategy> {
    let card_back = ComponentOrientation::Card(CardOrientation::Back);
    let card_face = ComponentOrientation::Card(CardOrientation::Face);
    let pile_base = ComponentOrientation::CardPile(CardPileOrientation::Base);
    let tabletop = ComponentOrientation::Tabletop(TabletopOrientation::Default);
    let null = ComponentOrientation::Null(NullOrientation::Default);

    let make = |id: &str,
                kind: StrategyKind,
                orientation: ComponentOrientation,
                designs: Vec<(ComponentOrientation, ComponentSurfaceDesign)>,
                layout: Option<ContainerLayout>| ComponentStrategy {
        id: ComponentStrategyId::new(id),
        kind,
        default_location: Point::ORIGIN,
        default_orientation: orientation,
        default_surface_designs: designs.into_iter().collect(),
        default_layout: layout,
    };

    vec![
        make(
            CARD_STRATEGY_ID,
            StrategyKind::Card,
            card_back,
            vec![
                (card_back, builtin_design(CARD_BACK_DESIGN_ID, 71, 96)),
                (card_face, builtin_design(CARD_FACE_DESIGN_ID, 71, 96)),
            ],
            None,
        ),
        make(
            CARD_PILE_STRATEGY_ID,
            StrategyKind::CardPile,
            pile_base,
            vec![(pile_base, builtin_design(CARD_PILE_BASE_DESIGN_ID, 71, 96))],
            Some(ContainerLayout::Stacked),
        ),
        make(
            TABLETOP_STRATEGY_ID,
            StrategyKind::Tabletop,
            tabletop,
            vec![(tabletop, builtin_design(TABLETOP_DESIGN_ID, 0, 0))],
            Some(ContainerLayout::Absolute),
        ),
        make(
            NULL_COMPONENT_STRATEGY_ID,
            StrategyKind::NullComponent,
            null,
            vec![(null, ComponentSurfaceDesign::null())],
            None,
        ),
        make(
            NULL_CONTAINER_STRATEGY_ID,
            StrategyKind::NullContainer,
            null,
            vec![(null, ComponentSurfaceDesign::null())],
            Some(ContainerLayout::Absolute),
        ),
    ]
}
