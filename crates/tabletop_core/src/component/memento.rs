//! Memento encoding and reconstruction for components and containers.

use super::{Component, Container};
use crate::design::{ComponentSurfaceDesign, ComponentSurfaceDesignId};
use crate::environment::{TableEnvironment, TableEnvironmentGuard};
use crate::error::{MementoError, TableError};
use crate::geometry::{Dimension, Point};
use crate::layout::ContainerLayout;
use crate::memento::{Memento, MementoValue};
use crate::orientation::ComponentOrientation;
use crate::strategy::{ComponentStrategy, StrategyKind};
use std::collections::BTreeMap;
use std::sync::Arc;

const TYPE: &str = "type";
const COMPONENT_TYPE: &str = "component";
const CONTAINER_TYPE: &str = "container";
const STRATEGY_ID: &str = "strategyId";
const LOCATION: &str = "location";
const X: &str = "x";
const Y: &str = "y";
const ORIENTATION: &str = "orientation";
const SURFACE_DESIGNS: &str = "surfaceDesigns";
const DESIGN_ID: &str = "id";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const LAYOUT_ID: &str = "layoutId";
const COMPONENTS: &str = "components";

/// Decoded, validated memento contents, ready to apply.
struct ComponentSnapshot {
    strategy: Arc<ComponentStrategy>,
    location: Point,
    orientation: ComponentOrientation,
    surface_designs: BTreeMap<ComponentOrientation, ComponentSurfaceDesign>,
    contents: Option<ContainerSnapshot>,
}

struct ContainerSnapshot {
    layout: ContainerLayout,
    components: Vec<Component>,
}

fn has_type(memento: &Memento, expected: &str) -> bool {
    matches!(memento.get(TYPE), Some(MementoValue::Text(kind)) if kind == expected)
}

fn encode_point(point: Point) -> Memento {
    Memento::new().with(X, point.x).with(Y, point.y)
}

fn decode_point(memento: &Memento) -> Result<Point, MementoError> {
    Ok(Point::new(memento.require_i32(X)?, memento.require_i32(Y)?))
}

fn encode_designs(designs: &BTreeMap<ComponentOrientation, ComponentSurfaceDesign>) -> Memento {
    designs
        .iter()
        .fold(Memento::new(), |memento, (orientation, design)| {
            memento.with(
                orientation.name(),
                Memento::new()
                    .with(DESIGN_ID, design.id().as_str())
                    .with(WIDTH, design.size().width)
                    .with(HEIGHT, design.size().height),
            )
        })
}

fn decode_designs(
    kind: StrategyKind,
    memento: &Memento,
) -> Result<BTreeMap<ComponentOrientation, ComponentSurfaceDesign>, MementoError> {
    let mut designs = BTreeMap::new();
    for (name, value) in memento.iter() {
        let orientation = ComponentOrientation::from_name(kind, name)
            .ok_or_else(|| MementoError::UnknownOrientation(name.to_string()))?;
        let MementoValue::Map(entry) = value else {
            return Err(MementoError::wrong_type(SURFACE_DESIGNS, "map of maps"));
        };
        let width = entry.require_i32(WIDTH)?;
        let height = entry.require_i32(HEIGHT)?;
        let design = ComponentSurfaceDesign::new(
            ComponentSurfaceDesignId::new(entry.require_text(DESIGN_ID)?),
            Dimension::new(width, height),
        )
        .map_err(|_| MementoError::OutOfRange {
            name: format!("{}.{}", SURFACE_DESIGNS, name),
            value: i64::from(width.min(height)),
        })?;
        designs.insert(orientation, design);
    }
    if let Some(missing) = ComponentOrientation::values_for(kind)
        .iter()
        .find(|orientation| !designs.contains_key(*orientation))
    {
        return Err(MementoError::MissingAttribute(format!(
            "{}.{}",
            SURFACE_DESIGNS,
            missing.name()
        )));
    }
    Ok(designs)
}

fn decode(env: &TableEnvironment, memento: &Memento) -> Result<ComponentSnapshot, TableError> {
    let expects_container = match memento.require_text(TYPE)? {
        COMPONENT_TYPE => false,
        CONTAINER_TYPE => true,
        other => return Err(MementoError::UnknownKind(other.to_string()).into()),
    };
    let strategy_id = memento.require_text(STRATEGY_ID)?;
    let strategy = env
        .strategies()
        .get(strategy_id)
        .ok_or_else(|| MementoError::UnknownStrategy(strategy_id.to_string()))?;
    if strategy.is_container() != expects_container {
        return Err(MementoError::UnknownKind(format!(
            "{} memento for strategy '{}'",
            if expects_container { CONTAINER_TYPE } else { COMPONENT_TYPE },
            strategy_id
        ))
        .into());
    }

    let location = decode_point(memento.require_map(LOCATION)?)?;
    let orientation_name = memento.require_text(ORIENTATION)?;
    let orientation = ComponentOrientation::from_name(strategy.kind(), orientation_name)
        .ok_or_else(|| MementoError::UnknownOrientation(orientation_name.to_string()))?;
    let surface_designs = decode_designs(strategy.kind(), memento.require_map(SURFACE_DESIGNS)?)?;

    let contents = if expects_container {
        let layout_id = memento.require_text(LAYOUT_ID)?;
        let layout = ContainerLayout::from_id(layout_id)
            .ok_or_else(|| MementoError::UnknownLayout(layout_id.to_string()))?;
        let mut components = Vec::new();
        for value in memento.require_list(COMPONENTS)? {
            let MementoValue::Map(child) = value else {
                return Err(MementoError::wrong_type(COMPONENTS, "list of maps").into());
            };
            let component = ComponentFactory::create_component(env, child)
                .map_err(|err| MementoError::Component(Box::new(err)))?;
            components.push(component);
        }
        Some(ContainerSnapshot { layout, components })
    } else {
        None
    };

    Ok(ComponentSnapshot {
        strategy,
        location,
        orientation,
        surface_designs,
        contents,
    })
}

impl Component {
    /// `true` if `memento` describes a plain (non-container) component.
    pub fn is_memento(memento: &Memento) -> bool {
        has_type(memento, COMPONENT_TYPE)
    }

    /// Reconstruct a plain component.
    ///
    /// # Errors
    /// Returns [`TableError::MementoFormat`] when `memento` is not a component
    /// memento or any attribute is missing or malformed.
    pub fn from_memento(env: &TableEnvironment, memento: &Memento) -> Result<Component, TableError> {
        if !Self::is_memento(memento) {
            return Err(MementoError::UnknownKind(describe_type(memento)).into());
        }
        build(env, memento)
    }

    /// Snapshot of this component's observable state.
    pub fn create_memento(&self) -> Memento {
        let _guard = self.environment().lock();
        self.memento_locked()
    }

    /// Replace this component's state with the state in `memento`.
    ///
    /// The memento is fully decoded before anything changes. Containers
    /// replace their children with freshly built ones.
    ///
    /// # Errors
    /// Returns [`TableError::MementoFormat`] when `memento` is malformed or was
    /// taken from a component with a different strategy, and
    /// [`TableError::IllegalState`] when `self` holds an active drag's mobile
    /// container.
    pub fn set_memento(&self, memento: &Memento) -> Result<(), TableError> {
        let guard = self.environment().lock();
        if self
            .table_locked()
            .is_some_and(|table| table.holds_mobile_container_locked(self))
        {
            return Err(TableError::state(
                "cannot restore a component that holds an active drag",
            ));
        }
        let snapshot = decode(self.environment(), memento)?;
        if snapshot.strategy.id() != self.strategy().id() {
            return Err(MementoError::StrategyMismatch {
                expected: self.strategy().id().to_string(),
                found: snapshot.strategy.id().to_string(),
            }
            .into());
        }
        if self.apply_snapshot_locked(&guard, snapshot)? {
            self.bump_revision_locked();
        }
        Ok(())
    }

    pub(crate) fn memento_locked(&self) -> Memento {
        let mut memento = Memento::new()
            .with(
                TYPE,
                if self.is_container() {
                    CONTAINER_TYPE
                } else {
                    COMPONENT_TYPE
                },
            )
            .with(STRATEGY_ID, self.strategy().id().as_str())
            .with(LOCATION, encode_point(self.location_locked()))
            .with(ORIENTATION, self.orientation_locked().name())
            .with(SURFACE_DESIGNS, encode_designs(&self.surface_designs_locked()));
        if let Some(container) = self.as_container() {
            memento.insert(LAYOUT_ID, container.layout_id_locked().id());
            let children: Vec<MementoValue> = container
                .children_locked()
                .iter()
                .map(|child| MementoValue::Map(child.memento_locked()))
                .collect();
            memento.insert(COMPONENTS, children);
        }
        memento
    }

    /// Returns `true` if anything changed.
    fn apply_snapshot_locked(
        &self,
        guard: &TableEnvironmentGuard<'_>,
        snapshot: ComponentSnapshot,
    ) -> Result<bool, TableError> {
        let mut changed = false;
        let container = self.as_container();
        if let Some(container) = &container {
            let count = container.len_locked();
            changed |= container.remove_locked(guard, 0..count)?.1;
        }
        changed |= self.set_surface_designs_locked(guard, &snapshot.surface_designs);
        changed |= self.set_orientation_locked(guard, snapshot.orientation);
        changed |= self.set_location_locked(guard, snapshot.location);
        if let (Some(container), Some(contents)) = (container, snapshot.contents) {
            if container.layout_id_locked() != contents.layout {
                container.set_layout_locked(guard, contents.layout);
                changed = true;
            }
            changed |= container.insert_locked(guard, 0, &contents.components)?;
        }
        Ok(changed)
    }
}

impl Container {
    /// `true` if `memento` describes a container.
    pub fn is_memento(memento: &Memento) -> bool {
        has_type(memento, CONTAINER_TYPE)
    }

    /// Reconstruct a container and its children.
    ///
    /// # Errors
    /// Returns [`TableError::MementoFormat`] when `memento` is not a container
    /// memento or any attribute (including nested children) is malformed.
    pub fn from_memento(env: &TableEnvironment, memento: &Memento) -> Result<Container, TableError> {
        if !Self::is_memento(memento) {
            return Err(MementoError::UnknownKind(describe_type(memento)).into());
        }
        let component = build(env, memento)?;
        component
            .as_container()
            .ok_or_else(|| MementoError::UnknownKind(describe_type(memento)).into())
    }
}

fn describe_type(memento: &Memento) -> String {
    match memento.get(TYPE) {
        Some(MementoValue::Text(kind)) => kind.clone(),
        Some(_) => "<non-text type>".to_string(),
        None => "<missing type>".to_string(),
    }
}

fn build(env: &TableEnvironment, memento: &Memento) -> Result<Component, TableError> {
    let guard = env.lock();
    let snapshot = decode(env, memento)?;
    let component = Component::new(env, Arc::clone(&snapshot.strategy));
    component.apply_snapshot_locked(&guard, snapshot)?;
    Ok(component)
}

/// Reconstructs components whose concrete kind is only known from the memento.
pub struct ComponentFactory;

impl ComponentFactory {
    /// Build a component or container, dispatching on the memento's type.
    ///
    /// # Errors
    /// Returns [`TableError::MementoFormat`] for unknown or malformed mementos.
    pub fn create_component(env: &TableEnvironment, memento: &Memento) -> Result<Component, TableError> {
        if Container::is_memento(memento) {
            Container::from_memento(env, memento).map(Container::into_component)
        } else if Component::is_memento(memento) {
            Component::from_memento(env, memento)
        } else {
            Err(MementoError::UnknownKind(describe_type(memento)).into())
        }
    }

    /// Deep copy of `component` with no container, built from its memento.
    pub fn clone_component(component: &Component) -> Result<Component, TableError> {
        let memento = component.create_memento();
        Self::create_component(component.environment(), &memento)
    }
}
