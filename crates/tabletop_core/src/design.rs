//! Component surface designs.

use crate::constants::NULL_DESIGN_ID;
use crate::error::TableError;
use crate::geometry::Dimension;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a surface design.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentSurfaceDesignId(Arc<str>);

impl ComponentSurfaceDesignId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentSurfaceDesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sized visual asset reference shown for one component orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentSurfaceDesign {
    id: ComponentSurfaceDesignId,
    size: Dimension,
}

impl ComponentSurfaceDesign {
    /// Create a design; width and height must not be negative.
    pub fn new(id: ComponentSurfaceDesignId, size: Dimension) -> Result<Self, TableError> {
        if size.width < 0 || size.height < 0 {
            return Err(TableError::argument(format!(
                "surface design '{}' has a negative size {}x{}",
                id, size.width, size.height
            )));
        }
        Ok(Self { id, size })
    }

    /// The zero-sized placeholder design.
    pub fn null() -> Self {
        Self {
            id: ComponentSurfaceDesignId::new(NULL_DESIGN_ID),
            size: Dimension::ZERO,
        }
    }

    pub fn id(&self) -> &ComponentSurfaceDesignId {
        &self.id
    }

    pub fn size(&self) -> Dimension {
        self.size
    }
}

/// Lookup table of surface designs by id.
#[derive(Debug, Clone, Default)]
pub struct DesignRegistry {
    designs: HashMap<ComponentSurfaceDesignId, ComponentSurfaceDesign>,
}

impl DesignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `design`; re-registering an id is rejected.
    pub fn register(&mut self, design: ComponentSurfaceDesign) -> Result<(), TableError> {
        if self.designs.contains_key(design.id()) {
            return Err(TableError::argument(format!(
                "surface design '{}' is already registered",
                design.id()
            )));
        }
        self.designs.insert(design.id().clone(), design);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ComponentSurfaceDesign> {
        self.designs.get(&ComponentSurfaceDesignId::new(id))
    }

    /// Resolve `id` or fail with an argument error.
    pub fn require(&self, id: &str) -> Result<ComponentSurfaceDesign, TableError> {
        self.get(id)
            .cloned()
            .ok_or_else(|| TableError::argument(format!("unknown surface design '{}'", id)))
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }
}
