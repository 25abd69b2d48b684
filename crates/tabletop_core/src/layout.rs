//! Container layouts: pure mappings from child index to position.

use crate::constants::{
    ACCORDIAN_OFFSET, STACKED_COMPONENTS_PER_LEVEL, STACKED_LEVEL_OFFSET_X,
    STACKED_LEVEL_OFFSET_Y,
};
use crate::geometry::{Dimension, Point};
use std::fmt;

/// Positioning algorithm applied to a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerLayout {
    /// Children keep their own absolute locations.
    Absolute,
    /// Children are bucketed into staggered stack levels, like a deck.
    Stacked,
    AccordianUp,
    AccordianDown,
    AccordianLeft,
    AccordianRight,
}

impl ContainerLayout {
    pub const ALL: [ContainerLayout; 6] = [
        ContainerLayout::Absolute,
        ContainerLayout::Stacked,
        ContainerLayout::AccordianUp,
        ContainerLayout::AccordianDown,
        ContainerLayout::AccordianLeft,
        ContainerLayout::AccordianRight,
    ];

    /// Stable id used in mementos.
    pub fn id(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Stacked => "stacked",
            Self::AccordianUp => "accordian_up",
            Self::AccordianDown => "accordian_down",
            Self::AccordianLeft => "accordian_left",
            Self::AccordianRight => "accordian_right",
        }
    }

    pub fn from_id(id: &str) -> Option<ContainerLayout> {
        Self::ALL.iter().copied().find(|layout| layout.id() == id)
    }

    /// Offset of the child at `index` from the container origin.
    ///
    /// `current` is the child's location before layout; only the absolute
    /// layout reads it.
    pub fn component_offset(self, origin: Point, current: Point, index: usize) -> Dimension {
        let step = i32::try_from(index).unwrap_or(i32::MAX);
        match self {
            Self::Absolute => current - origin,
            Self::Stacked => {
                let level = i32::try_from(index / STACKED_COMPONENTS_PER_LEVEL).unwrap_or(i32::MAX);
                Dimension::new(
                    level.saturating_mul(STACKED_LEVEL_OFFSET_X),
                    level.saturating_mul(STACKED_LEVEL_OFFSET_Y),
                )
            }
            Self::AccordianUp => Dimension::new(0, step.saturating_mul(-ACCORDIAN_OFFSET)),
            Self::AccordianDown => Dimension::new(0, step.saturating_mul(ACCORDIAN_OFFSET)),
            Self::AccordianLeft => Dimension::new(step.saturating_mul(-ACCORDIAN_OFFSET), 0),
            Self::AccordianRight => Dimension::new(step.saturating_mul(ACCORDIAN_OFFSET), 0),
        }
    }

    /// Location the child at `index` is moved to.
    pub fn component_location(self, origin: Point, current: Point, index: usize) -> Point {
        origin + self.component_offset(origin, current, index)
    }
}

impl fmt::Display for ContainerLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
