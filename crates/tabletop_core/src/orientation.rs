//! Closed orientation sets, one per component kind.

use crate::strategy::StrategyKind;
use std::fmt;

/// Orientations of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardOrientation {
    Back,
    Face,
}

impl CardOrientation {
    /// The opposite side of the card.
    pub fn inverse(self) -> Self {
        match self {
            Self::Back => Self::Face,
            Self::Face => Self::Back,
        }
    }
}

/// Orientations of a card pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CardPileOrientation {
    Base,
}

/// Orientations of the tabletop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TabletopOrientation {
    Default,
}

/// Orientations of null components and containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NullOrientation {
    Default,
}

/// Orientation of any component, tagged by component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentOrientation {
    Card(CardOrientation),
    CardPile(CardPileOrientation),
    Tabletop(TabletopOrientation),
    Null(NullOrientation),
}

const CARD_ORIENTATIONS: &[ComponentOrientation] = &[
    ComponentOrientation::Card(CardOrientation::Back),
    ComponentOrientation::Card(CardOrientation::Face),
];
const CARD_PILE_ORIENTATIONS: &[ComponentOrientation] =
    &[ComponentOrientation::CardPile(CardPileOrientation::Base)];
const TABLETOP_ORIENTATIONS: &[ComponentOrientation] =
    &[ComponentOrientation::Tabletop(TabletopOrientation::Default)];
const NULL_ORIENTATIONS: &[ComponentOrientation] =
    &[ComponentOrientation::Null(NullOrientation::Default)];

impl ComponentOrientation {
    /// Stable name used in mementos.
    pub fn name(self) -> &'static str {
        match self {
            Self::Card(CardOrientation::Back) => "back",
            Self::Card(CardOrientation::Face) => "face",
            Self::CardPile(CardPileOrientation::Base) => "base",
            Self::Tabletop(TabletopOrientation::Default) | Self::Null(NullOrientation::Default) => {
                "default"
            }
        }
    }

    /// Every orientation a component of `kind` supports, in declaration order.
    pub fn values_for(kind: StrategyKind) -> &'static [ComponentOrientation] {
        match kind {
            StrategyKind::Card => CARD_ORIENTATIONS,
            StrategyKind::CardPile => CARD_PILE_ORIENTATIONS,
            StrategyKind::Tabletop => TABLETOP_ORIENTATIONS,
            StrategyKind::NullComponent | StrategyKind::NullContainer => NULL_ORIENTATIONS,
        }
    }

    /// Resolve an orientation name within the orientation set of `kind`.
    pub fn from_name(kind: StrategyKind, name: &str) -> Option<ComponentOrientation> {
        Self::values_for(kind)
            .iter()
            .copied()
            .find(|orientation| orientation.name() == name)
    }
}

impl fmt::Display for ComponentOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
