//! Shared constants used across Tabletop crates.

/// Default name of the per-environment event notification thread.
pub const DEFAULT_EVENT_THREAD_NAME: &str = "tabletop-events";

/// Number of children per level in the stacked container layout.
pub const STACKED_COMPONENTS_PER_LEVEL: usize = 10;
/// Horizontal offset between successive stack levels.
pub const STACKED_LEVEL_OFFSET_X: i32 = 2;
/// Vertical offset between successive stack levels.
pub const STACKED_LEVEL_OFFSET_Y: i32 = 1;

/// Offset between successive children in the accordian layouts.
pub const ACCORDIAN_OFFSET: i32 = 16;

/// Stable id of the built-in default card strategy.
pub const CARD_STRATEGY_ID: &str = "card.default";
/// Stable id of the built-in default card pile strategy.
pub const CARD_PILE_STRATEGY_ID: &str = "card_pile.default";
/// Stable id of the built-in tabletop strategy.
pub const TABLETOP_STRATEGY_ID: &str = "tabletop.default";
/// Stable id of the built-in null component strategy.
pub const NULL_COMPONENT_STRATEGY_ID: &str = "null.component";
/// Stable id of the built-in null container strategy (used for mobile containers).
pub const NULL_CONTAINER_STRATEGY_ID: &str = "null.container";

/// Design ids used by the built-in strategies.
pub const CARD_BACK_DESIGN_ID: &str = "card.back.default";
/// Face design of the default card strategy.
pub const CARD_FACE_DESIGN_ID: &str = "card.face.default";
/// Base design of the default card pile strategy.
pub const CARD_PILE_BASE_DESIGN_ID: &str = "card_pile.base.default";
/// Surface design of the tabletop.
pub const TABLETOP_DESIGN_ID: &str = "tabletop.default";
/// Zero-sized placeholder design.
pub const NULL_DESIGN_ID: &str = "null";
