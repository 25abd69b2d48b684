//! Demo table contents used when no snapshot exists yet.

use tabletop_core::{
    Component, ContainerLayout, Point, Table, TableEnvironment, TableError, CARD_PILE_STRATEGY_ID,
    CARD_STRATEGY_ID, NULL_CONTAINER_STRATEGY_ID,
};
use tracing::debug;

/// Cards in the demo deck.
pub const DECK_SIZE: usize = 52;
/// Cards dealt face up into the spread.
pub const HAND_SIZE: usize = 5;

/// Put a face-down deck and a face-up spread of cards on the tabletop.
///
/// # Errors
/// Fails if the environment's registry lacks a built-in strategy.
pub fn deal_demo_table(env: &TableEnvironment, table: &Table) -> Result<(), TableError> {
    let _guard = env.lock();

    let deck = env
        .create_container(env.strategies().require(CARD_PILE_STRATEGY_ID)?)?;
    deck.set_location(Point::new(20, 20));
    let cards = (0..DECK_SIZE - HAND_SIZE)
        .map(|_| env.create_component_by_id(CARD_STRATEGY_ID))
        .collect::<Result<Vec<Component>, _>>()?;
    deck.add_components(&cards)?;

    let hand = env.create_container(env.strategies().require(NULL_CONTAINER_STRATEGY_ID)?)?;
    hand.set_location(Point::new(140, 20));
    hand.set_layout(ContainerLayout::AccordianRight);
    for _ in 0..HAND_SIZE {
        let card = env.create_component_by_id(CARD_STRATEGY_ID)?;
        card.flip()?;
        hand.add_component(&card)?;
    }

    table
        .tabletop()
        .add_components(&[deck.into_component(), hand.into_component()])?;
    debug!(deck = DECK_SIZE - HAND_SIZE, hand = HAND_SIZE, "demo table dealt");
    Ok(())
}
