//! Result shaping: sort by id, then optionally truncate

use crate::hearthstone::Card;

/// Sort cards ascending by id
pub fn sort_by_id(cards: &mut [Card]) {
    cards.sort_by_key(|card| card.id);
}

/// Keep the first `limit` cards when the list holds at least that many
///
/// A limit larger than the list leaves it unchanged.
pub fn apply_limit(mut cards: Vec<Card>, limit: Option<usize>) -> Vec<Card> {
    if let Some(limit) = limit {
        if cards.len() >= limit {
            cards.truncate(limit);
        }
    }
    cards
}

/// Sort then limit
pub fn shape_cards(mut cards: Vec<Card>, limit: Option<usize>) -> Vec<Card> {
    sort_by_id(&mut cards);
    apply_limit(cards, limit)
}
