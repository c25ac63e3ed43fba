//! Entity extraction: product names, quantities and a unit per message.
//!
//! Pairing is positional: the i-th noun chunk takes the i-th number in the
//! message, whatever their distance. Unit detection is message-global and
//! matches unit forms anywhere in the text, so every entity of one message
//! carries the same unit.

use sc_protocol::Entity;

use crate::tagger::{Tagger, Token};
use crate::units::detect_unit;

/// Confidence assigned to every rule-extracted entity.
pub const ENTITY_CONFIDENCE: f64 = 0.8;

/// Extract product entities from `message`, left to right.
///
/// Returns an empty list when no tagger is available.
pub fn extract_entities(message: &str, tagger: Option<&dyn Tagger>) -> Vec<Entity> {
    let Some(tagger) = tagger else {
        tracing::debug!("no tagger available, skipping entity extraction");
        return Vec::new();
    };

    let tokens = tagger.tag(message);
    let quantities = quantities(&tokens);
    let products = tagger.noun_chunks(message);
    let unit = detect_unit(message);

    products
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            Entity::new(
                chunk.text,
                quantities.get(i).copied(),
                unit,
                ENTITY_CONFIDENCE,
            )
        })
        .collect()
}

/// Numeric tokens in message order.
///
/// Every number keeps its slot, even one that overflows to infinity;
/// [`Entity::new`] repairs such a quantity to the default.
fn quantities(tokens: &[Token]) -> Vec<f64> {
    tokens
        .iter()
        .filter(|t| t.like_num())
        .filter_map(Token::number_value)
        .collect()
}
