//! Templated replies for the rule-based path.

use sc_protocol::{Entity, Intent};

pub const CART_SUMMARY: &str = "Here's what's in your cart...";
pub const WELCOME: &str = "Hello! Welcome to SmartCart. How can I help you today?";
pub const HELP_PROMPT: &str = "I'm here to help you order groceries. What would you like?";

/// Build the user-facing reply for an intent and its entities.
///
/// Pure: the same inputs always give the same string.
pub fn synthesize(intent: Intent, entities: &[Entity]) -> String {
    match intent {
        Intent::AddToCart if !entities.is_empty() => {
            let products: Vec<&str> = entities.iter().map(|e| e.product.as_str()).collect();
            format!("Got it! Adding {} to your cart.", products.join(", "))
        }
        Intent::ViewCart => CART_SUMMARY.to_string(),
        Intent::Greeting => WELCOME.to_string(),
        _ => HELP_PROMPT.to_string(),
    }
}
