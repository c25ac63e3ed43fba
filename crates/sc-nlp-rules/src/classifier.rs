//! Keyword intent classifier.
//!
//! Handles every message at zero cost: a fixed trigger table scanned in
//! priority order, then a noun check, then the `help` default.

use sc_protocol::Intent;

use crate::tagger::Tagger;

/// Intent → trigger phrases, in priority order.
///
/// Matching is case-insensitive substring search; the first phrase that
/// occurs anywhere in the message decides the intent.
pub const INTENT_TRIGGERS: &[(Intent, &[&str])] = &[
    (
        Intent::AddToCart,
        &["need", "want", "buy", "get", "add", "order"],
    ),
    (
        Intent::ViewCart,
        &["cart", "basket", "show cart", "what's in", "my order"],
    ),
    (
        Intent::Checkout,
        &["checkout", "pay", "complete", "finish", "confirm order"],
    ),
    (
        Intent::TrackOrder,
        &["track", "where is", "status", "delivery"],
    ),
    (
        Intent::SearchProduct,
        &["search", "find", "looking for", "do you have"],
    ),
    (Intent::Help, &["help", "how", "what can", "commands"]),
    (Intent::Greeting, &["hi", "hello", "hey", "good morning"]),
    (
        Intent::RemoveFromCart,
        &["remove", "delete", "cancel item"],
    ),
];

/// Confidence for a trigger-phrase hit.
pub const TRIGGER_CONFIDENCE: f64 = 0.9;
/// Confidence when only a noun suggests a product search.
pub const NOUN_CONFIDENCE: f64 = 0.7;
/// Confidence of the `help` default.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Intent plus how sure the classifier is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f64,
}

impl Classification {
    fn new(intent: Intent, confidence: f64) -> Self {
        Self { intent, confidence }
    }
}

/// Classify a message.
///
/// Without a tagger the noun check is skipped, so unmatched text goes
/// straight to `help`. Never fails; empty input yields `(help, 0.5)`.
pub fn classify_intent(message: &str, tagger: Option<&dyn Tagger>) -> Classification {
    let lower = message.to_lowercase();

    if let Some(intent) = match_trigger(&lower) {
        return Classification::new(intent, TRIGGER_CONFIDENCE);
    }

    if let Some(tagger) = tagger {
        if tagger.tag(message).iter().any(|t| t.is_noun()) {
            return Classification::new(Intent::SearchProduct, NOUN_CONFIDENCE);
        }
    }

    Classification::new(Intent::Help, DEFAULT_CONFIDENCE)
}

fn match_trigger(lower: &str) -> Option<Intent> {
    INTENT_TRIGGERS
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(intent, _)| *intent)
}
