//! Rule-based message understanding for SmartCart.
//!
//! The deterministic half of the pipeline: unit normalization, a lexicon
//! tagger behind the `Tagger` seam, keyword intent classification,
//! positional entity extraction, and templated replies. Everything here is
//! synchronous and never fails on valid text.

pub mod classifier;
pub mod extractor;
pub mod synth;
pub mod tagger;
pub mod units;

// Re-export key types for convenience
pub use classifier::{Classification, INTENT_TRIGGERS, classify_intent};
pub use extractor::{ENTITY_CONFIDENCE, extract_entities};
pub use synth::synthesize;
pub use tagger::{Chunk, LexiconTagger, Tagger, Token, TokenKind};
pub use units::{UNIT_TABLE, detect_unit, normalize_unit};
