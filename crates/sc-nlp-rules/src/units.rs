//! Unit normalization: free-form unit tokens to canonical [`Unit`]s.

use sc_protocol::Unit;

/// Canonical unit → accepted surface forms.
///
/// Scanned top to bottom, first match wins. The order is part of the
/// contract: a message mentioning both "kg" and "dozen" resolves to `Kg`.
pub const UNIT_TABLE: &[(Unit, &[&str])] = &[
    (Unit::Kg, &["kg", "kilo", "kilogram"]),
    (Unit::Gram, &["g", "gram", "grams", "gm"]),
    (Unit::Liter, &["l", "liter", "litre", "lt"]),
    (Unit::Ml, &["ml", "milliliter", "millilitre"]),
    (Unit::Piece, &["piece", "pieces", "pc", "pcs"]),
    (Unit::Dozen, &["dozen"]),
    (Unit::Packet, &["packet", "pack", "pkt"]),
];

/// Map one raw unit token (any case) to its canonical unit.
///
/// Unrecognized tokens default to [`Unit::Piece`].
pub fn normalize_unit(token: &str) -> Unit {
    lookup(&token.trim().to_lowercase()).unwrap_or_default()
}

/// Whether `token` is any known unit surface form.
pub fn is_unit_token(token: &str) -> bool {
    lookup(&token.to_lowercase()).is_some()
}

/// Resolve the single unit for a whole message.
///
/// Walks the table once and returns the first unit with any surface form
/// occurring as a substring of the lowercased message, regardless of
/// position. Forms match inside words too: "eggs" contains "g", so
/// "2 dozen eggs" resolves to `Gram`. Every entity in the message gets
/// this unit.
pub fn detect_unit(message: &str) -> Unit {
    let lowered = message.to_lowercase();
    UNIT_TABLE
        .iter()
        .find(|(_, forms)| forms.iter().any(|form| lowered.contains(form)))
        .map(|(unit, _)| *unit)
        .unwrap_or_default()
}

fn lookup(lowered: &str) -> Option<Unit> {
    UNIT_TABLE
        .iter()
        .find(|(_, forms)| forms.contains(&lowered))
        .map(|(unit, _)| *unit)
}
