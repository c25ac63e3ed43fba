use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical unit a quantity is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Kg,
    Gram,
    Liter,
    Ml,
    #[default]
    Piece,
    Dozen,
    Packet,
}

impl Unit {
    /// Wire name (`"kg"`, `"gram"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Gram => "gram",
            Unit::Liter => "liter",
            Unit::Ml => "ml",
            Unit::Piece => "piece",
            Unit::Dozen => "dozen",
            Unit::Packet => "packet",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantity used when a message names a product without a number.
pub const DEFAULT_QUANTITY: f64 = 1.0;

/// A product mention extracted from a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Product name as written by the user (or returned by the model).
    pub product: String,
    /// Always finite and non-negative.
    pub quantity: f64,
    pub unit: Unit,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
}

impl Entity {
    /// Build an entity, repairing out-of-range values instead of failing.
    ///
    /// A missing, negative or non-finite quantity becomes [`DEFAULT_QUANTITY`];
    /// confidence is clamped into `[0, 1]` (NaN becomes 0).
    pub fn new(
        product: impl Into<String>,
        quantity: Option<f64>,
        unit: Unit,
        confidence: f64,
    ) -> Self {
        let quantity = quantity
            .filter(|q| q.is_finite() && *q >= 0.0)
            .unwrap_or(DEFAULT_QUANTITY);
        Self {
            product: product.into(),
            quantity,
            unit,
            confidence: clamp_confidence(confidence),
        }
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
