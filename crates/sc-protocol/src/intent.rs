use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the shopper wants to do, as understood from one message.
///
/// Closed set. Input that matches nothing resolves to [`Intent::Help`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AddToCart,
    ViewCart,
    Checkout,
    TrackOrder,
    SearchProduct,
    #[default]
    Help,
    Greeting,
    RemoveFromCart,
}

/// Error returned when a string does not name a known intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown intent: {0}")]
pub struct UnknownIntent(pub String);

impl Intent {
    /// Every intent, in trigger-table order.
    pub const ALL: [Intent; 8] = [
        Intent::AddToCart,
        Intent::ViewCart,
        Intent::Checkout,
        Intent::TrackOrder,
        Intent::SearchProduct,
        Intent::Help,
        Intent::Greeting,
        Intent::RemoveFromCart,
    ];

    /// Wire name (`"add_to_cart"`, `"view_cart"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::AddToCart => "add_to_cart",
            Intent::ViewCart => "view_cart",
            Intent::Checkout => "checkout",
            Intent::TrackOrder => "track_order",
            Intent::SearchProduct => "search_product",
            Intent::Help => "help",
            Intent::Greeting => "greeting",
            Intent::RemoveFromCart => "remove_from_cart",
        }
    }

    /// Whether the downstream ordering system has to act on this intent.
    pub fn requires_action(self) -> bool {
        matches!(
            self,
            Intent::AddToCart | Intent::Checkout | Intent::TrackOrder
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = UnknownIntent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownIntent(s.to_string()))
    }
}
