//! Display colors for board columns.
//!
//! Colors are opaque display tags (utility class names) that the view layer
//! applies to a column's background. New columns pick from the palette
//! round-robin so neighbouring columns stay distinguishable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed palette of column background tags, in assignment order.
///
/// The first four match the seeded columns.
pub const PALETTE: &[&str] = &[
    "bg-gray-100",
    "bg-blue-50",
    "bg-yellow-50",
    "bg-green-50",
    "bg-purple-50",
    "bg-pink-50",
    "bg-orange-50",
    "bg-teal-50",
];

/// Display tag attached to a column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnColor(String);

impl ColumnColor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Picks the palette entry for the `n`th column, wrapping around.
    pub fn round_robin(n: usize) -> Self {
        Self(PALETTE[n % PALETTE.len()].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
