//! Shared primitive IDs and journal-related enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Record identifier: creation timestamp plus a random suffix.
pub type WineId = String;
/// Milliseconds since the Unix epoch.
pub type TimestampMs = u64;

/// Wine style bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WineStyle {
    /// Red wine.
    #[default]
    Red,
    /// White wine.
    White,
    /// Rosé wine.
    #[serde(rename = "Rosé", alias = "Rose")]
    Rose,
    /// Sparkling wine.
    Sparkling,
    /// Dessert or otherwise sweet wine.
    Sweet,
    /// Fortified wine (port, sherry, madeira).
    Fortified,
}

impl WineStyle {
    /// All styles, in display order.
    pub const ALL: [WineStyle; 6] = [
        WineStyle::Red,
        WineStyle::White,
        WineStyle::Rose,
        WineStyle::Sparkling,
        WineStyle::Sweet,
        WineStyle::Fortified,
    ];

    /// Display label, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            WineStyle::Red => "Red",
            WineStyle::White => "White",
            WineStyle::Rose => "Rosé",
            WineStyle::Sparkling => "Sparkling",
            WineStyle::Sweet => "Sweet",
            WineStyle::Fortified => "Fortified",
        }
    }
}

impl fmt::Display for WineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a style string outside the six known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown wine style: {0}")]
pub struct UnknownStyle(pub String);

impl FromStr for WineStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let style = match lower.as_str() {
            "red" => WineStyle::Red,
            "white" => WineStyle::White,
            "rosé" | "rose" => WineStyle::Rose,
            "sparkling" => WineStyle::Sparkling,
            "sweet" | "dessert" => WineStyle::Sweet,
            "fortified" => WineStyle::Fortified,
            _ => return Err(UnknownStyle(s.to_string())),
        };
        Ok(style)
    }
}

/// Ordering criterion for [`crate::core::store::WineStore::sorted_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortBy {
    /// Newest first by creation time.
    #[default]
    Recency,
    /// Highest rating first; unrated records count as 0.
    Rating,
    /// Most recent vintage year first; non-vintage last.
    Vintage,
    /// Region name, A to Z.
    Region,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" | "recency" | "date" | "date_added" => Ok(SortBy::Recency),
            "rating" => Ok(SortBy::Rating),
            "vintage" => Ok(SortBy::Vintage),
            "region" => Ok(SortBy::Region),
            other => Err(format!("unknown sort criterion: {other}")),
        }
    }
}
