use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    types::{TimestampMs, WineId},
    wine::{Citation, WineAnalysis, WineNote},
};

/// Placeholder for a missing wine name.
pub const UNKNOWN_NAME: &str = "Unknown Wine";
/// Placeholder for a missing producer.
pub const UNKNOWN_WINERY: &str = "Unknown Winery";
/// Placeholder for a missing varietal.
pub const UNKNOWN_VARIETAL: &str = "Unknown Varietal";
/// Placeholder for a missing region.
pub const UNKNOWN_REGION: &str = "Unknown Region";
/// Non-vintage marker, also the placeholder for a missing vintage.
pub const NON_VINTAGE: &str = "N/V";
/// Placeholder for missing AI tasting notes.
pub const NO_TASTING_NOTES: &str = "No AI tasting notes yet";
/// Rating given to every new record until the user revises it.
pub const INITIAL_RATING: u8 = 5;

/// Which synthesis path produced a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteOrigin {
    /// Label photo identification; keeps the photo.
    Photo {
        /// Image as a data URL.
        image_url: String,
    },
    /// Free-text research; keeps the grounding citations.
    Search {
        /// Citations returned by the service.
        sources: Vec<Citation>,
    },
}

/// Builds a fully populated record from an AI analysis.
///
/// Every core text field falls back to a readable placeholder, the rating
/// starts at [`INITIAL_RATING`], and the id is generated fresh from
/// `created_at` plus randomness.
pub fn normalize(analysis: WineAnalysis, origin: NoteOrigin, created_at: TimestampMs) -> WineNote {
    let (image_url, search_sources) = match origin {
        NoteOrigin::Photo { image_url } => (Some(image_url), None),
        NoteOrigin::Search { sources } => (None, Some(sources)),
    };

    WineNote {
        id: new_wine_id(created_at),
        name: or_placeholder(analysis.name, UNKNOWN_NAME),
        winery: or_placeholder(analysis.winery, UNKNOWN_WINERY),
        varietal: or_placeholder(analysis.varietal, UNKNOWN_VARIETAL),
        region: or_placeholder(analysis.region, UNKNOWN_REGION),
        vintage: or_placeholder(analysis.vintage, NON_VINTAGE),
        tasting_notes: or_placeholder(analysis.summary, NO_TASTING_NOTES),
        user_notes: String::new(),
        rating: Some(INITIAL_RATING),
        style: analysis.style.unwrap_or_default(),
        characteristics: analysis
            .characteristics
            .map(|c| c.or_default())
            .unwrap_or_default(),
        image_url,
        created_at,
        search_sources,
    }
}

/// Generates `"<created_at>-<4 hex digits>"`.
pub fn new_wine_id(created_at: TimestampMs) -> WineId {
    format!("{created_at}-{:04x}", rand::random::<u16>())
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => placeholder.to_string(),
    }
}
