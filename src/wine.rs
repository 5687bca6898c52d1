//! Wine domain records, AI analysis payload, citations, and patches.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{TimestampMs, WineId, WineStyle};

/// Lowest value on every sensory scale.
pub const SCALE_MIN: u8 = 1;
/// Highest value on every sensory scale.
pub const SCALE_MAX: u8 = 5;

/// Four-axis sensory profile, each axis on a 1..=5 scale.
///
/// Stored profiles are read leniently: missing axes take the default and
/// out-of-range or fractional values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredCharacteristics")]
pub struct WineCharacteristics {
    /// Weight on the palate.
    pub body: u8,
    /// Perceived acidity.
    pub acidity: u8,
    /// Tannic grip.
    pub tannin: u8,
    /// Residual sweetness.
    pub sweetness: u8,
}

impl Default for WineCharacteristics {
    fn default() -> Self {
        Self {
            body: 3,
            acidity: 3,
            tannin: 3,
            sweetness: 1,
        }
    }
}

impl WineCharacteristics {
    /// Returns a copy with every axis forced into the 1..=5 scale.
    pub fn clamped(self) -> Self {
        Self {
            body: clamp_scale(self.body),
            acidity: clamp_scale(self.acidity),
            tannin: clamp_scale(self.tannin),
            sweetness: clamp_scale(self.sweetness),
        }
    }
}

/// Forces `v` into the 1..=5 scale.
pub fn clamp_scale(v: u8) -> u8 {
    v.clamp(SCALE_MIN, SCALE_MAX)
}

/// Reads a JSON number or numeric string as a whole number, rounding
/// fractions. Anything else is `None`.
pub fn scale_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

fn clamped_scale(value: &Value) -> Option<u8> {
    scale_number(value)
        .map(|v| v.clamp(i64::from(SCALE_MIN), i64::from(SCALE_MAX)))
        .and_then(|v| u8::try_from(v).ok())
}

fn lenient_scale<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(clamped_scale(&Value::deserialize(deserializer)?))
}

#[derive(Deserialize)]
struct StoredCharacteristics {
    #[serde(default, deserialize_with = "lenient_scale")]
    body: Option<u8>,
    #[serde(default, deserialize_with = "lenient_scale")]
    acidity: Option<u8>,
    #[serde(default, deserialize_with = "lenient_scale")]
    tannin: Option<u8>,
    #[serde(default, deserialize_with = "lenient_scale")]
    sweetness: Option<u8>,
}

impl From<StoredCharacteristics> for WineCharacteristics {
    fn from(c: StoredCharacteristics) -> Self {
        PartialCharacteristics {
            body: c.body,
            acidity: c.acidity,
            tannin: c.tannin,
            sweetness: c.sweetness,
        }
        .or_default()
    }
}

/// Partially populated characteristics as reported by the AI service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartialCharacteristics {
    /// Reported body, if any.
    pub body: Option<u8>,
    /// Reported acidity, if any.
    pub acidity: Option<u8>,
    /// Reported tannin, if any.
    pub tannin: Option<u8>,
    /// Reported sweetness, if any.
    pub sweetness: Option<u8>,
}

impl PartialCharacteristics {
    /// Fills every missing axis from the neutral default profile.
    pub fn or_default(self) -> WineCharacteristics {
        let d = WineCharacteristics::default();
        WineCharacteristics {
            body: self.body.unwrap_or(d.body),
            acidity: self.acidity.unwrap_or(d.acidity),
            tannin: self.tannin.unwrap_or(d.tannin),
            sweetness: self.sweetness.unwrap_or(d.sweetness),
        }
        .clamped()
    }
}

/// Validated but possibly incomplete AI identification result.
///
/// Produced once per synthesis request and consumed by
/// [`crate::core::normalize::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WineAnalysis {
    /// Wine name.
    pub name: Option<String>,
    /// Producer.
    pub winery: Option<String>,
    /// Grape variety or blend.
    pub varietal: Option<String>,
    /// Appellation or region.
    pub region: Option<String>,
    /// Vintage year, or `N/V`.
    pub vintage: Option<String>,
    /// Style bucket.
    pub style: Option<WineStyle>,
    /// AI tasting summary.
    pub summary: Option<String>,
    /// Sensory profile; `None` when the service sent none at all.
    pub characteristics: Option<PartialCharacteristics>,
}

/// Source reference used by the AI service to ground a research answer.
///
/// A stored citation without a title reads back titled by its URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredCitation")]
pub struct Citation {
    /// Display title.
    pub title: String,
    /// Source URI.
    pub uri: String,
}

#[derive(Deserialize)]
struct StoredCitation {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uri: String,
}

impl From<StoredCitation> for Citation {
    fn from(c: StoredCitation) -> Self {
        let title = c
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| c.uri.clone());
        Citation { title, uri: c.uri }
    }
}

/// Persisted tasting entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineNote {
    /// Stable record identifier.
    pub id: WineId,
    /// Wine name.
    pub name: String,
    /// Producer.
    pub winery: String,
    /// Grape variety or blend.
    pub varietal: String,
    /// Appellation or region.
    pub region: String,
    /// Vintage year, or `N/V`.
    pub vintage: String,
    /// AI-authored tasting notes.
    pub tasting_notes: String,
    /// User-authored notes.
    #[serde(default)]
    pub user_notes: String,
    /// Personal rating on a 1..=5 scale.
    #[serde(default, deserialize_with = "lenient_scale")]
    pub rating: Option<u8>,
    /// Style bucket.
    #[serde(default, deserialize_with = "lenient_style")]
    pub style: WineStyle,
    /// Sensory profile.
    #[serde(default)]
    pub characteristics: WineCharacteristics,
    /// Label photo as a data URL, for photo-derived records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creation time in milliseconds since epoch.
    pub created_at: TimestampMs,
    /// Search citations, for research-derived records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_sources: Option<Vec<Citation>>,
}

// Older journals stored whatever style string the service returned.
fn lenient_style<'de, D>(deserializer: D) -> Result<WineStyle, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

/// Sparse edit where each `Some` field overwrites the record value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WinePatch {
    /// Optional replacement name.
    pub name: Option<String>,
    /// Optional replacement winery.
    pub winery: Option<String>,
    /// Optional replacement varietal.
    pub varietal: Option<String>,
    /// Optional replacement region.
    pub region: Option<String>,
    /// Optional replacement vintage.
    pub vintage: Option<String>,
    /// Optional replacement style.
    pub style: Option<WineStyle>,
    /// Optional replacement user notes.
    pub user_notes: Option<String>,
    /// Optional replacement rating.
    pub rating: Option<u8>,
    /// Optional replacement body.
    pub body: Option<u8>,
    /// Optional replacement acidity.
    pub acidity: Option<u8>,
    /// Optional replacement tannin.
    pub tannin: Option<u8>,
    /// Optional replacement sweetness.
    pub sweetness: Option<u8>,
}

impl WinePatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch in place to `rec`. Scale values are clamped.
    pub fn apply_to(&self, rec: &mut WineNote) {
        if let Some(v) = &self.name {
            rec.name = v.clone();
        }
        if let Some(v) = &self.winery {
            rec.winery = v.clone();
        }
        if let Some(v) = &self.varietal {
            rec.varietal = v.clone();
        }
        if let Some(v) = &self.region {
            rec.region = v.clone();
        }
        if let Some(v) = &self.vintage {
            rec.vintage = v.clone();
        }
        if let Some(v) = self.style {
            rec.style = v;
        }
        if let Some(v) = &self.user_notes {
            rec.user_notes = v.clone();
        }
        if let Some(v) = self.rating {
            rec.rating = Some(clamp_scale(v));
        }
        if let Some(v) = self.body {
            rec.characteristics.body = clamp_scale(v);
        }
        if let Some(v) = self.acidity {
            rec.characteristics.acidity = clamp_scale(v);
        }
        if let Some(v) = self.tannin {
            rec.characteristics.tannin = clamp_scale(v);
        }
        if let Some(v) = self.sweetness {
            rec.characteristics.sweetness = clamp_scale(v);
        }
    }

    /// Returns a patched copy of `rec`.
    pub fn applied(&self, rec: &WineNote) -> WineNote {
        let mut out = rec.clone();
        self.apply_to(&mut out);
        out
    }
}
