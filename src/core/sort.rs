use std::cmp::Ordering;

use crate::{types::SortBy, wine::WineNote};

/// Comparator behind each [`SortBy`] criterion.
pub fn compare(by: SortBy, a: &WineNote, b: &WineNote) -> Ordering {
    match by {
        SortBy::Recency => b.created_at.cmp(&a.created_at),
        SortBy::Rating => b.rating.unwrap_or(0).cmp(&a.rating.unwrap_or(0)),
        SortBy::Vintage => compare_vintage(&a.vintage, &b.vintage),
        SortBy::Region => folded(&a.region)
            .cmp(folded(&b.region))
            .then_with(|| a.region.cmp(&b.region)),
    }
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// Numeric year when the vintage is all digits (`"2018"`), else `None`.
///
/// Digit strings too long for a `u64` are treated as non-vintage.
pub fn vintage_year(vintage: &str) -> Option<u64> {
    let v = vintage.trim();
    if v.is_empty() || !v.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    v.parse().ok()
}

// Years descending, then non-vintage entries by descending string order.
fn compare_vintage(a: &str, b: &str) -> Ordering {
    match (vintage_year(a), vintage_year(b)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    }
}
