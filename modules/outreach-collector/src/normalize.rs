//! Raw dataset items → [`BusinessRecord`]s.

use std::collections::HashSet;

use apify_client::GoogleMapsPlace;
use outreach_common::{
    clean_phone, is_usable_phone, BusinessRecord, DEFAULT_CATEGORY, NOT_AVAILABLE, NO_WEBSITE,
    UNKNOWN_ADDRESS, UNKNOWN_BUSINESS,
};
use serde_json::Value;

/// Normalize one scraped place. `None` if it has no usable phone.
pub fn normalize(place: &GoogleMapsPlace) -> Option<BusinessRecord> {
    let phone = clean_phone(&text(&place.phone)?);
    if !is_usable_phone(&phone) {
        return None;
    }

    Some(BusinessRecord {
        name: first_text(&[&place.title, &place.name]).unwrap_or_else(|| UNKNOWN_BUSINESS.to_string()),
        phone,
        address: first_text(&[&place.address, &place.location])
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
        category: first_text(&[&place.category, &place.category_name, &place.place_type])
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        rating: first_text(&[&place.rating, &place.total_score])
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        reviews: first_text(&[&place.reviews, &place.reviews_count])
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        website: text(&place.website).unwrap_or_else(|| NO_WEBSITE.to_string()),
        email: text(&place.email),
        hours: place.opening_hours.as_ref().and_then(hours_text),
        description: text(&place.description),
    })
}

/// Keep the first record per phone, in order of appearance.
pub fn dedupe_by_phone(records: Vec<BusinessRecord>) -> Vec<BusinessRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.phone.clone()))
        .collect()
}

/// Strings (non-blank) and numbers count as text; other shapes do not.
fn text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(candidates: &[&Option<Value>]) -> Option<String> {
    candidates.iter().find_map(|v| text(v))
}

/// Opening hours arrive either as a string or as `[{day, hours}, ...]`.
fn hours_text(value: &Value) -> Option<String> {
    let rendered = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(days) => days
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.clone()),
                Value::Object(map) => {
                    let day = map.get("day").and_then(Value::as_str)?;
                    let hours = map.get("hours").and_then(Value::as_str).unwrap_or(NOT_AVAILABLE);
                    Some(format!("{day}: {hours}"))
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    };
    Some(rendered).filter(|s| !s.is_empty())
}
