//! Deduplication and merge of business leads across pages and providers.
//!
//! Exact matching runs on a `name|city|phone` key; when the phone is absent
//! or too short to normalize, the key degrades to `name|city`. Records that
//! miss the exact key fall through to a fuzzy name comparison, but only
//! against records carrying the identical raw `city` string. The fuzzy scan
//! is O(n) per record; the exact-key seen set short-circuits the common
//! case, and n is bounded by the requested lead limit.

use std::collections::HashSet;

use leadscout_core::Business;

use crate::normalize::{are_similar_with_threshold, normalize_business_name, normalize_phone};

/// Similarity threshold for the fuzzy name check. Stricter than the
/// general-purpose default in [`crate::normalize`].
pub const NAME_SIMILARITY_THRESHOLD: f64 = 0.90;

/// Builds the exact dedup key for a record.
#[must_use]
pub fn generate_business_key(business: &Business) -> String {
    let name = normalize_business_name(Some(&business.name));
    let city = business.city.to_lowercase().trim().to_string();
    match normalize_phone(business.phone.as_deref()) {
        Some(phone) => format!("{name}|{city}|{phone}"),
        None => format!("{name}|{city}"),
    }
}

/// Checks a record against all accepted records so far: exact key first,
/// then fuzzy name within the same raw `city` value.
fn is_duplicate(business: &Business, existing: &[Business]) -> bool {
    let business_key = generate_business_key(business);
    let business_name = normalize_business_name(Some(&business.name));

    for other in existing {
        if business_key == generate_business_key(other) {
            return true;
        }

        // The city gate is an exact string comparison, not a normalized
        // one: differently-capitalized city strings bypass the fuzzy check.
        if business.city == other.city
            && are_similar_with_threshold(
                &business_name,
                &normalize_business_name(Some(&other.name)),
                NAME_SIMILARITY_THRESHOLD,
            )
        {
            return true;
        }
    }

    false
}

/// Collapses near-duplicate records, preserving first-seen order.
///
/// Idempotent: running it on its own output returns the same list.
#[must_use]
pub fn deduplicate_businesses(businesses: Vec<Business>) -> Vec<Business> {
    let mut unique: Vec<Business> = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();

    for business in businesses {
        let key = generate_business_key(&business);
        if seen_keys.contains(&key) {
            continue;
        }
        if !is_duplicate(&business, &unique) {
            unique.push(business);
            seen_keys.insert(key);
        }
    }

    unique
}

/// Merges two records believed to represent the same entity: per field,
/// prefer the non-empty value; when both are present, prefer the one with
/// the longer string representation as a crude completeness heuristic.
#[must_use]
pub fn merge_businesses(a: &Business, b: &Business) -> Business {
    Business {
        name: pick_required(&a.name, &b.name),
        category: pick_opt(a.category.as_deref(), b.category.as_deref()),
        phone: pick_opt(a.phone.as_deref(), b.phone.as_deref()),
        email: pick_opt(a.email.as_deref(), b.email.as_deref()),
        website: pick_opt(a.website.as_deref(), b.website.as_deref()),
        rating: pick_numeric(a.rating, b.rating),
        reviews_count: pick_numeric(a.reviews_count, b.reviews_count),
        address: pick_opt(a.address.as_deref(), b.address.as_deref()),
        city: pick_required(&a.city, &b.city),
        country: pick_opt(a.country.as_deref(), b.country.as_deref()),
        lat: pick_numeric(a.lat, b.lat),
        lon: pick_numeric(a.lon, b.lon),
        source: pick_required(&a.source, &b.source),
        scraped_at: a.scraped_at,
        distance: pick_opt(a.distance.as_deref(), b.distance.as_deref()),
        status: pick_opt(a.status.as_deref(), b.status.as_deref()),
        review_snippet: pick_opt(a.review_snippet.as_deref(), b.review_snippet.as_deref()),
        google_cid: pick_opt(a.google_cid.as_deref(), b.google_cid.as_deref()),
        google_maps_url: pick_opt(a.google_maps_url.as_deref(), b.google_maps_url.as_deref()),
    }
}

fn pick_opt(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let a = a.filter(|v| !v.is_empty());
    let b = b.filter(|v| !v.is_empty());
    match (a, b) {
        (Some(a), Some(b)) => Some(if a.len() >= b.len() { a } else { b }.to_string()),
        (Some(a), None) => Some(a.to_string()),
        (None, b) => b.map(str::to_string),
    }
}

fn pick_required(a: &str, b: &str) -> String {
    pick_opt(Some(a), Some(b)).unwrap_or_default()
}

fn pick_numeric<T: ToString + Copy>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a.to_string().len() >= b.to_string().len() {
            a
        } else {
            b
        }),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}
