//! Field canonicalization shared by extraction and dedup.

/// Default similarity threshold for general-purpose text comparison.
/// Dedup uses the stricter [`crate::dedupe::NAME_SIMILARITY_THRESHOLD`].
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Normalizes a phone number to bare digits.
///
/// Returns `None` when the input is absent or has fewer than 10 digits
/// after stripping everything else; such values are too short to key on.
#[must_use]
pub fn normalize_phone(phone: Option<&str>) -> Option<String> {
    let digits: String = phone?.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return None;
    }
    Some(digits)
}

/// Normalizes a business name for comparison: lowercase, trimmed, internal
/// whitespace collapsed to single spaces. Absent input yields `""`.
#[must_use]
pub fn normalize_business_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return String::new();
    };
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Ensures a URL carries a scheme, defaulting to `https://`.
#[must_use]
pub fn normalize_url(url: Option<&str>) -> Option<String> {
    let url = url?.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        Some(format!("https://{url}"))
    }
}

/// Collapses whitespace and strips zero-width characters. Returns `None`
/// when nothing printable remains.
#[must_use]
pub fn clean_text(text: Option<&str>) -> Option<String> {
    let cleaned: String = text?
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !matches!(c, '\u{200b}'..='\u{200d}' | '\u{feff}'))
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Checks whether two strings are similar at the default 0.85 threshold.
#[must_use]
pub fn are_similar(text1: &str, text2: &str) -> bool {
    are_similar_with_threshold(text1, text2, DEFAULT_SIMILARITY_THRESHOLD)
}

/// Checks whether two strings are similar under a Levenshtein ratio.
///
/// Both inputs are lowercased and trimmed first. Empty input on either
/// side is never similar; exact matches short-circuit the edit-distance
/// computation.
#[must_use]
pub fn are_similar_with_threshold(text1: &str, text2: &str, threshold: f64) -> bool {
    let text1 = text1.trim().to_lowercase();
    let text2 = text2.trim().to_lowercase();

    if text1.is_empty() || text2.is_empty() {
        return false;
    }
    if text1 == text2 {
        return true;
    }

    strsim::normalized_levenshtein(&text1, &text2) >= threshold
}
