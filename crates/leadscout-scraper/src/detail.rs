//! Contact-detail extraction from a place detail page.
//!
//! The detail page embeds its application state as a large nested JSON
//! array between the `APP_INITIALIZATION_STATE=` and `;window.APP_FLAGS`
//! markers. The shape is undocumented and purely positional, so the blob is
//! decoded into a generic [`serde_json::Value`] tree and navigated by
//! hard-coded, bounds-checked index paths; any mismatch degrades to an
//! absent field. A second, pattern-based tier recovers `tel:` and `mailto:`
//! values when the structured path yields nothing.

use regex::Regex;
use serde_json::Value;

const STATE_PREFIX: &str = "APP_INITIALIZATION_STATE=";
const STATE_SUFFIX: &str = ";window.APP_FLAGS";

/// Anti-XSSI prefix on the inner place payload.
const SAFETY_PREFIX: &str = ")]}'";

/// Path from the decoded state root to the inner place payload string.
const PLACE_BLOB_PATH: &[usize] = &[3, 6];

/// Index of the attribute-entry list within the decoded place payload.
const ATTRIBUTES_INDEX: usize = 6;

/// Contact fields recovered from one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

impl ContactDetails {
    /// Returns `true` when no field was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none() && self.website.is_none()
    }
}

/// Extracts phone, email, and website from a detail page. Never fails:
/// absent input, a missing marker, or a malformed blob all yield absent
/// fields.
#[must_use]
pub fn extract_contact_details(html: Option<&str>) -> ContactDetails {
    let mut details = ContactDetails::default();

    let Some(html) = html else {
        return details;
    };

    if let Some((phone, website)) = parse_state_blob(html) {
        details.phone = phone;
        details.website = website;
    }

    if details.phone.is_none() {
        details.phone = fallback_phone(html);
    }
    details.email = fallback_email(html);

    details
}

/// Structured tier: decode the state blob and walk the positional paths.
///
/// Returns `None` when any step of the navigation fails; the caller then
/// relies on the pattern fallbacks.
fn parse_state_blob(html: &str) -> Option<(Option<String>, Option<String>)> {
    let start = html.find(STATE_PREFIX)? + STATE_PREFIX.len();
    let end = start + html[start..].find(STATE_SUFFIX)?;

    let state: Value = serde_json::from_str(&html[start..end]).ok()?;
    let blob = value_at(&state, PLACE_BLOB_PATH)?.as_str()?;
    let payload = blob.strip_prefix(SAFETY_PREFIX)?;

    let place: Value = serde_json::from_str(payload).ok()?;
    let entries = value_at(&place, &[ATTRIBUTES_INDEX])?.as_array()?;

    let mut phone = None;
    let mut website = None;

    for entry in entries {
        let Some(entry) = entry.as_array() else {
            continue;
        };

        // Telephone entries carry a scheme-prefixed value at index 5 and a
        // human-readable form at index 0.
        if let Some(tel_meta) = entry
            .get(5)
            .and_then(Value::as_array)
            .and_then(|meta| meta.first())
            .and_then(Value::as_str)
            .filter(|meta| meta.starts_with("tel:"))
        {
            let pretty = entry
                .first()
                .and_then(Value::as_str)
                .unwrap_or_else(|| tel_meta.split_once(':').map_or(tel_meta, |(_, raw)| raw));
            phone = Some(strip_bidi_controls(pretty));
        }

        // Website entries carry a bare URL at index 0; self-referential map
        // links are not the business site.
        if website.is_none() {
            if let Some(candidate) = entry.first().and_then(Value::as_str) {
                let candidate = candidate.replace("&amp;", "&");
                if candidate.starts_with("http") {
                    let lowered = candidate.to_lowercase();
                    if !lowered.contains("google.com/maps")
                        && !lowered.starts_with("https://maps.app.goo.gl")
                    {
                        website = Some(candidate);
                    }
                }
            }
        }
    }

    Some((phone, website))
}

/// Bounds-checked navigation through a nested-array [`Value`] tree.
/// Any out-of-range index or non-array node yields `None`.
fn value_at<'a>(root: &'a Value, path: &[usize]) -> Option<&'a Value> {
    let mut current = root;
    for &index in path {
        current = current.as_array()?.get(index)?;
    }
    Some(current)
}

/// Removes the bidirectional-text control characters the provider wraps
/// around phone numbers.
fn strip_bidi_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{202a}' | '\u{202c}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Loose `tel:` scheme match anywhere in the page.
fn fallback_phone(html: &str) -> Option<String> {
    let re = Regex::new(r"tel:\+?[0-9][0-9\s().-]{6,}").expect("valid regex");
    let raw = re.find(html)?.as_str();
    let (_, number) = raw.split_once(':')?;
    Some(number.trim().to_string())
}

/// Loose `mailto:` scheme match anywhere in the page.
fn fallback_email(html: &str) -> Option<String> {
    let re = Regex::new(r"(?i)mailto:([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})")
        .expect("valid regex");
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}
