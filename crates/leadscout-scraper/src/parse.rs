//! Listing extractor for local-search result markup.
//!
//! A result page is a series of listing blocks (`div.VkpGBb`), each with a
//! detail section (`div.rllt__details`) whose first text line is the
//! business name. The remaining lines are free-form and classified by
//! pattern: a rating line, a quoted review snippet, a middle-dot separated
//! distance/address line, an open/closed status line, or a bare address.
//! Blocks that do not fit yield partial records rather than errors; blocks
//! without a usable name are dropped silently.

use std::collections::HashSet;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use leadscout_core::Business;

/// Provider label stamped on every extracted record.
pub const SOURCE_GOOGLE_MAPS: &str = "Google Maps";

/// Status tokens recognized across the locales this layout family serves.
const STATUS_TOKENS: &[&str] = &[
    "open", "closed", "closes", "opens", "hours", "aberto", "fechado",
];

/// Distance unit tokens marking the first segment of a middle-dot line as a
/// distance rather than part of the address.
const DISTANCE_UNITS: &[&str] = &["km", "m", "mi", "ft"];

/// Identity of one listing within a search run.
///
/// The cid is the provider's stable key; listings without one fall back to
/// the lowercased name plus address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    Cid(String),
    NameAddress(String, String),
}

impl ListingKey {
    /// Builds the run-scoped identity for an extracted record.
    #[must_use]
    pub fn for_business(business: &Business) -> Self {
        match &business.google_cid {
            Some(cid) => ListingKey::Cid(cid.clone()),
            None => ListingKey::NameAddress(
                business.name.to_lowercase(),
                business.address.clone().unwrap_or_default(),
            ),
        }
    }
}

/// Extracts up to `remaining` businesses from one page of listing markup.
///
/// `seen` is scoped to the whole search run: records whose [`ListingKey`]
/// is already present are dropped silently, and every returned record's key
/// is added to it.
#[must_use]
pub fn parse_results_html(
    html: &str,
    city: &str,
    remaining: usize,
    seen: &mut HashSet<ListingKey>,
) -> Vec<Business> {
    if remaining == 0 {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let block_selector = Selector::parse("div.VkpGBb").expect("valid selector");

    let mut listings = Vec::new();
    for block in document.select(&block_selector) {
        if let Some(business) = parse_listing_block(block, city) {
            let key = ListingKey::for_business(&business);
            if seen.contains(&key) {
                continue;
            }
            seen.insert(key);
            listings.push(business);
        }
        if listings.len() >= remaining {
            break;
        }
    }
    listings
}

/// Converts one listing block into a business record.
///
/// Returns `None` when the block has no detail section (ad or malformed
/// block) or no name line; any other missing piece just leaves the
/// corresponding field absent.
fn parse_listing_block(block: ElementRef<'_>, city: &str) -> Option<Business> {
    let details_selector = Selector::parse("div.rllt__details").expect("valid selector");
    let div_selector = Selector::parse("div").expect("valid selector");

    let details = block.select(&details_selector).next()?;
    let lines: Vec<String> = details.select(&div_selector).map(element_text).collect();

    let name = lines.first().filter(|name| !name.is_empty())?.clone();

    let mut business = Business::new(name, city, SOURCE_GOOGLE_MAPS);

    if let Some(rating_line) = lines.get(1) {
        let (rating, reviews_count, category) = parse_rating_line(rating_line);
        business.rating = rating;
        business.reviews_count = reviews_count;
        business.category = category;
    }

    for line in lines.iter().skip(2) {
        classify_line(line, &mut business);
    }

    let link_selector = Selector::parse("a[data-cid]").expect("valid selector");
    if let Some(cid) = block
        .select(&link_selector)
        .next()
        .and_then(|a| a.value().attr("data-cid"))
    {
        business.google_maps_url = Some(format!("https://www.google.com/maps?cid={cid}"));
        // Provisional; enrichment overwrites this with the real site.
        business.website = business.google_maps_url.clone();
        business.google_cid = Some(cid.to_string());
    }

    Some(business)
}

/// Parses the rating line: first decimal number is the rating, a
/// parenthesized group holds the review count, and anything after the last
/// middle dot is the category.
fn parse_rating_line(line: &str) -> (Option<f64>, Option<u32>, Option<String>) {
    let rating_re = Regex::new(r"([0-9]+(?:[.,][0-9]+)?)").expect("valid regex");
    let rating = rating_re
        .captures(line)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok());

    let reviews_re = Regex::new(r"\(([^)]+)\)").expect("valid regex");
    let reviews_count = reviews_re
        .captures(line)
        .and_then(|cap| cap.get(1))
        .and_then(|m| {
            let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
            digits.parse::<u32>().ok()
        });

    let category = if line.contains('·') {
        line.rsplit('·')
            .next()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    } else {
        None
    };

    (rating, reviews_count, category)
}

/// Classifies one free-form listing line into the record.
fn classify_line(line: &str, business: &mut Business) {
    if line.is_empty() {
        return;
    }

    if line.starts_with('"') && business.review_snippet.is_none() {
        business.review_snippet = Some(line.trim_matches('"').to_string());
        return;
    }

    let lowered = line.to_lowercase();

    if line.contains('·') && business.address.is_none() {
        let parts: Vec<&str> = line
            .split('·')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if let Some(&first) = parts.first() {
            if DISTANCE_UNITS.iter().any(|unit| first.contains(unit)) {
                business.distance = Some(first.to_string());
                if parts.len() > 1 {
                    business.address = Some(parts[1..].join(" · "));
                    return;
                }
            }
            business.address = Some(parts.join(" · "));
        }
        return;
    }

    let has_status_token = STATUS_TOKENS.iter().any(|token| lowered.contains(token));

    if business.address.is_none() && !has_status_token {
        business.address = Some(line.to_string());
        return;
    }

    if has_status_token {
        business.status = Some(line.to_string());
    }
}

/// Joins an element's text nodes with single spaces, stripping each piece.
/// Nested markup inside a line therefore reads as one space-separated string.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
