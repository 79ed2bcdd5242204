use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical column order for flat (CSV-style) serialization of a
/// [`Business`]. Export writers consume this verbatim.
pub const CSV_COLUMNS: &[&str] = &[
    "name",
    "category",
    "phone",
    "website",
    "rating",
    "reviews_count",
    "address",
    "city",
    "country",
    "lat",
    "lon",
    "source",
    "scraped_at",
];

/// Extended column set including contact and provider-identifier fields.
pub const CSV_COLUMNS_EXTENDED: &[&str] = &[
    "name",
    "category",
    "phone",
    "website",
    "rating",
    "reviews_count",
    "address",
    "city",
    "country",
    "lat",
    "lon",
    "source",
    "scraped_at",
    "email",
    "google_cid",
    "google_maps_url",
];

/// A business lead extracted from one provider listing.
///
/// Produced by listing extraction, optionally filled in by enrichment, and
/// collapsed with near-duplicates by the dedup engine. `name` is always
/// non-empty for a record that survived extraction; everything else is
/// best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    pub category: Option<String>,
    /// Contact phone, populated by enrichment.
    pub phone: Option<String>,
    /// Contact email, populated by enrichment.
    pub email: Option<String>,
    /// Business website. Extraction stores a provisional maps deep link here;
    /// enrichment overwrites it with the real site when one is found.
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<u32>,
    pub address: Option<String>,
    /// City from the search context, not from the markup.
    pub city: String,
    pub country: Option<String>,
    /// Reserved; this provider's listing markup does not carry coordinates.
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Provider label, e.g. `"Google Maps"`.
    pub source: String,
    /// Capture time, set once at extraction and never mutated.
    pub scraped_at: DateTime<Utc>,
    /// Distance string from the listing, e.g. `"2.5 km"`.
    pub distance: Option<String>,
    /// Open/closed/hours line from the listing.
    pub status: Option<String>,
    /// Quoted review excerpt from the listing.
    pub review_snippet: Option<String>,
    /// Stable map-entity id, used for enrichment caching and exact dedup.
    pub google_cid: Option<String>,
    /// Deep link built from the cid.
    pub google_maps_url: Option<String>,
}

impl Business {
    /// Creates a record with `name`, `city`, and `source` set and every
    /// optional field absent. `scraped_at` is stamped at creation.
    #[must_use]
    pub fn new(name: impl Into<String>, city: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            phone: None,
            email: None,
            website: None,
            rating: None,
            reviews_count: None,
            address: None,
            city: city.into(),
            country: None,
            lat: None,
            lon: None,
            source: source.into(),
            scraped_at: Utc::now(),
            distance: None,
            status: None,
            review_snippet: None,
            google_cid: None,
            google_maps_url: None,
        }
    }

    /// Returns `true` if enrichment has populated at least one contact field.
    #[must_use]
    pub fn has_contact_details(&self) -> bool {
        self.phone.is_some() || self.email.is_some() || self.website.is_some()
    }
}
