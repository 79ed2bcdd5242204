pub mod client;
pub mod dedupe;
pub mod detail;
pub mod enrich;
pub mod error;
pub mod normalize;
pub mod parse;
pub mod search;

pub use client::{DecodoClient, ResultEntry, ScrapeApi, ScrapeResponse};
pub use dedupe::{deduplicate_businesses, generate_business_key, merge_businesses};
pub use detail::ContactDetails;
pub use enrich::DetailCache;
pub use error::ScraperError;
pub use search::{GoogleMapsProvider, SearchOptions};
