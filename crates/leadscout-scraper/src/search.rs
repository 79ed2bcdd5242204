//! Search orchestration: the fetch/extract/enrich/decide loop.
//!
//! One search run is sequential page-by-page (extraction needs the fetched
//! markup, and enrichment dominates latency anyway); enrichment within a
//! page fans out through an order-preserving bounded stream. The loop stops
//! when the provider returns no result entries, when a whole page yields
//! zero new records, or when the requested limit is reached, so a stalled
//! or echoing source can never spin it forever.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::stream::{self, StreamExt};

use leadscout_core::{domain_for, geo_string, locale_for, Business};

use crate::client::ScrapeApi;
use crate::enrich::{enrich_business, DetailCache};
use crate::error::ScraperError;
use crate::parse::{parse_results_html, ListingKey};

/// Worker limit for concurrent detail fetches within one page.
const MAX_CONCURRENT_ENRICHMENTS: usize = 4;

/// Observer invoked after each page with `(collected, requested_limit)`.
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// Parameters of one search run.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Search keyword, e.g. `"dentist"`.
    pub query: String,
    /// Target city; also stamped onto every extracted record.
    pub city: String,
    /// Maximum number of leads to collect.
    pub limit: usize,
    /// Optional ISO-2 code or country name for geo-targeting.
    pub country: Option<String>,
    /// Whether to fetch detail pages for contact fields.
    pub enrich: bool,
}

impl SearchOptions {
    #[must_use]
    pub fn new(query: impl Into<String>, city: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            city: city.into(),
            limit,
            country: None,
            enrich: true,
        }
    }

    #[must_use]
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn without_enrichment(mut self) -> Self {
        self.enrich = false;
        self
    }
}

/// Lead search against the Google Maps listing layout family.
pub struct GoogleMapsProvider<A> {
    api: A,
}

impl<A: ScrapeApi> GoogleMapsProvider<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Runs a search to completion and returns the collected leads in
    /// extraction order. Dedup across providers is a separate step
    /// ([`crate::dedupe::deduplicate_businesses`]).
    ///
    /// # Errors
    ///
    /// [`ScraperError::AuthRejected`] always propagates. Any other fetch
    /// error propagates only while nothing has been collected; once records
    /// exist the run ends early and returns them as a partial result.
    pub async fn search(&self, options: &SearchOptions) -> Result<Vec<Business>, ScraperError> {
        self.search_with_observer(options, None, None).await
    }

    /// [`Self::search`] with an optional progress observer, called after
    /// each page, and an optional cancellation flag, checked between pages
    /// and before each detail fetch. A cancelled run returns the records
    /// accumulated so far.
    pub async fn search_with_observer(
        &self,
        options: &SearchOptions,
        progress: Option<&ProgressFn>,
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<Business>, ScraperError> {
        if options.limit == 0 {
            return Ok(Vec::new());
        }

        let country = options.country.as_deref();
        let geo = geo_string(&options.city, country);
        let locale = locale_for(country);
        let domain = domain_for(country);
        let query = format!("{} {}", options.query, options.city);

        tracing::debug!(%query, %geo, locale, domain, limit = options.limit, "starting search run");

        let mut businesses: Vec<Business> = Vec::new();
        let mut seen: HashSet<ListingKey> = HashSet::new();
        let cache = DetailCache::new();
        let mut page = 1u32;

        while businesses.len() < options.limit {
            if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                tracing::debug!(page, collected = businesses.len(), "search run cancelled");
                break;
            }

            let response = match self
                .api
                .fetch_listing_page(&query, &geo, page, options.limit, locale, domain)
                .await
            {
                Ok(response) => response,
                Err(err) if err.is_auth_error() || businesses.is_empty() => return Err(err),
                Err(err) => {
                    tracing::warn!(page, error = %err, "listing fetch failed, returning partial results");
                    break;
                }
            };

            if response.results.is_empty() {
                break;
            }

            let mut page_count = 0usize;
            for entry in &response.results {
                let Some(html) = entry.content.as_deref().filter(|c| !c.is_empty()) else {
                    continue;
                };
                let remaining = options.limit - businesses.len();
                if remaining == 0 {
                    break;
                }

                let mut parsed = parse_results_html(html, &options.city, remaining, &mut seen);
                if options.enrich {
                    parsed = self.enrich_page(parsed, domain, locale, &cache, cancel).await;
                }

                page_count += parsed.len();
                businesses.extend(parsed);
            }

            if let Some(progress) = progress {
                progress(businesses.len(), options.limit);
            }

            // A page that produced nothing new means the source is echoing
            // stale results; stop rather than loop on it.
            if page_count == 0 {
                break;
            }
            page += 1;
        }

        tracing::debug!(collected = businesses.len(), pages = page, "search run finished");
        Ok(businesses)
    }

    /// Enriches one page's records through a bounded, order-preserving
    /// concurrent stream. Once the cancel flag is set, remaining records
    /// pass through without a detail fetch.
    async fn enrich_page(
        &self,
        parsed: Vec<Business>,
        domain: &str,
        locale: &str,
        cache: &DetailCache,
        cancel: Option<&AtomicBool>,
    ) -> Vec<Business> {
        let api = &self.api;
        stream::iter(parsed)
            .map(|mut business| async move {
                if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                    return business;
                }
                enrich_business(api, &mut business, domain, locale, cache).await;
                business
            })
            .buffered(MAX_CONCURRENT_ENRICHMENTS)
            .collect()
            .await
    }
}
