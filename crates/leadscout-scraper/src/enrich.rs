//! Enrichment: per-cid detail fetch, parse, and cache.
//!
//! The cache is scoped to one search run and shared by every page of it.
//! Each cid gets exactly one fetch attempt: concurrent lookups for the same
//! cid await the first writer instead of re-fetching, and a failed attempt
//! caches an empty entry so the run never retries a dead detail page.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use leadscout_core::Business;

use crate::client::ScrapeApi;
use crate::detail::{extract_contact_details, ContactDetails};

/// Run-scoped cache mapping cid to its fetched contact details.
#[derive(Default)]
pub struct DetailCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<ContactDetails>>>>,
}

impl DetailCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contact details for `cid`, fetching and parsing on first
    /// use. A fetch or parse failure is logged and cached as an empty entry.
    pub async fn get_or_fetch(
        &self,
        api: &dyn ScrapeApi,
        cid: &str,
        domain: &str,
        locale: &str,
    ) -> ContactDetails {
        let cell = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(cid.to_string()).or_default())
        };

        cell.get_or_init(|| async {
            match api.fetch_detail_page(cid, domain, Some(locale)).await {
                Ok(response) => extract_contact_details(response.first_content()),
                Err(err) => {
                    tracing::warn!(cid, error = %err, "failed to enrich place details");
                    ContactDetails::default()
                }
            }
        })
        .await
        .clone()
    }

    /// Returns `true` when an enrichment attempt for `cid` has completed,
    /// whether or not it produced any fields. Distinguishes a cached-empty
    /// entry from a cid that was never attempted.
    #[cfg(test)]
    async fn attempted(&self, cid: &str) -> bool {
        self.slots
            .lock()
            .await
            .get(cid)
            .is_some_and(|cell| cell.initialized())
    }
}

/// Copies cached contact details onto a record, fetching on first use.
///
/// Records without a cid are left untouched. A present field is only ever
/// overwritten by a non-empty cached value; enrichment never blanks a field.
pub async fn enrich_business(
    api: &dyn ScrapeApi,
    business: &mut Business,
    domain: &str,
    locale: &str,
    cache: &DetailCache,
) {
    let Some(cid) = business.google_cid.clone() else {
        return;
    };

    let details = cache.get_or_fetch(api, &cid, domain, locale).await;

    if let Some(phone) = details.phone.filter(|v| !v.is_empty()) {
        business.phone = Some(phone);
    }
    if let Some(website) = details.website.filter(|v| !v.is_empty()) {
        business.website = Some(website);
    }
    if let Some(email) = details.email.filter(|v| !v.is_empty()) {
        business.email = Some(email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::client::{ResultEntry, ScrapeResponse};
    use crate::error::ScraperError;

    /// Stub collaborator that serves a canned detail page and counts fetches.
    struct StubApi {
        detail_html: Option<String>,
        fail: bool,
        detail_fetches: AtomicU32,
    }

    impl StubApi {
        fn serving(html: &str) -> Self {
            Self {
                detail_html: Some(html.to_string()),
                fail: false,
                detail_fetches: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                detail_html: None,
                fail: true,
                detail_fetches: AtomicU32::new(0),
            }
        }

        fn fetch_count(&self) -> u32 {
            self.detail_fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScrapeApi for StubApi {
        async fn fetch_listing_page(
            &self,
            _query: &str,
            _geo: &str,
            _page: u32,
            _limit: usize,
            _locale: &str,
            _domain: &str,
        ) -> Result<ScrapeResponse, ScraperError> {
            Ok(ScrapeResponse::default())
        }

        async fn fetch_detail_page(
            &self,
            _cid: &str,
            _domain: &str,
            _locale: Option<&str>,
        ) -> Result<ScrapeResponse, ScraperError> {
            self.detail_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ScraperError::UnexpectedStatus {
                    status: 500,
                    url: "stub".to_string(),
                });
            }
            Ok(ScrapeResponse {
                results: vec![ResultEntry {
                    content: self.detail_html.clone(),
                }],
            })
        }
    }

    const TEL_PAGE: &str = r#"<html><a href="tel:+14165551234">call</a></html>"#;

    fn business_with_cid(cid: &str) -> Business {
        let mut b = Business::new("Joe's Pizza", "Toronto", "Google Maps");
        b.google_cid = Some(cid.to_string());
        b.website = Some(format!("https://www.google.com/maps?cid={cid}"));
        b
    }

    #[tokio::test]
    async fn same_cid_triggers_exactly_one_fetch() {
        let api = StubApi::serving(TEL_PAGE);
        let cache = DetailCache::new();

        let mut first = business_with_cid("42");
        let mut second = business_with_cid("42");
        enrich_business(&api, &mut first, "com", "en-US", &cache).await;
        enrich_business(&api, &mut second, "com", "en-US", &cache).await;

        assert_eq!(api.fetch_count(), 1);
        assert_eq!(first.phone.as_deref(), Some("+14165551234"));
        assert_eq!(second.phone.as_deref(), Some("+14165551234"));
    }

    #[tokio::test]
    async fn failed_fetch_is_cached_as_empty_and_not_retried() {
        let api = StubApi::failing();
        let cache = DetailCache::new();

        let mut business = business_with_cid("7");
        enrich_business(&api, &mut business, "com", "en-US", &cache).await;
        enrich_business(&api, &mut business, "com", "en-US", &cache).await;

        assert_eq!(api.fetch_count(), 1);
        assert!(business.phone.is_none());
        assert!(cache.attempted("7").await);
        assert!(!cache.attempted("8").await);
    }

    #[tokio::test]
    async fn record_without_cid_is_left_untouched() {
        let api = StubApi::serving(TEL_PAGE);
        let cache = DetailCache::new();

        let mut business = Business::new("No Cid Diner", "Toronto", "Google Maps");
        enrich_business(&api, &mut business, "com", "en-US", &cache).await;

        assert_eq!(api.fetch_count(), 0);
        assert!(business.phone.is_none());
        assert!(!cache.attempted("anything").await);
    }

    #[tokio::test]
    async fn empty_cached_fields_never_blank_existing_values() {
        // Detail page with no extractable contact data.
        let api = StubApi::serving("<html>nothing</html>");
        let cache = DetailCache::new();

        let mut business = business_with_cid("9");
        let provisional = business.website.clone();
        enrich_business(&api, &mut business, "com", "en-US", &cache).await;

        assert_eq!(business.website, provisional);
        assert!(cache.attempted("9").await);
    }

    #[tokio::test]
    async fn concurrent_lookups_for_one_cid_share_a_single_fetch() {
        let api = Arc::new(StubApi::serving(TEL_PAGE));
        let cache = Arc::new(DetailCache::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let api = Arc::clone(&api);
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.get_or_fetch(api.as_ref(), "42", "com", "en-US").await
            }));
        }
        for handle in handles {
            let details = handle.await.expect("task panicked");
            assert_eq!(details.phone.as_deref(), Some("+14165551234"));
        }

        assert_eq!(api.fetch_count(), 1);
    }
}
