//! Fetch collaborator for the Decodo scraper API.
//!
//! The engine only ever talks to the provider through [`ScrapeApi`];
//! [`DecodoClient`] is the production implementation. Authentication
//! failures surface as [`ScraperError::AuthRejected`], distinct from other
//! transport errors, so callers can prompt for new credentials instead of
//! retrying.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::ScraperError;

/// Default task endpoint of the Decodo Web Scraping API.
pub const DEFAULT_API_ENDPOINT: &str = "https://scraper-api.decodo.com/v2/scrape";

const USERNAME_VAR: &str = "DECODO_USERNAME";
const PASSWORD_VAR: &str = "DECODO_PASSWORD";

/// Maximum length of the upstream error detail echoed into
/// [`ScraperError::AuthRejected`].
const AUTH_DETAIL_MAX_LEN: usize = 200;

/// Top-level response of one scrape task.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeResponse {
    #[serde(default)]
    pub results: Vec<ResultEntry>,
}

/// One result entry carrying a markup payload.
#[derive(Debug, Default, Deserialize)]
pub struct ResultEntry {
    /// Raw page markup. May be absent for entries the provider could not
    /// render.
    #[serde(default)]
    pub content: Option<String>,
}

impl ScrapeResponse {
    /// Returns the first non-empty markup payload, if any.
    #[must_use]
    pub fn first_content(&self) -> Option<&str> {
        self.results
            .iter()
            .filter_map(|entry| entry.content.as_deref())
            .find(|content| !content.is_empty())
    }
}

/// Boundary contract between the extraction engine and the scraping
/// provider. The implementation owns authentication, rate limiting, and
/// transport-level retries.
#[async_trait]
pub trait ScrapeApi: Send + Sync {
    /// Fetches one page of local-search listing markup.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] on transport or deserialization failure;
    /// [`ScraperError::AuthRejected`] when credentials are refused.
    async fn fetch_listing_page(
        &self,
        query: &str,
        geo: &str,
        page: u32,
        limit: usize,
        locale: &str,
        domain: &str,
    ) -> Result<ScrapeResponse, ScraperError>;

    /// Fetches the detail page for one map entity by its cid.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::fetch_listing_page`].
    async fn fetch_detail_page(
        &self,
        cid: &str,
        domain: &str,
        locale: Option<&str>,
    ) -> Result<ScrapeResponse, ScraperError>;
}

/// Production [`ScrapeApi`] implementation backed by the Decodo task API.
pub struct DecodoClient {
    client: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
}

impl DecodoClient {
    /// Creates a client with the given credentials and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            username: username.into(),
            password: password.into(),
        })
    }

    /// Creates a client from `DECODO_USERNAME` / `DECODO_PASSWORD`,
    /// loading a `.env` file first when one is present.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MissingCredentials`] when either variable is
    /// unset or empty, [`ScraperError::Http`] on client construction failure.
    pub fn from_env(timeout_secs: u64) -> Result<Self, ScraperError> {
        dotenvy::dotenv().ok();
        let username = std::env::var(USERNAME_VAR).unwrap_or_default();
        let password = std::env::var(PASSWORD_VAR).unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(ScraperError::MissingCredentials {
                username_var: USERNAME_VAR,
                password_var: PASSWORD_VAR,
            });
        }
        Self::new(username, password, timeout_secs)
    }

    /// Overrides the task endpoint. Used by tests to point at a mock server.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn scrape(&self, payload: serde_json::Value) -> Result<ScrapeResponse, ScraperError> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(ScraperError::AuthRejected {
                detail: auth_detail(&body),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<ScrapeResponse>(&body).map_err(|e| ScraperError::Deserialize {
            context: format!("scrape response from {}", self.endpoint),
            source: e,
        })
    }

    fn detail_url(cid: &str, domain: &str, locale: Option<&str>) -> String {
        let tld = if domain.is_empty() { "com" } else { domain };
        let mut url = format!("https://www.google.{tld}/maps?cid={cid}");
        if let Some(locale) = locale {
            url.push_str(&format!("&hl={locale}"));
            if let Some((_, region)) = locale.rsplit_once('-') {
                url.push_str(&format!("&gl={region}"));
            }
        }
        url
    }
}

#[async_trait]
impl ScrapeApi for DecodoClient {
    async fn fetch_listing_page(
        &self,
        query: &str,
        geo: &str,
        page: u32,
        limit: usize,
        locale: &str,
        domain: &str,
    ) -> Result<ScrapeResponse, ScraperError> {
        self.scrape(json!({
            "target": "google_maps",
            "query": query,
            "geo": geo,
            "limit": limit,
            "locale": locale,
            "domain": domain,
            "page_from": page.to_string(),
            "device_type": "desktop",
            "google_results_language": "en",
            "google_nfpr": true,
        }))
        .await
    }

    async fn fetch_detail_page(
        &self,
        cid: &str,
        domain: &str,
        locale: Option<&str>,
    ) -> Result<ScrapeResponse, ScraperError> {
        self.scrape(json!({
            "target": "google",
            "url": Self::detail_url(cid, domain, locale),
        }))
        .await
    }
}

/// Pulls a human-readable error message out of a 401 response body.
///
/// The API answers 401 with either a JSON object carrying `message`/`error`/
/// `detail` or a plain-text body; both are truncated to
/// [`AUTH_DETAIL_MAX_LEN`] characters.
fn auth_detail(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error", "detail"]
                .iter()
                .find_map(|key| v.get(key).and_then(serde_json::Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        return "no detail supplied".to_string();
    }
    if detail.chars().count() <= AUTH_DETAIL_MAX_LEN {
        return detail;
    }
    let truncated: String = detail.chars().take(AUTH_DETAIL_MAX_LEN - 3).collect();
    format!("{truncated}...")
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
