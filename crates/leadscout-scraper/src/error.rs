use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scraper API rejected the supplied credentials (HTTP 401): {detail}")]
    AuthRejected { detail: String },

    #[error("scraper API credentials missing: set {username_var} and {password_var}")]
    MissingCredentials {
        username_var: &'static str,
        password_var: &'static str,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl ScraperError {
    /// Returns `true` for credential rejections, which callers surface
    /// separately so a UI can prompt for re-authentication.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ScraperError::AuthRejected { .. } | ScraperError::MissingCredentials { .. }
        )
    }
}
