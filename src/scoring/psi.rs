use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use crate::checklist::CheckItem;
use crate::scoring::{CATEGORIES, CategoryScores, FetchError, ScoreClient, scores_from_response};

pub const PSI_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

fn transport_error(err: reqwest::Error) -> FetchError {
    let err = err.without_url();
    if err.is_timeout() {
        FetchError::Other(format!("request timed out: {}", crate::util::error_chain(&err)))
    } else {
        FetchError::Transport(err)
    }
}

/// Blocking PageSpeed Insights v5 client.
pub struct PsiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    locale: String,
}

impl PsiClient {
    pub fn new(api_key: &str, locale: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("psiwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.without_url()))?;
        Ok(Self {
            http,
            endpoint: PSI_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
            locale: locale.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Query pairs for one request; `category` repeats once per category.
    pub fn query(&self, item: &CheckItem) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("url", item.url.clone()),
            ("strategy", item.strategy.as_str().to_string()),
        ];
        for category in CATEGORIES {
            params.push(("category", category.to_string()));
        }
        params.push(("locale", self.locale.clone()));
        if !self.api_key.is_empty() {
            params.push(("key", self.api_key.clone()));
        }
        params
    }
}

impl ScoreClient for PsiClient {
    fn fetch_scores(&self, item: &CheckItem) -> Result<CategoryScores, FetchError> {
        debug!("requesting scores url={} strategy={}", item.url, item.strategy);
        // Errors are stripped of their URL so the API key never ends up in outputs.
        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.query(item))
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = response.text().map_err(transport_error)?;
        let body: Value = serde_json::from_str(&text)?;
        Ok(scores_from_response(&body))
    }
}
