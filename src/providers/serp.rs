//! Search results API client.

use serde::Deserialize;
use std::time::Duration;

use crate::observability::metrics;
use crate::providers::{ProviderError, ProviderResult};
use crate::store::Device;

/// One organic listing, in the order the engine returned it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub position: Option<u32>,
    pub link: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct SerpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl SerpClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    /// Run one search and return its organic results.
    pub async fn search(&self, phrase: &str, country: &str, device: Device) -> ProviderResult<Vec<OrganicResult>> {
        let resp = self
            .http
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", phrase),
                ("gl", country),
                ("device", device.as_str()),
                ("num", "100"),
                ("api_key", self.api_key.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                metrics::record_provider_call("serp", "error");
                ProviderError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            metrics::record_provider_call("serp", "error");
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: "serp",
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = resp.json().await?;
        if let Some(error) = parsed.error {
            // The API reports "no results" as an error string with a 200.
            if !error.to_lowercase().contains("hasn't returned any results") {
                metrics::record_provider_call("serp", "error");
                return Err(ProviderError::Upstream { provider: "serp", message: error });
            }
        }
        metrics::record_provider_call("serp", "live");
        tracing::debug!(phrase = %phrase, results = parsed.organic_results.len(), "SERP search complete");
        Ok(parsed.organic_results)
    }
}

impl std::fmt::Debug for SerpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpClient").field("base_url", &self.base_url).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_without_positions() {
        let raw = r#"{"organic_results":[{"link":"https://a.com"},{"position":2,"link":"https://b.com","title":"B"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.organic_results[0].position, None);
        assert_eq!(parsed.organic_results[1].position, Some(2));
    }

    #[test]
    fn test_empty_response() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.organic_results.is_empty());
        assert!(parsed.error.is_none());
    }
}
