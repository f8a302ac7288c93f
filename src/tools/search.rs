use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::SearchApi;
use crate::config::SearchConfig;
use crate::error::{AssistantError, Result};
use crate::models::SearchResults;

/// Google search through RapidAPI
pub struct RapidSearchClient {
    client: Client,
    api_key: String,
    url: String,
    host: String,
    related_keywords: bool,
}

impl RapidSearchClient {
    pub fn new(cfg: &SearchConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: cfg.api_key.clone(),
            url: cfg.url.clone(),
            host: cfg.host.clone(),
            related_keywords: cfg.related_keywords,
        }
    }
}

#[async_trait]
impl SearchApi for RapidSearchClient {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResults> {
        tracing::info!("Searching the web for: {}", query);

        let response = self
            .client
            .get(&self.url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .query(&[
                ("query", query.to_string()),
                ("limit", limit.to_string()),
                ("related_keywords", self.related_keywords.to_string()),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(AssistantError::UpstreamStatus {
                service: "Google Search",
                status: response.status().as_u16(),
            });
        }

        let results: SearchResults = response.json().await?;
        tracing::debug!("Search returned {} results", results.results.len());
        Ok(results)
    }
}
