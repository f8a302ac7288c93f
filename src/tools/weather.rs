use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::WeatherApi;
use crate::config::WeatherConfig;
use crate::error::{AssistantError, Result};
use crate::models::{CurrentWeather, WeatherForecast};

/// Client for weatherapi.com style `current.json` / `forecast.json` endpoints
pub struct WeatherApiClient {
    client: Client,
    api_key: String,
    current_url: String,
    forecast_url: String,
}

impl WeatherApiClient {
    pub fn new(cfg: &WeatherConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: cfg.api_key.clone(),
            current_url: cfg.current_url.clone(),
            forecast_url: cfg.forecast_url.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self.client.get(url).query(params).send().await?;
        if response.status() != StatusCode::OK {
            return Err(AssistantError::UpstreamStatus {
                service,
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl WeatherApi for WeatherApiClient {
    async fn current(&self, location: &str) -> Result<CurrentWeather> {
        tracing::info!("Fetching current weather for: {}", location);
        let params = [("key", self.api_key.clone()), ("q", location.to_string())];
        self.get("Weather", &self.current_url, &params).await
    }

    async fn forecast(&self, location: &str, days: u8) -> Result<WeatherForecast> {
        tracing::info!("Fetching {}-day forecast for: {}", days, location);
        let params = [
            ("key", self.api_key.clone()),
            ("q", location.to_string()),
            ("days", days.to_string()),
        ];
        self.get("Forecast", &self.forecast_url, &params).await
    }
}
