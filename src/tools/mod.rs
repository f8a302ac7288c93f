//! External data sources and the invoker that folds their outcomes into [`ToolResult`]s.

pub mod search;
pub mod weather;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::error::{AssistantError, Result};
use crate::intent::IntentDecision;
use crate::models::{CurrentWeather, SearchResults, WeatherForecast};

pub use search::RapidSearchClient;
pub use weather::WeatherApiClient;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherApi: Send + Sync + 'static {
    async fn current(&self, location: &str) -> Result<CurrentWeather>;
    async fn forecast(&self, location: &str, days: u8) -> Result<WeatherForecast>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchApi: Send + Sync + 'static {
    async fn search(&self, query: &str, limit: u32) -> Result<SearchResults>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    CurrentWeather,
    Forecast,
    WebSearch,
}

impl ToolKind {
    pub fn is_weather(self) -> bool {
        matches!(self, ToolKind::CurrentWeather | ToolKind::Forecast)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToolKind::CurrentWeather => "Current Weather API",
            ToolKind::Forecast => "Weather Forecast API",
            ToolKind::WebSearch => "Google Search API",
        };
        f.write_str(name)
    }
}

/// A failed tool call, carrying the location or query it was made with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolError {
    pub tool: ToolKind,
    pub message: String,
    pub query: String,
}

/// Outcome of exactly one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    CurrentWeather { location: String, data: CurrentWeather },
    Forecast { location: String, data: WeatherForecast },
    Search { query: String, data: SearchResults },
    Error(ToolError),
}

impl ToolResult {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolResult::CurrentWeather { .. } => ToolKind::CurrentWeather,
            ToolResult::Forecast { .. } => ToolKind::Forecast,
            ToolResult::Search { .. } => ToolKind::WebSearch,
            ToolResult::Error(e) => e.tool,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }
}

pub struct ToolInvoker {
    weather: Arc<dyn WeatherApi>,
    search: Arc<dyn SearchApi>,
    forecast_days: u8,
    search_limit: u32,
}

impl ToolInvoker {
    pub fn new(
        weather: Arc<dyn WeatherApi>,
        search: Arc<dyn SearchApi>,
        forecast_days: u8,
        search_limit: u32,
    ) -> Self {
        Self {
            weather,
            search,
            forecast_days,
            search_limit,
        }
    }

    pub async fn fetch_current_weather(&self, location: &str) -> ToolResult {
        match self.weather.current(location).await {
            Ok(data) => ToolResult::CurrentWeather {
                location: location.to_string(),
                data,
            },
            Err(e) => fold_error(ToolKind::CurrentWeather, location, e),
        }
    }

    pub async fn fetch_forecast(&self, location: &str, days: u8) -> ToolResult {
        match self.weather.forecast(location, days).await {
            Ok(data) => ToolResult::Forecast {
                location: location.to_string(),
                data,
            },
            Err(e) => fold_error(ToolKind::Forecast, location, e),
        }
    }

    pub async fn web_search(&self, query: &str, limit: u32) -> ToolResult {
        match self.search.search(query, limit).await {
            Ok(data) => ToolResult::Search {
                query: query.to_string(),
                data,
            },
            Err(e) => fold_error(ToolKind::WebSearch, query, e),
        }
    }

    /// Run every tool the decision asks for. Weather and search are fetched
    /// concurrently; the returned list is always weather first, then search.
    pub async fn run(&self, decision: &IntentDecision) -> Vec<ToolResult> {
        let weather = async {
            match decision.location.as_deref() {
                Some(location) if decision.is_weather => Some(if decision.is_forecast {
                    self.fetch_forecast(location, self.forecast_days).await
                } else {
                    self.fetch_current_weather(location).await
                }),
                _ => None,
            }
        };
        let search = async {
            match decision.search_query.as_deref() {
                Some(query) if decision.is_search => {
                    Some(self.web_search(query, self.search_limit).await)
                }
                _ => None,
            }
        };

        let (weather, search) = tokio::join!(weather, search);
        weather.into_iter().chain(search).collect()
    }
}

fn fold_error(tool: ToolKind, query: &str, err: AssistantError) -> ToolResult {
    let message = match &err {
        AssistantError::UpstreamStatus { .. } => err.to_string(),
        other => {
            let action = match tool {
                ToolKind::CurrentWeather => "fetch weather data",
                ToolKind::Forecast => "fetch forecast data",
                ToolKind::WebSearch => "perform search",
            };
            format!("Failed to {action}: {other}")
        }
    };
    tracing::warn!(tool = %tool, query, "Tool call failed: {}", message);
    ToolResult::Error(ToolError {
        tool,
        message,
        query: query.to_string(),
    })
}
