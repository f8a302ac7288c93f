use serde::Serialize;

use crate::error::Result;
use crate::models::{CurrentWeather, SearchResults, WeatherForecast};
use crate::tools::ToolResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherData {
    Current(CurrentWeather),
    Forecast(WeatherForecast),
}

/// The original query plus whatever the tools managed to fetch for this turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnContext {
    pub original_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_data: Option<WeatherData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<SearchResults>,
}

/// Merge the successful tool results into a context. Errors are dropped here;
/// they reach the user as notices instead.
pub fn assemble(utterance: &str, results: &[ToolResult]) -> TurnContext {
    let mut ctx = TurnContext {
        original_query: utterance.to_string(),
        weather_data: None,
        search_results: None,
    };

    for result in results {
        match result {
            ToolResult::CurrentWeather { data, .. } if ctx.weather_data.is_none() => {
                ctx.weather_data = Some(WeatherData::Current(data.clone()));
            }
            ToolResult::Forecast { data, .. } if ctx.weather_data.is_none() => {
                ctx.weather_data = Some(WeatherData::Forecast(data.clone()));
            }
            ToolResult::Search { data, .. } if ctx.search_results.is_none() => {
                ctx.search_results = Some(data.clone());
            }
            _ => {}
        }
    }

    tracing::debug!(
        weather = ctx.weather_data.is_some(),
        search = ctx.search_results.is_some(),
        "Assembled turn context"
    );
    ctx
}

impl TurnContext {
    /// The user entry sent to the model: raw utterance, a blank line, then the context as JSON.
    pub fn augmented_message(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(format!("{}\n\n{}", self.original_query, json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use crate::tools::{ToolError, ToolKind};
    use serde_json::Value;

    fn weather_error() -> ToolResult {
        ToolResult::Error(ToolError {
            tool: ToolKind::CurrentWeather,
            message: "Weather API returned status code 400".to_string(),
            query: "Atlantis".to_string(),
        })
    }

    fn search_error() -> ToolResult {
        ToolResult::Error(ToolError {
            tool: ToolKind::WebSearch,
            message: "Failed to perform search: timeout".to_string(),
            query: "Atlantis".to_string(),
        })
    }

    #[test]
    fn test_includes_successful_results() {
        let results = vec![
            ToolResult::Forecast {
                location: "Paris".to_string(),
                data: fixtures::forecast("Paris", 3),
            },
            ToolResult::Search {
                query: "Paris".to_string(),
                data: fixtures::search_results(2),
            },
        ];
        let ctx = assemble("Tell me about the forecast in Paris", &results);

        assert!(matches!(ctx.weather_data, Some(WeatherData::Forecast(_))));
        assert_eq!(ctx.search_results, Some(fixtures::search_results(2)));
    }

    #[test]
    fn test_weather_error_never_included() {
        let results = vec![
            weather_error(),
            ToolResult::Search {
                query: "Atlantis".to_string(),
                data: fixtures::search_results(1),
            },
        ];
        let ctx = assemble("weather in Atlantis", &results);

        assert!(ctx.weather_data.is_none());
        assert!(ctx.search_results.is_some());
    }

    #[test]
    fn test_both_failures_leave_only_original_query() {
        let ctx = assemble("weather in Atlantis", &[weather_error(), search_error()]);
        let json: Value = serde_json::to_value(&ctx).unwrap();

        assert_eq!(json, serde_json::json!({"original_query": "weather in Atlantis"}));
    }

    #[test]
    fn test_augmented_message_layout() {
        let results = vec![ToolResult::CurrentWeather {
            location: "Tokyo".to_string(),
            data: fixtures::current_weather("Tokyo"),
        }];
        let ctx = assemble("What's the weather in Tokyo?", &results);
        let message = ctx.augmented_message().unwrap();

        let (head, body) = message.split_once("\n\n").unwrap();
        assert_eq!(head, "What's the weather in Tokyo?");
        let json: Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["original_query"], "What's the weather in Tokyo?");
        assert_eq!(json["weather_data"]["location"]["name"], "Tokyo");
        assert_eq!(json["weather_data"]["current"]["temp_c"], 21.0);
        assert!(json.get("search_results").is_none());
    }

    #[test]
    fn test_upstream_extras_reach_the_augmented_message() {
        let mut forecast = fixtures::forecast("Paris", 1);
        forecast.forecast.forecastday[0].extra.insert(
            "hour".to_string(),
            serde_json::json!([{"time": "2024-06-01 15:00", "chance_of_rain": 90}]),
        );
        let mut search = fixtures::search_results(1);
        search.extra.insert(
            "related_keywords".to_string(),
            serde_json::json!({"keywords": [{"keyword": "paris rain"}]}),
        );
        let results = vec![
            ToolResult::Forecast {
                location: "Paris".to_string(),
                data: forecast,
            },
            ToolResult::Search {
                query: "Paris".to_string(),
                data: search,
            },
        ];

        let message = assemble("will it rain at 3pm tomorrow in Paris?", &results)
            .augmented_message()
            .unwrap();
        let (_, body) = message.split_once("\n\n").unwrap();
        let json: Value = serde_json::from_str(body).unwrap();

        let day = &json["weather_data"]["forecast"]["forecastday"][0];
        assert_eq!(day["hour"][0]["chance_of_rain"], 90);
        assert_eq!(
            json["search_results"]["related_keywords"]["keywords"][0]["keyword"],
            "paris rain"
        );
    }
}
