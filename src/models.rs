use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

// OpenAI chat message format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// Chat completion request format
#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

// Chat completion response format
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: CompletionMessage,
}

/// Content is nullable upstream when the model answers with tool calls only
#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Pass-through bag for upstream JSON fields
pub type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherLocation {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localtime: Option<String>,
    /// Upstream fields not modeled above, passed through to the model untouched
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Condition {
    pub text: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    pub humidity: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Payload of the current-conditions endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentWeather {
    pub location: WeatherLocation,
    pub current: CurrentConditions,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DaySummary {
    pub condition: Condition,
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub daily_chance_of_rain: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: String,
    pub day: DaySummary,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDays {
    pub forecastday: Vec<ForecastDay>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Payload of the forecast endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherForecast {
    pub location: WeatherLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentConditions>,
    pub forecast: ForecastDays,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchHit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Payload of the web search endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn location(name: &str, country: &str) -> WeatherLocation {
        WeatherLocation {
            name: name.to_string(),
            country: country.to_string(),
            region: None,
            localtime: None,
            extra: Extra::new(),
        }
    }

    fn condition(text: &str) -> Condition {
        Condition {
            text: text.to_string(),
            extra: Extra::new(),
        }
    }

    pub fn current_weather(name: &str) -> CurrentWeather {
        CurrentWeather {
            location: location(name, "Japan"),
            current: CurrentConditions {
                temp_c: 21.0,
                temp_f: 69.8,
                condition: condition("Partly cloudy"),
                humidity: 64.0,
                wind_kph: 11.2,
                wind_dir: "SSW".to_string(),
                extra: Extra::new(),
            },
            extra: Extra::new(),
        }
    }

    pub fn forecast(name: &str, days: usize) -> WeatherForecast {
        WeatherForecast {
            location: location(name, "France"),
            current: None,
            forecast: ForecastDays {
                forecastday: (0..days)
                    .map(|i| ForecastDay {
                        date: format!("2024-06-0{}", i + 1),
                        day: DaySummary {
                            condition: condition("Light rain"),
                            maxtemp_c: 24.5,
                            maxtemp_f: 76.1,
                            mintemp_c: 14.0,
                            mintemp_f: 57.2,
                            daily_chance_of_rain: 80.0,
                            extra: Extra::new(),
                        },
                        extra: Extra::new(),
                    })
                    .collect(),
                extra: Extra::new(),
            },
            extra: Extra::new(),
        }
    }

    pub fn search_results(count: usize) -> SearchResults {
        SearchResults {
            results: (1..=count)
                .map(|i| SearchHit {
                    title: Some(format!("Result {i}")),
                    snippet: Some(format!("Snippet {i}")),
                    url: None,
                    extra: Extra::new(),
                })
                .collect(),
            extra: Extra::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_weather_parses_upstream_shape() {
        let raw = r#"{
            "location": {"name": "Tokyo", "country": "Japan", "region": "Tokyo", "lat": 35.69},
            "current": {
                "temp_c": 21, "temp_f": 69.8,
                "condition": {"text": "Partly cloudy", "code": 1003},
                "humidity": 64, "wind_kph": 11.2, "wind_dir": "SSW"
            }
        }"#;
        let parsed: CurrentWeather = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.location.name, "Tokyo");
        assert_eq!(parsed.current.humidity, 64.0);
        assert_eq!(parsed.current.condition.text, "Partly cloudy");
    }

    #[test]
    fn test_unmodeled_upstream_fields_survive_reserialization() {
        let forecast = serde_json::json!({
            "location": {"name": "Paris", "country": "France", "tz_id": "Europe/Paris"},
            "forecast": {"forecastday": [{
                "date": "2024-06-01",
                "astro": {"sunrise": "05:48 AM"},
                "hour": [{"time": "2024-06-01 15:00", "chance_of_rain": 90}],
                "day": {
                    "condition": {"text": "Light rain", "code": 1183},
                    "maxtemp_c": 24.5, "maxtemp_f": 76.1,
                    "mintemp_c": 14.0, "mintemp_f": 57.2,
                    "avgtemp_c": 19.2, "uv": 4.0,
                    "daily_chance_of_rain": 80
                }
            }]}
        });
        let parsed: WeatherForecast = serde_json::from_value(forecast.clone()).unwrap();
        assert_eq!(parsed.forecast.forecastday[0].day.maxtemp_c, 24.5);
        let mut expected = forecast;
        // integral floats come back as floats
        expected["forecast"]["forecastday"][0]["day"]["daily_chance_of_rain"] =
            serde_json::json!(80.0);
        assert_eq!(serde_json::to_value(&parsed).unwrap(), expected);

        let search = serde_json::json!({
            "results": [{"title": "t", "snippet": "s", "url": "u", "position": 1}],
            "related_keywords": {"keywords": [{"keyword": "rust lang"}]}
        });
        let parsed: SearchResults = serde_json::from_value(search.clone()).unwrap();
        assert_eq!(serde_json::to_value(&parsed).unwrap(), search);
    }

    #[test]
    fn test_search_results_tolerate_missing_fields() {
        let parsed: SearchResults =
            serde_json::from_str(r#"{"results": [{"title": "Only title"}, {}]}"#).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[1].snippet, None);

        let empty: SearchResults = serde_json::from_str("{}").unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn test_chat_message_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hi");
    }
}
