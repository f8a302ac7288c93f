use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{AssistantError, Result};
use crate::intent::IntentRules;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful multi-function assistant that can \
provide both weather information \
and search results. When the user asks about weather, provide accurate information based on the \
weather data included in the context. When they ask for a search, provide information based on \
the search results. If they ask for both, combine the information appropriately.

Only use the data provided to answer questions, not your training data. \
Be concise, friendly and informative.";

/// Main configuration structure for the assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub openai: OpenAIConfig,
    pub weather: WeatherConfig,
    pub search: SearchConfig,
    pub intent: IntentRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// "stdio" or "http"
    pub transport: String,
    pub http_bind: String,
    /// Attach the per-turn reasoning trace to every outcome
    pub debug_trace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub current_url: String,
    pub forecast_url: String,
    pub forecast_days: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_key: String,
    pub url: String,
    pub host: String,
    pub limit: u32,
    pub related_keywords: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            http_bind: "127.0.0.1:8787".to_string(),
            debug_trace: false,
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            current_url: "https://api.weatherapi.com/v1/current.json".to_string(),
            forecast_url: "https://api.weatherapi.com/v1/forecast.json".to_string(),
            forecast_days: 3,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: "https://google-search74.p.rapidapi.com/".to_string(),
            host: "google-search74.p.rapidapi.com".to_string(),
            limit: 5,
            related_keywords: true,
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// Fails when a required API key is missing or a value is out of range.
    pub fn load() -> Result<Self> {
        let env_paths = ["../.env", ".env"];
        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }
        if !env_loaded {
            tracing::debug!("No .env file found - continuing with env vars only");
        }

        let config_path =
            env::var("ASSISTANT_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            let contents = fs::read_to_string(&config_path)?;
            let config = Self::from_yaml_str(&contents).map_err(|e| {
                AssistantError::Config(format!("Failed to parse {config_path}: {e}"))
            })?;
            tracing::info!("Loaded configuration from {}", config_path);
            config
        } else {
            tracing::info!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = key;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.openai.model = model;
        }

        if let Some(key) = lookup("WEATHER_API_KEY") {
            self.weather.api_key = key;
        }
        if let Some(key) = lookup("RAPID_API_KEY") {
            self.search.api_key = key;
        }

        if let Some(transport) = lookup("ASSISTANT_TRANSPORT") {
            self.server.transport = transport;
        }
        if let Some(bind) = lookup("ASSISTANT_HTTP_BIND") {
            self.server.http_bind = bind;
        }
        if let Some(flag) = lookup("ASSISTANT_DEBUG_TRACE") {
            match flag.parse() {
                Ok(v) => self.server.debug_trace = v,
                Err(_) => tracing::warn!("Ignoring ASSISTANT_DEBUG_TRACE={}: not a bool", flag),
            }
        }
        if let Some(location) = lookup("ASSISTANT_DEFAULT_LOCATION") {
            self.intent.default_location = location;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("OPENAI_API_KEY", &self.openai.api_key),
            ("WEATHER_API_KEY", &self.weather.api_key),
            ("RAPID_API_KEY", &self.search.api_key),
        ] {
            if value.trim().is_empty() {
                return Err(AssistantError::Config(format!(
                    "{name} environment variable must be set"
                )));
            }
        }

        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(AssistantError::Config(
                "openai.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.openai.max_tokens == 0 {
            return Err(AssistantError::Config(
                "openai.max_tokens cannot be 0".to_string(),
            ));
        }
        if !(1..=14).contains(&self.weather.forecast_days) {
            return Err(AssistantError::Config(
                "weather.forecast_days must be between 1 and 14".to_string(),
            ));
        }
        if self.search.limit == 0 {
            return Err(AssistantError::Config("search.limit cannot be 0".to_string()));
        }
        if self.intent.default_location.trim().is_empty() {
            return Err(AssistantError::Config(
                "intent.default_location cannot be empty".to_string(),
            ));
        }
        match self.server.transport.as_str() {
            "stdio" | "http" => Ok(()),
            other => Err(AssistantError::Config(format!(
                "server.transport must be 'stdio' or 'http', got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_keys() -> Config {
        let mut cfg = Config::default();
        cfg.openai.api_key = "sk-test".to_string();
        cfg.weather.api_key = "weather-test".to_string();
        cfg.search.api_key = "rapid-test".to_string();
        cfg
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.openai.model, "gpt-4o-mini");
        assert!((cfg.openai.temperature - 0.7).abs() < 1e-6);
        assert_eq!(cfg.openai.max_tokens, 500);
        assert_eq!(cfg.weather.forecast_days, 3);
        assert_eq!(cfg.search.limit, 5);
        assert_eq!(cfg.intent.default_location, "London");
        assert_eq!(cfg.server.transport, "stdio");
    }

    #[test]
    fn test_missing_api_keys_fail_validation() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let mut cfg = with_keys();
        cfg.search.api_key = "  ".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("RAPID_API_KEY"));

        assert!(with_keys().validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-env"),
            ("WEATHER_API_KEY", "w-env"),
            ("RAPID_API_KEY", "r-env"),
            ("ASSISTANT_TRANSPORT", "http"),
            ("ASSISTANT_DEBUG_TRACE", "true"),
            ("ASSISTANT_DEFAULT_LOCATION", "Lisbon"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.openai.api_key, "sk-env");
        assert_eq!(cfg.weather.api_key, "w-env");
        assert_eq!(cfg.search.api_key, "r-env");
        assert_eq!(cfg.server.transport, "http");
        assert!(cfg.server.debug_trace);
        assert_eq!(cfg.intent.default_location, "Lisbon");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_debug_flag_is_ignored() {
        let mut cfg = Config::default();
        cfg.apply_overrides(|key| (key == "ASSISTANT_DEBUG_TRACE").then(|| "yes".to_string()));
        assert!(!cfg.server.debug_trace);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
openai:
  model: gpt-4-turbo
weather:
  forecast_days: 5
intent:
  default_location: Berlin
  location_markers: ["in", "near"]
"#;
        let cfg = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.openai.model, "gpt-4-turbo");
        assert_eq!(cfg.openai.max_tokens, 500);
        assert_eq!(cfg.weather.forecast_days, 5);
        assert_eq!(cfg.intent.default_location, "Berlin");
        assert_eq!(cfg.intent.location_markers, vec!["in", "near"]);
        assert_eq!(cfg.intent.weather_keywords.len(), 9);
    }

    #[test]
    fn test_range_validation() {
        let mut cfg = with_keys();
        cfg.weather.forecast_days = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = with_keys();
        cfg.openai.temperature = 3.5;
        assert!(cfg.validate().is_err());

        let mut cfg = with_keys();
        cfg.server.transport = "grpc".to_string();
        assert!(cfg.validate().is_err());
    }
}
