//! User-facing text: tool notices, the final answer and the per-turn reasoning trace.

use crate::intent::IntentDecision;
use crate::models::{CurrentWeather, SearchResults, WeatherForecast};
use crate::tools::{ToolError, ToolResult};

pub const WELCOME: &str = "👋 Welcome to the Multi-Function Assistant!

I can help with two main functions:
1. Weather information - Ask me about current conditions or forecasts
2. Web searches - Just include words like \"search\" or \"google\" in your query

Examples:
- \"What's the weather in Tokyo?\"
- \"Search for Rohith Reddy Vangala\"
- \"Tell me about the forecast in Paris and lookup tourist attractions there\"
";

const SEARCH_PREVIEW_LEN: usize = 3;

pub fn notice(result: &ToolResult) -> String {
    match result {
        ToolResult::CurrentWeather { data, .. } => current_weather(data),
        ToolResult::Forecast { data, .. } => forecast(data),
        ToolResult::Search { query, data } => search_preview(query, data),
        ToolResult::Error(e) => tool_error(e),
    }
}

pub fn current_weather(w: &CurrentWeather) -> String {
    let c = &w.current;
    format!(
        "📊 Current weather for {}, {}:\n\
         • Temperature: {}°C / {}°F\n\
         • Condition: {}\n\
         • Humidity: {}%\n\
         • Wind: {} kph, {}",
        w.location.name,
        w.location.country,
        c.temp_c,
        c.temp_f,
        c.condition.text,
        c.humidity,
        c.wind_kph,
        c.wind_dir
    )
}

pub fn forecast(f: &WeatherForecast) -> String {
    let mut out = format!(
        "📊 Weather Forecast for {}, {}:\n\n",
        f.location.name, f.location.country
    );
    for day in &f.forecast.forecastday {
        let d = &day.day;
        out.push_str(&format!(
            "📅 **{}**\n\
             • Condition: {}\n\
             • Max temp: {}°C / {}°F\n\
             • Min temp: {}°C / {}°F\n\
             • Chance of rain: {}%\n\n",
            day.date,
            d.condition.text,
            d.maxtemp_c,
            d.maxtemp_f,
            d.mintemp_c,
            d.mintemp_f,
            d.daily_chance_of_rain
        ));
    }
    out
}

pub fn search_preview(query: &str, results: &SearchResults) -> String {
    let mut out = format!("🔍 Search results for \"{query}\":\n\n");
    for (i, hit) in results.results.iter().take(SEARCH_PREVIEW_LEN).enumerate() {
        out.push_str(&format!(
            "**{}. {}**\n{}\n\n",
            i + 1,
            hit.title.as_deref().unwrap_or("No title"),
            hit.snippet.as_deref().unwrap_or("No description")
        ));
    }
    out
}

pub fn tool_error(e: &ToolError) -> String {
    if e.tool.is_weather() {
        format!("I encountered a problem getting weather data: {}", e.message)
    } else {
        format!("I encountered a problem with the search: {}", e.message)
    }
}

pub fn intent_icon(decision: &IntentDecision) -> &'static str {
    match (decision.is_weather, decision.is_search) {
        (true, true) => "🌐🌤️",
        (true, false) => "🌤️",
        _ => "🔍",
    }
}

pub fn final_answer(decision: &IntentDecision, reply: &str) -> String {
    format!("{} {}", intent_icon(decision), reply)
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Markdown log of how a turn was handled
#[derive(Debug, Default, Clone)]
pub struct TurnTrace {
    lines: Vec<String>,
}

impl TurnTrace {
    pub fn new(utterance: &str) -> Self {
        let mut trace = Self::default();
        trace.push("# Model Context Protocol: Multi-Function Assistant");
        trace.section("Input Analysis");
        trace.push(format!("- User query: \"{utterance}\""));
        trace
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("## {title}"));
    }

    pub fn decision(&mut self, d: &IntentDecision) {
        if d.is_weather {
            self.push("- Weather query detected");
            if let Some(location) = &d.location {
                self.push(format!("- Location extracted: \"{location}\""));
            }
            self.push(format!("- Forecast requested: {}", d.is_forecast));
        }
        if d.is_search && !d.used_fallback {
            self.push("- Search request detected");
            if let Some(query) = &d.search_query {
                self.push(format!("- Search query: \"{query}\""));
            }
        }

        self.section("Tool Execution Plan");
        let step = if d.is_weather {
            let plan = if d.is_forecast {
                "Weather Forecast API - Get multi-day forecast"
            } else {
                "Current Weather API - Get current conditions"
            };
            self.push(format!("1. {plan}"));
            2
        } else {
            1
        };
        if d.used_fallback {
            self.push(format!(
                "{step}. Google Search API - No specific intent detected, using search as fallback"
            ));
        } else if d.is_search {
            self.push(format!(
                "{step}. Google Search API - Get information based on search query"
            ));
        }
        self.section("Tool Execution");
    }

    pub fn tool_result(&mut self, result: &ToolResult) {
        self.push(format!("### Tool: {}", result.kind()));
        match result {
            ToolResult::CurrentWeather { location, data } => {
                self.push(format!("- Input: \"{location}\""));
                self.push(format!(
                    "- Current weather data received for: {}, {}",
                    data.location.name, data.location.country
                ));
                self.push(format!(
                    "- Current temperature: {}°C / {}°F",
                    data.current.temp_c, data.current.temp_f
                ));
                self.push(format!(
                    "- Weather condition: {}",
                    data.current.condition.text
                ));
            }
            ToolResult::Forecast { location, data } => {
                self.push(format!("- Input: \"{location}\""));
                self.push(format!(
                    "- Forecast data received for: {}, {}",
                    data.location.name, data.location.country
                ));
                self.push(format!(
                    "- Forecast days: {}",
                    data.forecast.forecastday.len()
                ));
            }
            ToolResult::Search { query, data } => {
                self.push(format!("- Input: \"{query}\""));
                self.push(format!(
                    "- Search results received: {} items",
                    data.results.len()
                ));
            }
            ToolResult::Error(e) => {
                self.push(format!("- Input: \"{}\"", e.query));
                self.push(format!("- Error: {}", e.message));
            }
        }
    }

    pub fn context(&mut self, system_prompt: &str, weather: bool, search: bool, size: usize) {
        self.section("Model Context Protocol Structure");
        self.push(format!(
            "- System message: \"{}...\"",
            preview(system_prompt, 50)
        ));
        if weather {
            self.push("- Including weather data in context");
        }
        if search {
            self.push("- Including search results in context");
        }
        self.push(format!("- Total context size: {size} characters"));
    }

    pub fn model_call(&mut self, model: &str, temperature: f32, max_tokens: u32) {
        self.section("AI Processing");
        self.push(format!("- Sending to model: {model}"));
        self.push(format!("- Temperature: {temperature}"));
        self.push(format!("- Max tokens: {max_tokens}"));
    }

    pub fn model_response(&mut self, reply: &str) {
        self.push(format!("- Response received: \"{}...\"", preview(reply, 50)));
    }

    pub fn model_error(&mut self, err: &dyn std::fmt::Display) {
        self.push(format!("- Model error: {err}"));
    }

    pub fn summary(&mut self, d: &IntentDecision) {
        self.section("Process Summary");
        let mut steps = vec!["Analyzed user query for intent (weather and/or search)".to_string()];
        if d.is_weather {
            steps.push(format!(
                "Used Weather API to get {} data",
                if d.is_forecast { "forecast" } else { "current" }
            ));
        }
        if let (true, Some(query)) = (d.is_search, &d.search_query) {
            steps.push(format!(
                "Used Google Search API to get information about \"{query}\""
            ));
        }
        steps.push("Constructed MCP structure with original query + all tool outputs".to_string());
        steps.push("Generated natural language response using LLM".to_string());
        steps.push("Updated conversation context for future queries".to_string());

        for (i, step) in steps.iter().enumerate() {
            self.push(format!("{}. {}", i + 1, step));
        }
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}
