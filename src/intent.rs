use serde::{Deserialize, Serialize};

pub const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "rain",
    "sunny",
    "cloudy",
    "humidity",
    "wind",
    "climate",
];

pub const FORECAST_KEYWORDS: &[&str] = &[
    "forecast",
    "tomorrow",
    "next week",
    "upcoming",
    "predict",
    "will it",
    "expected",
];

/// Checked in order; the first one present decides where the search query starts.
pub const SEARCH_KEYWORDS: &[&str] = &[
    "search",
    "google",
    "find",
    "lookup",
    "who is",
    "what is",
    "tell me about",
];

/// Prepositions that introduce a location, highest priority first.
pub const LOCATION_MARKERS: &[&str] = &["in", "for", "at", "near"];

/// Leading words dropped from an extracted search query.
pub const SEARCH_PREFIXES: &[&str] = &[":", "about", "for"];

pub const DEFAULT_LOCATION: &str = "London";

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Keyword tables driving the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentRules {
    pub weather_keywords: Vec<String>,
    pub forecast_keywords: Vec<String>,
    pub search_keywords: Vec<String>,
    pub location_markers: Vec<String>,
    pub search_prefixes: Vec<String>,
    /// Used when a weather query names no recognizable location
    pub default_location: String,
}

impl Default for IntentRules {
    fn default() -> Self {
        Self {
            weather_keywords: owned(WEATHER_KEYWORDS),
            forecast_keywords: owned(FORECAST_KEYWORDS),
            search_keywords: owned(SEARCH_KEYWORDS),
            location_markers: owned(LOCATION_MARKERS),
            search_prefixes: owned(SEARCH_PREFIXES),
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }
}

/// What a single utterance asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentDecision {
    pub is_weather: bool,
    pub is_forecast: bool,
    pub is_search: bool,
    pub location: Option<String>,
    pub search_query: Option<String>,
    /// Set when no keyword matched and the utterance was routed to search as-is
    pub used_fallback: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    rules: IntentRules,
}

impl IntentClassifier {
    pub fn new(rules: IntentRules) -> Self {
        Self { rules }
    }

    pub fn classify(&self, utterance: &str) -> IntentDecision {
        let is_weather = contains_any(utterance, &self.rules.weather_keywords);
        let is_forecast = is_weather && contains_any(utterance, &self.rules.forecast_keywords);
        let is_search = contains_any(utterance, &self.rules.search_keywords);

        if !is_weather && !is_search {
            tracing::debug!("No intent keywords matched, falling back to search");
            return IntentDecision {
                is_weather: false,
                is_forecast: false,
                is_search: true,
                location: None,
                search_query: Some(utterance.to_string()),
                used_fallback: true,
            };
        }

        let location = is_weather.then(|| self.extract_location(utterance));
        let search_query = is_search.then(|| self.extract_search_query(utterance));

        IntentDecision {
            is_weather,
            is_forecast,
            is_search,
            location,
            search_query,
            used_fallback: false,
        }
    }

    fn extract_location(&self, utterance: &str) -> String {
        let found = self.rules.location_markers.iter().find_map(|marker| {
            let pattern = format!(" {marker} ");
            utterance
                .split_once(pattern.as_str())
                .map(|(_, after)| after.split(pattern.as_str()).next().unwrap_or(""))
                .map(|span| span.split(['?', '.']).next().unwrap_or("").trim())
        });

        match found {
            Some(location) if !location.is_empty() => location.to_string(),
            _ => self.rules.default_location.clone(),
        }
    }

    fn extract_search_query(&self, utterance: &str) -> String {
        let rest = self
            .rules
            .search_keywords
            .iter()
            .find_map(|keyword| find_folded(utterance, keyword))
            .map(|(_, end)| utterance[end..].trim());

        let query = rest
            .map(|rest| {
                let prefixed = self
                    .rules
                    .search_prefixes
                    .iter()
                    .any(|prefix| !prefix.is_empty() && rest.starts_with(prefix.as_str()));
                match rest.find(' ') {
                    Some(space) if prefixed => rest[space + 1..].trim(),
                    _ => rest,
                }
            })
            .unwrap_or("");

        if query.is_empty() {
            utterance.to_string()
        } else {
            query.to_string()
        }
    }
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| find_folded(haystack, k).is_some())
}

/// Case-insensitive substring search returning the byte range of the match in `haystack`.
fn find_folded(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    haystack.char_indices().find_map(|(start, _)| {
        let mut matched = 0;
        for (offset, ch) in haystack[start..].char_indices() {
            for lower in ch.to_lowercase() {
                if matched == needle.len() {
                    break;
                }
                if lower != needle[matched] {
                    return None;
                }
                matched += 1;
            }
            if matched == needle.len() {
                return Some((start, start + offset + ch.len_utf8()));
            }
        }
        None
    })
}
