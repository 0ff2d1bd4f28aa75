use dioxus::prelude::*;
use serde::Deserialize;

pub const DEFAULT_FORM_ENDPOINT: &str = "https://formspree.io/f/xwpnakll";
pub const DEFAULT_HEADER_FALLBACK_HEIGHT: f64 = 80.0;
pub const DEFAULT_SECTION_LOOKAHEAD: f64 = 100.0;
pub const DEFAULT_HEADER_SCROLLED_OFFSET: f64 = 100.0;
pub const DEFAULT_BACK_TO_TOP_OFFSET: f64 = 500.0;
pub const DEFAULT_COUNTER_DURATION_MS: f64 = 2000.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub form_endpoint: String,
    pub header_fallback_height: f64,
    pub section_lookahead: f64,
    pub header_scrolled_offset: f64,
    pub back_to_top_offset: f64,
    pub counter_duration_ms: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            form_endpoint: DEFAULT_FORM_ENDPOINT.to_string(),
            header_fallback_height: DEFAULT_HEADER_FALLBACK_HEIGHT,
            section_lookahead: DEFAULT_SECTION_LOOKAHEAD,
            header_scrolled_offset: DEFAULT_HEADER_SCROLLED_OFFSET,
            back_to_top_offset: DEFAULT_BACK_TO_TOP_OFFSET,
            counter_duration_ms: DEFAULT_COUNTER_DURATION_MS,
        }
    }
}

impl RuntimeConfig {
    /// Replaces values a hand-edited config could break (blank endpoint,
    /// negative or non-finite offsets) with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let form_endpoint = if self.form_endpoint.trim().is_empty() {
            defaults.form_endpoint
        } else {
            self.form_endpoint.trim().to_string()
        };
        Self {
            form_endpoint,
            header_fallback_height: non_negative(
                self.header_fallback_height,
                defaults.header_fallback_height,
            ),
            section_lookahead: non_negative(self.section_lookahead, defaults.section_lookahead),
            header_scrolled_offset: non_negative(
                self.header_scrolled_offset,
                defaults.header_scrolled_offset,
            ),
            back_to_top_offset: non_negative(self.back_to_top_offset, defaults.back_to_top_offset),
            counter_duration_ms: positive(self.counter_duration_ms, defaults.counter_duration_ms),
        }
    }
}

pub fn use_runtime_config() -> Resource<RuntimeConfig> {
    use_resource(|| async move {
        match fetch_runtime_config().await {
            Ok(config) => config.sanitized(),
            Err(message) => {
                tracing::warn!("config: {message}; using defaults");
                RuntimeConfig::default()
            }
        }
    })
}

#[cfg(target_arch = "wasm32")]
async fn fetch_runtime_config() -> Result<RuntimeConfig, String> {
    match fetch_config_from("/config.json").await {
        Ok(config) => Ok(config),
        Err(_) => fetch_config_from("/assets/config.json").await,
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_config_from(path: &str) -> Result<RuntimeConfig, String> {
    let response = gloo_net::http::Request::get(path)
        .send()
        .await
        .map_err(|err| format!("config fetch failed: {err}"))?;
    if !response.ok() {
        return Err(format!("config fetch failed: status {}", response.status()));
    }
    response
        .json::<RuntimeConfig>()
        .await
        .map_err(|err| format!("config decode failed: {err}"))
}

#[cfg(not(target_arch = "wasm32"))]
async fn fetch_runtime_config() -> Result<RuntimeConfig, String> {
    Ok(config_from_env(|key| std::env::var(key).ok()))
}

#[cfg(not(target_arch = "wasm32"))]
fn config_from_env(lookup: impl Fn(&str) -> Option<String>) -> RuntimeConfig {
    let form_endpoint =
        lookup("FORM_ENDPOINT").unwrap_or_else(|| DEFAULT_FORM_ENDPOINT.to_string());
    RuntimeConfig {
        form_endpoint,
        header_fallback_height: parse_f64(
            lookup("HEADER_FALLBACK_HEIGHT"),
            DEFAULT_HEADER_FALLBACK_HEIGHT,
        ),
        section_lookahead: parse_f64(lookup("SECTION_LOOKAHEAD"), DEFAULT_SECTION_LOOKAHEAD),
        header_scrolled_offset: parse_f64(
            lookup("HEADER_SCROLLED_OFFSET"),
            DEFAULT_HEADER_SCROLLED_OFFSET,
        ),
        back_to_top_offset: parse_f64(lookup("BACK_TO_TOP_OFFSET"), DEFAULT_BACK_TO_TOP_OFFSET),
        counter_duration_ms: parse_f64(lookup("COUNTER_DURATION_MS"), DEFAULT_COUNTER_DURATION_MS),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_f64(value: Option<String>, default_value: f64) -> f64 {
    value
        .as_deref()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .unwrap_or(default_value)
}

fn non_negative(value: f64, default_value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        default_value
    }
}

fn positive(value: f64, default_value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"formEndpoint":"https://relay.test/f/abc","backToTopOffset":420}"#)
                .unwrap();
        assert_eq!(config.form_endpoint, "https://relay.test/f/abc");
        assert_eq!(config.back_to_top_offset, 420.0);
        assert_eq!(config.header_fallback_height, DEFAULT_HEADER_FALLBACK_HEIGHT);
        assert_eq!(config.counter_duration_ms, DEFAULT_COUNTER_DURATION_MS);
    }

    #[test]
    fn sanitized_restores_broken_values() {
        let config = RuntimeConfig {
            form_endpoint: "   ".to_string(),
            header_fallback_height: -4.0,
            section_lookahead: f64::NAN,
            header_scrolled_offset: 60.0,
            back_to_top_offset: f64::INFINITY,
            counter_duration_ms: 0.0,
        }
        .sanitized();
        assert_eq!(config.form_endpoint, DEFAULT_FORM_ENDPOINT);
        assert_eq!(config.header_fallback_height, DEFAULT_HEADER_FALLBACK_HEIGHT);
        assert_eq!(config.section_lookahead, DEFAULT_SECTION_LOOKAHEAD);
        assert_eq!(config.header_scrolled_offset, 60.0);
        assert_eq!(config.back_to_top_offset, DEFAULT_BACK_TO_TOP_OFFSET);
        assert_eq!(config.counter_duration_ms, DEFAULT_COUNTER_DURATION_MS);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = config_from_env(|key| match key {
            "FORM_ENDPOINT" => Some("https://relay.test/f/env".to_string()),
            "BACK_TO_TOP_OFFSET" => Some(" 420 ".to_string()),
            "COUNTER_DURATION_MS" => Some("fast".to_string()),
            _ => None,
        });
        assert_eq!(config.form_endpoint, "https://relay.test/f/env");
        assert_eq!(config.back_to_top_offset, 420.0);
        assert_eq!(config.counter_duration_ms, DEFAULT_COUNTER_DURATION_MS);
        assert_eq!(config.section_lookahead, DEFAULT_SECTION_LOOKAHEAD);
    }
}
