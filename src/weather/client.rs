//! Current conditions from OpenWeatherMap, with a fixed fallback.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::WeatherConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub temperature: i64,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<i64>,
    pub source: &'static str,
}

impl WeatherReport {
    pub fn fallback() -> Self {
        Self {
            temperature: 25,
            condition: "sunny".into(),
            description: None,
            humidity: None,
            source: "fallback",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("weather service replied with code {0}")]
    Upstream(String),
    #[error("malformed weather body: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct OwmBody {
    #[serde(default)]
    cod: Value,
    main: Option<OwmMain>,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    #[serde(default)]
    description: Option<String>,
}

/// OpenWeatherMap reports `cod` as a number on success and a string on errors.
fn is_ok_code(cod: &Value) -> bool {
    match cod {
        Value::Number(n) => n.as_i64() == Some(200),
        Value::String(s) => s == "200",
        _ => false,
    }
}

pub(crate) fn parse_report(body: &[u8]) -> Result<WeatherReport, WeatherError> {
    let body: OwmBody =
        serde_json::from_slice(body).map_err(|e| WeatherError::Malformed(e.to_string()))?;
    if !is_ok_code(&body.cod) {
        return Err(WeatherError::Upstream(body.cod.to_string()));
    }
    let main = body
        .main
        .ok_or_else(|| WeatherError::Malformed("missing `main`".into()))?;
    let cond = body
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Malformed("missing `weather`".into()))?;

    Ok(WeatherReport {
        temperature: main.temp.round() as i64,
        condition: cond.main.to_lowercase(),
        description: cond.description,
        humidity: main.humidity,
        source: "openweathermap",
    })
}

pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    city: String,
}

impl WeatherClient {
    pub fn new(cfg: &WeatherConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("build weather http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone(),
            city: cfg.city.clone(),
        })
    }

    async fn fetch(&self) -> Result<WeatherReport, WeatherError> {
        let body = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", self.city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?
            .bytes()
            .await?;
        parse_report(&body)
    }

    /// Never fails; any problem upstream yields [`WeatherReport::fallback`].
    pub async fn current(&self) -> WeatherReport {
        match self.fetch().await {
            Ok(report) => {
                debug!(city = %self.city, temperature = report.temperature, "weather fetched");
                report
            }
            Err(e) => {
                warn!(city = %self.city, error = %e, "weather unavailable, using fallback");
                WeatherReport::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_successful_body() {
        let body = br#"{
            "cod": 200,
            "main": {"temp": 31.6, "humidity": 48},
            "weather": [{"main": "Clear", "description": "clear sky"}]
        }"#;
        let r = parse_report(body).unwrap();
        assert_eq!(r.temperature, 32);
        assert_eq!(r.condition, "clear");
        assert_eq!(r.description.as_deref(), Some("clear sky"));
        assert_eq!(r.humidity, Some(48));
        assert_eq!(r.source, "openweathermap");
    }

    #[test]
    fn error_codes_are_rejected() {
        let body = br#"{"cod": "404", "message": "city not found"}"#;
        assert!(matches!(parse_report(body), Err(WeatherError::Upstream(_))));
        let body = br#"{"cod": 401, "message": "Invalid API key"}"#;
        assert!(matches!(parse_report(body), Err(WeatherError::Upstream(_))));
    }

    #[test]
    fn incomplete_bodies_are_malformed() {
        assert!(matches!(parse_report(b"<html>"), Err(WeatherError::Malformed(_))));
        let body = br#"{"cod": 200, "main": {"temp": 20.0}, "weather": []}"#;
        assert!(matches!(parse_report(body), Err(WeatherError::Malformed(_))));
    }

    #[test]
    fn fallback_omits_optional_fields() {
        let v = serde_json::to_value(WeatherReport::fallback()).unwrap();
        assert_eq!(v, serde_json::json!({"temperature": 25, "condition": "sunny", "source": "fallback"}));
    }

    #[tokio::test]
    async fn unreachable_service_falls_back() {
        let client = WeatherClient::new(&WeatherConfig {
            api_key: "k".into(),
            base_url: "http://127.0.0.1:9/weather".into(),
            city: "Abu Dhabi".into(),
        })
        .unwrap();
        assert_eq!(client.current().await, WeatherReport::fallback());
    }
}
