use std::{fmt, path::PathBuf, time::Duration};

use anyhow::{bail, Context};

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Generative-AI endpoint settings and the credential pool.
#[derive(Clone)]
pub struct AiConfig {
    pub api_keys: Vec<String>,
    pub model: String,
    pub base_url: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_keys", &format_args!("<{} redacted>", self.api_keys.len()))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

#[derive(Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub city: String,
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("city", &self.city)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub jwt: JwtConfig,
    pub ai: AiConfig,
    pub weather: WeatherConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://wardrobe.db".into());
        let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "wardrobe".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "wardrobe-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7),
        };

        let api_keys = gemini_keys(
            std::env::var("GEMINI_API_KEYS").ok().as_deref(),
            std::env::var("GEMINI_API_KEY").ok().as_deref(),
        );
        if api_keys.is_empty() {
            bail!("GEMINI_API_KEYS (or GEMINI_API_KEY) must contain at least one key");
        }

        let ai = AiConfig {
            api_keys,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            base_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            max_attempts: env_parse("AI_MAX_ATTEMPTS").unwrap_or(5),
            base_delay: Duration::from_millis(env_parse("AI_BASE_DELAY_MS").unwrap_or(500)),
            max_delay: Duration::from_millis(env_parse("AI_MAX_DELAY_MS").unwrap_or(8_000)),
        };

        let weather = WeatherConfig {
            api_key: std::env::var("OPENWEATHER_API_KEY")
                .context("OPENWEATHER_API_KEY must be set")?,
            base_url: std::env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5/weather".into()),
            city: std::env::var("WEATHER_CITY").unwrap_or_else(|_| "Abu Dhabi".into()),
        };

        Ok(Self {
            database_url,
            upload_dir,
            jwt,
            ai,
            weather,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// The pool list wins when it holds at least one key; otherwise the single key.
pub(crate) fn gemini_keys(pool: Option<&str>, single: Option<&str>) -> Vec<String> {
    let keys = pool.map(split_keys).unwrap_or_default();
    if !keys.is_empty() {
        return keys;
    }
    single.map(split_keys).unwrap_or_default()
}

/// Comma separated list, blanks dropped, order preserved.
pub(crate) fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keys_keeps_order_and_drops_blanks() {
        assert_eq!(split_keys(" k1, ,k2,k3 ,"), vec!["k1", "k2", "k3"]);
        assert!(split_keys("  ").is_empty());
    }

    #[test]
    fn blank_key_pool_falls_back_to_single_key() {
        assert_eq!(gemini_keys(Some("  "), Some("solo")), vec!["solo"]);
        assert_eq!(gemini_keys(Some(""), Some("solo")), vec!["solo"]);
        assert_eq!(gemini_keys(None, Some("solo")), vec!["solo"]);
        assert_eq!(gemini_keys(Some("a,b"), Some("solo")), vec!["a", "b"]);
        assert!(gemini_keys(Some(" , "), None).is_empty());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let ai = AiConfig {
            api_keys: vec!["super-secret-1".into(), "super-secret-2".into()],
            model: "m".into(),
            base_url: "http://localhost".into(),
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        };
        let out = format!("{ai:?}");
        assert!(!out.contains("super-secret"));
        assert!(out.contains("<2 redacted>"));

        let weather = WeatherConfig {
            api_key: "owm-secret".into(),
            base_url: "http://localhost".into(),
            city: "Abu Dhabi".into(),
        };
        assert!(!format!("{weather:?}").contains("owm-secret"));
    }
}
