use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ai::parser::lenient;

use crate::profile::UserProfile;
use crate::wardrobe::WardrobeItem;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub weather: Option<WeatherInput>,
}

/// Conditions supplied by the client; extra fields are echoed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInput {
    #[serde(deserialize_with = "temperature")]
    pub temperature: f64,
    pub condition: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Degrees as a JSON number or a numeric string.
fn temperature<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("temperature out of range")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("temperature is not a number: {s:?}"))),
        other => Err(de::Error::custom(format!(
            "temperature must be a number, got {other}"
        ))),
    }
}

/// The stylist's reply as the model is asked to format it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub selected_items: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub missing_items: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub missing_items_explanation: String,
}

impl Recommendation {
    pub fn fallback(raw: &str) -> Self {
        Self {
            explanation: raw.trim().to_string(),
            ..Self::default()
        }
    }

    /// Integer indices as written by the model; `"2"` is accepted, anything
    /// that is not a whole number is skipped.
    pub fn indices(&self) -> Vec<i64> {
        self.selected_items
            .iter()
            .filter_map(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub items: Vec<WardrobeItem>,
    pub explanation: String,
    pub missing_items: Vec<String>,
    pub missing_items_explanation: String,
    pub weather: WeatherInput,
    pub occasion: String,
    pub user_profile: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::parser::parse_or_default;
    use serde_json::json;

    #[test]
    fn weather_extras_round_trip() {
        let w: WeatherInput = serde_json::from_value(json!({
            "temperature": 30, "condition": "clear", "source": "openweathermap"
        }))
        .unwrap();
        assert_eq!(w.temperature, 30.0);
        assert_eq!(serde_json::to_value(&w).unwrap()["source"], "openweathermap");
    }

    #[test]
    fn temperature_accepts_numeric_strings_only() {
        let w: WeatherInput =
            serde_json::from_value(json!({"temperature": " 25 ", "condition": "clear"})).unwrap();
        assert_eq!(w.temperature, 25.0);
        assert!(serde_json::from_value::<WeatherInput>(json!({"temperature": "warm", "condition": "clear"})).is_err());
        assert!(serde_json::from_value::<WeatherInput>(json!({"condition": "clear"})).is_err());
    }

    #[test]
    fn mistyped_sibling_keeps_the_selection() {
        let reply = r#"{"selected_items":[1,2],"explanation":"ok","missing_items":"Belt","missing_items_explanation":null}"#;
        let parsed = parse_or_default(reply, Recommendation::fallback);
        assert!(!parsed.is_fallback());
        let r = parsed.into_inner();
        assert_eq!(r.indices(), vec![1, 2]);
        assert_eq!(r.explanation, "ok");
        assert_eq!(r.missing_items, vec!["Belt"]);
        assert_eq!(r.missing_items_explanation, "");

        let r = parse_or_default(r#"{"selected_items": "1, 2", "explanation": ["x"]}"#, Recommendation::fallback)
            .into_inner();
        assert!(r.indices().is_empty());
        assert_eq!(r.explanation, "");
    }

    #[test]
    fn indices_tolerate_loose_typing() {
        let r: Recommendation =
            serde_json::from_value(json!({"selected_items": [1, "2", 2.5, null, -3]})).unwrap();
        assert_eq!(r.indices(), vec![1, 2, -3]);
        assert!(r.missing_items.is_empty());
    }
}
