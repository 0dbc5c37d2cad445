use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Result of a best-effort JSON extraction from model output.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    Parsed(T),
    /// No usable object; `value` came from the caller's fallback built over `raw`.
    Fallback { value: T, raw: String },
}

impl<T> Extracted<T> {
    pub fn into_inner(self) -> T {
        match self {
            Extracted::Parsed(v) => v,
            Extracted::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Extracted::Fallback { .. })
    }
}

/// First `{` in `text` at which a complete JSON object starts.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(idx, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[idx..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

pub fn parse_or_default<T, F>(text: &str, fallback: F) -> Extracted<T>
where
    T: DeserializeOwned,
    F: FnOnce(&str) -> T,
{
    if let Some(map) = extract_json_object(text) {
        match serde_json::from_value::<T>(Value::Object(map)) {
            Ok(value) => return Extracted::Parsed(value),
            Err(e) => debug!(error = %e, "embedded object has unexpected shape"),
        }
    }
    Extracted::Fallback {
        value: fallback(text),
        raw: text.to_string(),
    }
}

/// Field deserializers for model replies: `null` or a value of the wrong
/// type becomes the field's default instead of failing the whole object.
pub mod lenient {
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(d)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// Strings as-is, numbers and booleans printed, anything else empty.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            v @ (Value::Number(_) | Value::Bool(_)) => v.to_string(),
            _ => String::new(),
        })
    }

    /// A list of strings; a lone string becomes a one-element list.
    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.trim().is_empty())
                .collect(),
            Value::String(s) if !s.trim().is_empty() => vec![s],
            _ => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Note {
        #[serde(default)]
        title: String,
        #[serde(default)]
        body: String,
    }

    #[test]
    fn finds_object_wrapped_in_prose() {
        let map = extract_json_object("blah {\"a\":1} blah").unwrap();
        assert_eq!(Value::Object(map), json!({"a": 1}));
    }

    #[test]
    fn handles_nested_objects_and_code_fences() {
        let text = "Sure!\n```json\n{\"outer\": {\"inner\": [1, 2]}, \"x\": \"}\"}\n```";
        let map = extract_json_object(text).unwrap();
        assert_eq!(Value::Object(map), json!({"outer": {"inner": [1, 2]}, "x": "}"}));
    }

    #[test]
    fn skips_broken_braces_before_a_valid_object() {
        let map = extract_json_object("{not json} then {\"ok\": true}").unwrap();
        assert_eq!(map["ok"], json!(true));
    }

    #[test]
    fn no_braces_returns_fallback_with_raw_text() {
        let out = parse_or_default("just words", |raw| Note {
            title: "fallback".into(),
            body: raw.to_string(),
        });
        assert!(out.is_fallback());
        match out {
            Extracted::Fallback { value, raw } => {
                assert_eq!(raw, "just words");
                assert_eq!(value.body, "just words");
            }
            Extracted::Parsed(_) => unreachable!(),
        }
    }

    #[test]
    fn typed_parse_succeeds() {
        let out = parse_or_default::<Note, _>(r#"here: {"title":"t","body":"b"}"#, |_| unreachable!());
        assert_eq!(
            out,
            Extracted::Parsed(Note {
                title: "t".into(),
                body: "b".into()
            })
        );
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct LooseNote {
        #[serde(default, deserialize_with = "lenient::text")]
        title: String,
        #[serde(default, deserialize_with = "lenient::string_list")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "lenient::or_default")]
        pages: Vec<i64>,
    }

    #[test]
    fn lenient_fields_absorb_mistyped_siblings() {
        let out = parse_or_default::<LooseNote, _>(
            r#"{"title": null, "tags": "urgent", "pages": "many"}"#,
            |_| unreachable!(),
        );
        assert_eq!(
            out,
            Extracted::Parsed(LooseNote {
                title: String::new(),
                tags: vec!["urgent".into()],
                pages: Vec::new(),
            })
        );

        let out = parse_or_default::<LooseNote, _>(
            r#"{"title": 42, "tags": ["a", 7, null, " "], "pages": [3, 4]}"#,
            |_| unreachable!(),
        );
        let note = out.into_inner();
        assert_eq!(note.title, "42");
        assert_eq!(note.tags, vec!["a", "7"]);
        assert_eq!(note.pages, vec![3, 4]);
    }

    #[test]
    fn wrong_shape_falls_back() {
        let out = parse_or_default(r#"{"title": 5}"#, |raw| Note {
            title: String::new(),
            body: raw.into(),
        });
        assert!(out.is_fallback());
        assert_eq!(out.into_inner().body, r#"{"title": 5}"#);
    }
}
