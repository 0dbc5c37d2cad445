use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::transport::{GenerativeModel, InlineImage, TransportError};

/// Gemini `generateContent` over HTTPS.
#[derive(Clone)]
pub struct GeminiModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiModel {
    pub fn new(base_url: &str, model: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("build gemini http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, TransportError> {
        // key goes in a header so it never shows up in logged URLs
        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt, image))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), model = %self.model, "gemini response");

        if !status.is_success() {
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
        response_text(&body)
    }
}

fn request_body(prompt: &str, image: Option<&InlineImage>) -> Value {
    let mut parts = vec![json!({ "text": prompt })];
    if let Some(img) = image {
        parts.push(json!({
            "inline_data": {
                "mime_type": img.mime_type,
                "data": STANDARD.encode(&img.data),
            }
        }));
    }
    json!({ "contents": [{ "parts": parts }] })
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn response_text(body: &str) -> Result<String, TransportError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(TransportError::Decode("response contained no text".into()));
    }
    Ok(text)
}

/// `STATUS: message` from a Google error envelope, else the raw body.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: ErrorBody,
    }
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        status: String,
        #[serde(default)]
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope { error }) if !error.status.is_empty() => {
            format!("{}: {}", error.status, error.message)
        }
        Ok(Envelope { error }) => error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn text_only_request_has_single_part() {
        let body = request_body("hello", None);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "hello");
    }

    #[test]
    fn image_request_carries_base64_inline_data() {
        let img = InlineImage {
            data: Bytes::from_static(b"abc"),
            mime_type: "image/png".into(),
        };
        let body = request_body("describe", Some(&img));
        let inline = &body["contents"][0]["parts"][1]["inline_data"];
        assert_eq!(inline["mime_type"], "image/png");
        assert_eq!(inline["data"], "YWJj");
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"foo "},{"text":"bar"}]}},
                      {"content":{"parts":[{"text":"ignored"}]}}]}"#;
        assert_eq!(response_text(body).unwrap(), "foo bar");
    }

    #[test]
    fn empty_candidates_is_decode_error() {
        let err = response_text(r#"{"candidates":[]}"#).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn error_envelope_keeps_status_for_classification() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(body), "RESOURCE_EXHAUSTED: Quota exceeded");
        assert_eq!(api_error_message("  upstream exploded "), "upstream exploded");
    }
}
