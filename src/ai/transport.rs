use async_trait::async_trait;
use bytes::Bytes;

/// Substrings that mark a failure as capacity or quota related.
const TRANSIENT_MARKERS: &[&str] = &[
    "overloaded",
    "quota",
    "rate limit",
    "resource_exhausted",
    "too many requests",
    "unavailable",
    "[429]",
    "[503]",
];

/// Image sent inline with a prompt.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub data: Bytes,
    pub mime_type: String,
}

/// Failure of a single generation call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The service answered with a non-2xx status.
    #[error("[{status}] {message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Capacity-exceeded and rate-limit failures are worth retrying with
    /// another credential; anything else is not.
    pub fn is_transient(&self) -> bool {
        let description = self.to_string().to_lowercase();
        TRANSIENT_MARKERS.iter().any(|m| description.contains(m))
    }
}

/// One call against a text/image generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, TransportError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> TransportError {
        TransportError::Api {
            status,
            message: message.into(),
        }
    }

    #[test]
    fn capacity_and_quota_failures_are_transient() {
        assert!(api(503, "The model is overloaded").is_transient());
        assert!(api(429, "RESOURCE_EXHAUSTED: Quota exceeded for metric").is_transient());
        assert!(api(429, "anything").is_transient());
        assert!(api(500, "You exceeded your current quota").is_transient());
    }

    #[test]
    fn structural_failures_are_not_transient() {
        assert!(!api(400, "API key not valid").is_transient());
        assert!(!api(404, "models/foo is not found").is_transient());
        assert!(!TransportError::Decode("no candidates".into()).is_transient());
    }
}
