//! Key rotation and retry around the generative-AI call.
//!
//! Every attempt takes the next credential from a process-wide round-robin
//! pool. Capacity and quota failures back off exponentially and move on to
//! the next credential; any other failure is returned after one attempt.

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tracing::{debug, error, warn};

use super::{
    gemini::GeminiModel,
    transport::{GenerativeModel, InlineImage, TransportError},
};
use crate::config::AiConfig;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// Every attempt in the budget failed transiently.
    #[error("AI service exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: TransportError },

    /// A failure retrying cannot fix (bad request, bad credentials, network).
    #[error("AI request failed: {0}")]
    Request(TransportError),
}

/// Interchangeable credentials for the same service plus a shared cursor.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>) -> anyhow::Result<Self> {
        anyhow::ensure!(!keys.is_empty(), "credential pool needs at least one key");
        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Slot index and key at the cursor; advances the cursor by one.
    pub fn next(&self) -> (usize, &str) {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        (slot, &self.keys[slot])
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &self.keys.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// `min(base * 2^attempt, max)` for a zero-based attempt number.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

impl From<&AiConfig> for RetryPolicy {
    fn from(cfg: &AiConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            base_delay: cfg.base_delay,
            max_delay: cfg.max_delay,
        }
    }
}

pub struct AiClient {
    model: Arc<dyn GenerativeModel>,
    pool: CredentialPool,
    policy: RetryPolicy,
}

impl AiClient {
    pub fn new(model: Arc<dyn GenerativeModel>, pool: CredentialPool, policy: RetryPolicy) -> Self {
        Self {
            model,
            pool,
            policy,
        }
    }

    pub fn from_config(cfg: &AiConfig) -> anyhow::Result<Self> {
        let model = Arc::new(GeminiModel::new(&cfg.base_url, &cfg.model)?);
        let pool = CredentialPool::new(cfg.api_keys.clone())?;
        Ok(Self::new(model, pool, RetryPolicy::from(cfg)))
    }

    pub fn credential_count(&self) -> usize {
        self.pool.len()
    }

    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, AiError> {
        self.generate_with_attempts(prompt, image, self.policy.max_attempts)
            .await
    }

    pub async fn generate_with_attempts(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
        max_attempts: u32,
    ) -> Result<String, AiError> {
        let budget = max_attempts.max(1);
        let mut last = None;

        for attempt in 0..budget {
            let (slot, key) = self.pool.next();
            match self.model.generate(key, prompt, image).await {
                Ok(text) => {
                    debug!(attempt, slot, "ai call succeeded");
                    return Ok(text);
                }
                Err(e) if e.is_transient() => {
                    if attempt + 1 < budget {
                        let delay = self.policy.delay_for(attempt);
                        warn!(
                            attempt,
                            slot,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "transient ai failure, rotating key"
                        );
                        tokio::time::sleep(delay).await;
                    } else {
                        warn!(attempt, slot, error = %e, "transient ai failure on final attempt");
                    }
                    last = Some(e);
                }
                Err(e) => {
                    error!(attempt, slot, error = %e, "non-transient ai failure");
                    return Err(AiError::Request(e));
                }
            }
        }

        let last = last.unwrap_or_else(|| TransportError::Decode("no attempt was made".into()));
        error!(attempts = budget, error = %last, "ai retry budget exhausted");
        Err(AiError::Exhausted {
            attempts: budget,
            last,
        })
    }
}
