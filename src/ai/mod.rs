mod gemini;
pub mod parser;
mod resilience;
pub mod transport;

pub use resilience::{AiClient, AiError, CredentialPool, RetryPolicy};
pub use transport::{GenerativeModel, InlineImage, TransportError};
