//! AI-backed record synthesis: schema-constrained Gemini requests and
//! validation of their untrusted responses.

/// Label-photo identification and free-text research client.
pub mod client;
/// Data URL parsing and encoding for label photos.
pub mod image;
/// Boundary validation of model output and grounding metadata.
pub mod response;
/// Fixed output schema and request bodies.
pub mod schema;
/// HTTP seam to the generative-AI service.
pub mod transport;

use crate::config::API_KEY_ENV;

/// Synthesis failures.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// No API key configured; nothing was sent.
    #[error("no API key configured; set {variable}")]
    CredentialMissing {
        /// Configuration variable the key is read from.
        variable: &'static str,
    },
    /// Transport failure or non-success HTTP status.
    #[error("AI service request failed: {message}")]
    Service {
        /// HTTP status, when the service answered.
        status: Option<u16>,
        /// Failure detail.
        message: String,
    },
    /// Model output did not match the wine schema.
    #[error("AI response could not be parsed: {0}")]
    Parse(String),
    /// Image input is not a usable data URL.
    #[error("invalid label image: {0}")]
    InvalidImage(String),
    /// Research query was blank.
    #[error("search query is empty")]
    EmptyQuery,
}

/// Which synthesis path a request took; picks the user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Label photo identification.
    Image,
    /// Free-text research.
    Research,
}

impl RequestKind {
    /// Short label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Image => "image",
            RequestKind::Research => "research",
        }
    }
}

impl SynthesisError {
    /// Missing-credential error naming the expected variable.
    pub fn credential_missing() -> Self {
        Self::CredentialMissing {
            variable: API_KEY_ENV,
        }
    }

    /// True for schema/parse failures, as opposed to service failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, SynthesisError::Parse(_))
    }

    /// Notice suitable for showing to the user.
    pub fn user_message(&self, kind: RequestKind) -> String {
        match self {
            SynthesisError::CredentialMissing { variable } => {
                format!("Set {variable} (or api_key in the config file) before identifying wines.")
            }
            SynthesisError::InvalidImage(_) => {
                "That file is not a readable image. Try another photo.".to_string()
            }
            SynthesisError::EmptyQuery => "Enter a wine to search for.".to_string(),
            SynthesisError::Service { .. } | SynthesisError::Parse(_) => match kind {
                RequestKind::Image => {
                    "Could not identify this label. Try a manual search or a clearer photo."
                        .to_string()
                }
                RequestKind::Research => {
                    "Search failed. Check your network or try different keywords.".to_string()
                }
            },
        }
    }
}
