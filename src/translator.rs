//! Translation providers.
//!
//! A [`Translator`] turns one source text into raw model output. Cleaning that
//! output is left to [`crate::normalize`].

/// OpenAI-compatible chat completions client
mod openai;
/// Prompt text sent to the model
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiTranslator;

/// One text to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
    /// Developer comment from the catalog, if any.
    pub context: Option<&'a str>,
}

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Request to the translation provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Translation provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Translation provider returned no content")]
    EmptyResponse,

    #[error("Could not decode the translation provider response: {0}")]
    InvalidResponse(#[source] serde_json::Error),
}

/// Translates a single text.
///
/// Implementations return the model output as-is; it may still carry
/// boundary sentinels, quotes or a lead-in phrase.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest<'_>) -> Result<String, TranslationError>;
}
