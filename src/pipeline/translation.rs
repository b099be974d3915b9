use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::TranslationError;
use crate::language_utils::language_codes_match;
use crate::pipeline::detection::round_millis;
use crate::providers::TranslationCapability;

/// Outcome of one translation into English
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub english_text: String,
    /// Wall-clock time spent in the engine
    pub elapsed_millis: f64,
}

/// Response body of a single-text translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translation: String,
    pub time_spent: f64,
}

impl From<&TranslationResult> for TranslationResponse {
    fn from(result: &TranslationResult) -> Self {
        Self {
            translation: result.english_text.clone(),
            time_spent: round_millis(result.elapsed_millis),
        }
    }
}

/// Wraps a translation engine; the target language is always English
#[derive(Debug, Clone)]
pub struct TranslationAdapter {
    translator: Arc<dyn TranslationCapability>,
    /// Source languages accepted by `translate_from` (empty = all)
    supported_source_languages: Vec<String>,
}

impl TranslationAdapter {
    pub fn new(translator: Arc<dyn TranslationCapability>) -> Self {
        Self {
            translator,
            supported_source_languages: Vec::new(),
        }
    }

    /// Restrict the source languages `translate_from` accepts
    pub fn with_supported_source_languages(mut self, languages: Vec<String>) -> Self {
        self.supported_source_languages = languages;
        self
    }

    /// Name of the underlying engine
    pub fn engine_name(&self) -> &str {
        self.translator.name()
    }

    /// Translate `text` into English, letting the engine infer the source language
    pub async fn translate(&self, text: &str) -> Result<TranslationResult, TranslationError> {
        self.run(text, None).await
    }

    /// Translate `text` into English from a known source language
    pub async fn translate_from(&self, text: &str, source_language: &str) -> Result<TranslationResult, TranslationError> {
        if !self.supports(source_language) {
            return Err(TranslationError::UnsupportedSourceLanguage(source_language.to_string()));
        }
        self.run(text, Some(source_language)).await
    }

    /// Whether `source_language` passes the configured allowlist
    pub fn supports(&self, source_language: &str) -> bool {
        self.supported_source_languages.is_empty()
            || self.supported_source_languages.iter().any(|code| {
                language_codes_match(code, source_language) || code.eq_ignore_ascii_case(source_language)
            })
    }

    async fn run(&self, text: &str, source_language: Option<&str>) -> Result<TranslationResult, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let start = Instant::now();
        let english_text = self.translator.translate(text, source_language).await?;
        let elapsed_millis = start.elapsed().as_secs_f64() * 1000.0;

        if english_text.trim().is_empty() {
            return Err(TranslationError::EmptyOutput);
        }

        debug!(
            "{} translated {} chars from {} in {:.2}ms",
            self.translator.name(),
            text.chars().count(),
            source_language.unwrap_or("auto"),
            elapsed_millis
        );

        Ok(TranslationResult {
            english_text,
            elapsed_millis,
        })
    }
}
