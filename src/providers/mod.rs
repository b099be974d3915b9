/*!
 * Inference engines for language detection and translation.
 *
 * This module defines the two capabilities the pipeline depends on and
 * contains their implementations:
 * - Whatlang: embedded trigram language detector
 * - Ollama: local LLM server used for translation
 * - Anthropic: Anthropic API used for translation
 * - Mock: scripted engines for tests and benchmarks
 * - Exclusive: lock wrappers for engines that are not reentrant
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::{ModelProvisioningError, ProviderError};

/// Raw answer of a detection engine, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Label as emitted by the engine (e.g. `fr`, `fra`, `__label__fr`)
    pub label: String,
    /// Probability attached to the label
    pub probability: f64,
}

impl RawDetection {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Language identification capability
///
/// Implementations must be safe to share between requests; engines that are
/// not reentrant are wrapped in `exclusive::ExclusiveDetector`.
#[async_trait]
pub trait DetectionCapability: Send + Sync + Debug {
    /// Classify the language of `text`
    async fn detect(&self, text: &str) -> Result<RawDetection, ProviderError>;

    /// Make sure the model behind this engine is present and loadable
    async fn ensure_available(&self) -> Result<(), ModelProvisioningError>;

    /// Engine name for logs
    fn name(&self) -> &str;
}

/// Translation-to-English capability
#[async_trait]
pub trait TranslationCapability: Send + Sync + Debug {
    /// Translate `text` into English
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source_language` - Detected language of `text`, when known
    async fn translate(&self, text: &str, source_language: Option<&str>) -> Result<String, ProviderError>;

    /// Make sure the model behind this engine is present and loadable
    async fn ensure_available(&self) -> Result<(), ModelProvisioningError>;

    /// Engine name for logs
    fn name(&self) -> &str;
}

/// Build the system prompt for an LLM translation engine
///
/// Placeholders: `{source_language}`
pub fn render_system_prompt(template: &str, source_language: Option<&str>) -> String {
    let source_name = source_language
        .and_then(|code| crate::language_utils::get_language_name(code).ok())
        .unwrap_or_else(|| "the source language".to_string());

    template.replace("{source_language}", &source_name)
}

pub mod anthropic;
pub mod exclusive;
pub mod mock;
pub mod ollama;
pub mod whatlang;
