use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pipeline::detection::{LanguageDetectionAdapter, format_accuracy};
use crate::pipeline::translation::TranslationAdapter;
use crate::validation::TextValidator;

/// One unit of text to process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextInput(String);

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Pipeline stage a row failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Validation,
    Detection,
    Translation,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Validation => write!(f, "validation"),
            FailureStage::Detection => write!(f, "detection"),
            FailureStage::Translation => write!(f, "translation"),
        }
    }
}

/// A row that made it through every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSuccess {
    #[serde(rename = "News_Title")]
    pub original_text: String,
    #[serde(rename = "Detected_Language")]
    pub detected_language: String,
    /// Detection confidence as a percentage string (`99.12%`)
    #[serde(rename = "Accuracy")]
    pub accuracy: String,
    #[serde(rename = "English Translation")]
    pub translated_text: String,
}

/// A row rejected by one of the stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    #[serde(rename = "News_Title")]
    pub original_text: String,
    #[serde(rename = "Error")]
    pub error_reason: String,
    #[serde(rename = "Stage")]
    pub stage: FailureStage,
}

/// Result for one input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessedRow {
    Success(RowSuccess),
    Failure(RowFailure),
}

impl ProcessedRow {
    fn failure(original_text: &str, stage: FailureStage, reason: impl Into<String>) -> Self {
        ProcessedRow::Failure(RowFailure {
            original_text: original_text.to_string(),
            error_reason: reason.into(),
            stage,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProcessedRow::Success(_))
    }

    pub fn original_text(&self) -> &str {
        match self {
            ProcessedRow::Success(row) => &row.original_text,
            ProcessedRow::Failure(row) => &row.original_text,
        }
    }
}

/// Validate, detect and translate a single text
///
/// Stages run in order and the first failing stage decides the row's
/// outcome. No error escapes: every input yields exactly one `ProcessedRow`.
#[derive(Debug, Clone)]
pub struct RowPipeline {
    validator: TextValidator,
    detection: LanguageDetectionAdapter,
    translation: TranslationAdapter,
}

impl RowPipeline {
    pub fn new(validator: TextValidator, detection: LanguageDetectionAdapter, translation: TranslationAdapter) -> Self {
        Self {
            validator,
            detection,
            translation,
        }
    }

    pub fn validator(&self) -> &TextValidator {
        &self.validator
    }

    pub fn detection(&self) -> &LanguageDetectionAdapter {
        &self.detection
    }

    pub fn translation(&self) -> &TranslationAdapter {
        &self.translation
    }

    /// Process one row
    pub async fn process(&self, input: &TextInput) -> ProcessedRow {
        let text = input.as_str();

        if let Err(failure) = self.validator.validate(text) {
            debug!("Row rejected by validation: {}", failure);
            return ProcessedRow::failure(text, FailureStage::Validation, failure.message);
        }

        let detection = match self.detection.detect(text).await {
            Ok(detection) => detection,
            Err(e) => {
                warn!("Language detection failed for row: {}", e);
                return ProcessedRow::failure(text, FailureStage::Detection, e.to_string());
            }
        };

        let translation = match self.translation.translate_from(text, &detection.language_code).await {
            Ok(translation) => translation,
            Err(e) => {
                warn!("Translation failed for row ({}): {}", detection.language_code, e);
                return ProcessedRow::failure(text, FailureStage::Translation, e.to_string());
            }
        };

        ProcessedRow::Success(RowSuccess {
            original_text: text.to_string(),
            accuracy: format_accuracy(detection.confidence_score),
            detected_language: detection.language_code,
            translated_text: translation.english_text,
        })
    }
}
