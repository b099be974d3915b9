use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::DetectionError;
use crate::language_utils::normalize_detection_label;
use crate::providers::DetectionCapability;

/// Outcome of one language detection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    /// ISO 639 short code (`fr`, `es`, or a 3-letter code when no 2-letter one exists)
    pub language_code: String,
    /// Probability of the detected language, in [0, 1]
    pub confidence_score: f64,
    /// Wall-clock time spent in the engine
    pub elapsed_millis: f64,
}

impl DetectionResult {
    /// Confidence rendered as a percentage string
    pub fn accuracy(&self) -> String {
        format_accuracy(self.confidence_score)
    }
}

/// Render a probability as a percentage with two decimals (`0.9912` -> `99.12%`)
pub fn format_accuracy(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// Round a duration in milliseconds to two decimals
pub fn round_millis(millis: f64) -> f64 {
    (millis * 100.0).round() / 100.0
}

/// Response body of a single-text detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub language: String,
    pub accuracy: String,
    pub time_spent: f64,
}

impl From<&DetectionResult> for DetectionResponse {
    fn from(result: &DetectionResult) -> Self {
        Self {
            language: result.language_code.clone(),
            accuracy: result.accuracy(),
            time_spent: round_millis(result.elapsed_millis),
        }
    }
}

/// Turns the raw answer of a detection engine into a `DetectionResult`
#[derive(Debug, Clone)]
pub struct LanguageDetectionAdapter {
    detector: Arc<dyn DetectionCapability>,
}

impl LanguageDetectionAdapter {
    pub fn new(detector: Arc<dyn DetectionCapability>) -> Self {
        Self { detector }
    }

    /// Name of the underlying engine
    pub fn engine_name(&self) -> &str {
        self.detector.name()
    }

    /// Detect the language of `text`
    ///
    /// Every call goes to the engine; nothing is cached.
    pub async fn detect(&self, text: &str) -> Result<DetectionResult, DetectionError> {
        if text.trim().is_empty() {
            return Err(DetectionError::EmptyInput);
        }

        let start = Instant::now();
        let raw = self.detector.detect(text).await?;
        let elapsed_millis = start.elapsed().as_secs_f64() * 1000.0;

        let language_code = normalize_detection_label(&raw.label)
            .ok_or_else(|| DetectionError::InvalidOutput("engine returned an empty label".to_string()))?;

        if raw.probability.is_nan() || !(0.0..=1.0).contains(&raw.probability) {
            return Err(DetectionError::InvalidOutput(format!(
                "probability {} for '{}' is outside [0, 1]",
                raw.probability, language_code
            )));
        }

        debug!(
            "{} detected '{}' ({}) in {:.2}ms",
            self.detector.name(),
            language_code,
            format_accuracy(raw.probability),
            elapsed_millis
        );

        Ok(DetectionResult {
            language_code,
            confidence_score: raw.probability,
            elapsed_millis,
        })
    }
}
