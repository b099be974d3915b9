/*!
 * Word-length and sentence-length rules for raw input text.
 *
 * - Words are whitespace-separated tokens; their length is counted in characters
 * - Sentences end at `.`, `!` or `?`; a run of terminators closes one sentence
 * - Text without any terminator is a single sentence
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationFailure;

/// Default minimum word length in characters
const DEFAULT_MIN_WORD_LENGTH: usize = 1;

/// Default maximum word length in characters (longest attested word, Greek)
const DEFAULT_MAX_WORD_LENGTH: usize = 45;

/// Default minimum number of words per sentence
const DEFAULT_MIN_SENTENCE_LENGTH: usize = 3;

/// Default maximum number of words per sentence
const DEFAULT_MAX_SENTENCE_LENGTH: usize = 5000;

/// Default maximum number of words in the whole text
const DEFAULT_MAX_TOTAL_WORDS: usize = 5000;

static SENTENCE_TERMINATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?]+").expect("Invalid sentence terminator regex")
});

/// Outcome of one validation rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// Whether the rule passed
    pub valid: bool,
    /// Success confirmation or description of the violation
    pub message: String,
}

impl ValidationOutcome {
    /// Create a passing outcome
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    /// Create a failing outcome
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    /// Convert into a `Result`, keeping the message on both sides
    pub fn into_result(self) -> Result<String, ValidationFailure> {
        if self.valid {
            Ok(self.message)
        } else {
            Err(ValidationFailure::new(self.message))
        }
    }
}

/// Bounds applied by the text validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValidatorConfig {
    /// Minimum word length in characters
    #[serde(default = "default_min_word_length")]
    pub min_word_length: usize,

    /// Maximum word length in characters
    #[serde(default = "default_max_word_length")]
    pub max_word_length: usize,

    /// Minimum number of words in each sentence
    #[serde(default = "default_min_sentence_length")]
    pub min_sentence_length: usize,

    /// Maximum number of words in each sentence
    #[serde(default = "default_max_sentence_length")]
    pub max_sentence_length: usize,

    /// Maximum number of words in the whole text
    #[serde(default = "default_max_total_words")]
    pub max_total_words: usize,

    /// Whether the single-text operations validate before calling the engines
    #[serde(default)]
    pub gate_single_text: bool,
}

impl Default for TextValidatorConfig {
    fn default() -> Self {
        Self {
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            max_word_length: DEFAULT_MAX_WORD_LENGTH,
            min_sentence_length: DEFAULT_MIN_SENTENCE_LENGTH,
            max_sentence_length: DEFAULT_MAX_SENTENCE_LENGTH,
            max_total_words: DEFAULT_MAX_TOTAL_WORDS,
            gate_single_text: false,
        }
    }
}

fn default_min_word_length() -> usize {
    DEFAULT_MIN_WORD_LENGTH
}

fn default_max_word_length() -> usize {
    DEFAULT_MAX_WORD_LENGTH
}

fn default_min_sentence_length() -> usize {
    DEFAULT_MIN_SENTENCE_LENGTH
}

fn default_max_sentence_length() -> usize {
    DEFAULT_MAX_SENTENCE_LENGTH
}

fn default_max_total_words() -> usize {
    DEFAULT_MAX_TOTAL_WORDS
}

/// Rule engine for word and sentence length bounds
#[derive(Debug, Clone, Default)]
pub struct TextValidator {
    config: TextValidatorConfig,
}

impl TextValidator {
    /// Create a new validator with default bounds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new validator with custom bounds
    pub fn with_config(config: TextValidatorConfig) -> Self {
        Self { config }
    }

    /// Override the word length bounds
    pub fn word_lengths(mut self, min_len: usize, max_len: usize) -> Self {
        self.config.min_word_length = min_len;
        self.config.max_word_length = max_len;
        self
    }

    /// Override the sentence length bounds
    pub fn sentence_lengths(mut self, min_sentence_length: usize, max_sentence_length: usize) -> Self {
        self.config.min_sentence_length = min_sentence_length;
        self.config.max_sentence_length = max_sentence_length;
        self
    }

    /// Active bounds
    pub fn config(&self) -> &TextValidatorConfig {
        &self.config
    }

    /// Check that every word is within the word length bounds
    pub fn validate_word_lengths(&self, text: &str) -> ValidationOutcome {
        let min_len = self.config.min_word_length;
        let max_len = self.config.max_word_length;

        for word in text.split_whitespace() {
            let len = word.chars().count();
            if len < min_len {
                return ValidationOutcome::failed(format!(
                    "Word '{}' is shorter than the minimum length of {}.",
                    word, min_len
                ));
            }
            if len > max_len {
                return ValidationOutcome::failed(format!(
                    "Word '{}' is longer than the maximum length of {}.",
                    word, max_len
                ));
            }
        }

        ValidationOutcome::passed("All words meet the length criteria.")
    }

    /// Check the total word count and the word count of every sentence
    pub fn validate_sentence_length(&self, text: &str) -> ValidationOutcome {
        let min_len = self.config.min_sentence_length;
        let max_len = self.config.max_sentence_length;

        let total_words = text.split_whitespace().count();
        if total_words > self.config.max_total_words {
            return ValidationOutcome::failed(format!(
                "Paragraph exceeds the maximum length of {} words.",
                self.config.max_total_words
            ));
        }

        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return ValidationOutcome::failed(format!(
                "Text contains no sentences; the minimum sentence length is {} words.",
                min_len
            ));
        }

        for (index, sentence) in sentences.iter().enumerate() {
            let count = sentence.split_whitespace().count();
            if count < min_len {
                return ValidationOutcome::failed(format!(
                    "Sentence {} has {} words, below the minimum length of {} words.",
                    index + 1,
                    count,
                    min_len
                ));
            }
            if count > max_len {
                return ValidationOutcome::failed(format!(
                    "Sentence {} has {} words, exceeding the maximum length of {} words.",
                    index + 1,
                    count,
                    max_len
                ));
            }
        }

        ValidationOutcome::passed("All sentences meet the length criteria.")
    }

    /// Run the word-length rule, then the sentence-length rule
    pub fn validate(&self, text: &str) -> Result<(), ValidationFailure> {
        self.validate_word_lengths(text).into_result()?;
        self.validate_sentence_length(text).into_result()?;
        debug!("Text passed validation ({} chars)", text.chars().count());
        Ok(())
    }
}

/// Split text into non-empty sentences
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_TERMINATORS
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
