/*!
 * Error types for the langbridge library.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Row-scoped errors (`ValidationFailure`, `DetectionError`, `TranslationError`)
 * are turned into failure rows by the row pipeline. Structural errors
 * (`InputStructureError`) and provisioning errors (`ModelProvisioningError`)
 * propagate to the caller unmodified.
 */

use thiserror::Error;

/// Errors that can occur when talking to an inference engine
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The engine has no loaded model to serve the request
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    /// The engine cannot handle the requested language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// A text rejected by the word-length or sentence-length rules
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationFailure {
    /// Human-readable description of the violated rule
    pub message: String,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Errors that can occur during language detection
#[derive(Error, Debug)]
pub enum DetectionError {
    /// The detection engine is not available
    #[error("Detection model unavailable: {0}")]
    ModelUnavailable(String),

    /// Nothing to detect
    #[error("Cannot detect the language of empty text")]
    EmptyInput,

    /// The engine failed while classifying the text
    #[error("Language detection failed: {0}")]
    InferenceFailed(String),

    /// The engine answered with something that is not a usable label/probability
    #[error("Detection engine returned an invalid result: {0}")]
    InvalidOutput(String),
}

impl From<ProviderError> for DetectionError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::ModelNotLoaded(msg) | ProviderError::ConnectionError(msg) => {
                Self::ModelUnavailable(msg)
            }
            ProviderError::ParseError(msg) => Self::InvalidOutput(msg),
            other => Self::InferenceFailed(other.to_string()),
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The translation engine is not available
    #[error("Translation model unavailable: {0}")]
    ModelUnavailable(String),

    /// The detected source language cannot be translated
    #[error("Unsupported source language: {0}")]
    UnsupportedSourceLanguage(String),

    /// Nothing to translate
    #[error("Cannot translate empty text")]
    EmptyInput,

    /// The engine answered with an empty translation
    #[error("Translation engine returned an empty translation")]
    EmptyOutput,

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(ProviderError),
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::ModelNotLoaded(msg) | ProviderError::ConnectionError(msg) => {
                Self::ModelUnavailable(msg)
            }
            ProviderError::UnsupportedLanguage(code) => Self::UnsupportedSourceLanguage(code),
            other => Self::Provider(other),
        }
    }
}

/// Errors raised while obtaining or loading an inference model at startup
#[derive(Error, Debug)]
pub enum ModelProvisioningError {
    /// The model source could not be reached
    #[error("Model source unreachable for '{model}': {message}")]
    Unreachable {
        /// Model that was being provisioned
        model: String,
        /// Underlying failure
        message: String,
    },

    /// The model could not be fetched or is unknown to the source
    #[error("Model '{model}' could not be obtained: {message}")]
    Unavailable {
        /// Model that was being provisioned
        model: String,
        /// Underlying failure
        message: String,
    },

    /// The engine configuration is unusable
    #[error("Invalid engine configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors for an uploaded table that cannot be turned into rows at all
#[derive(Error, Debug)]
pub enum InputStructureError {
    /// Failed to read the upload
    #[error("Failed to read table: {0}")]
    Io(#[from] std::io::Error),

    /// The upload has no content
    #[error("Table is empty")]
    Empty,

    /// The first record (the header) is missing or has no columns
    #[error("No header row found in table")]
    NoHeader,

    /// A record could not be parsed
    #[error("Malformed table at line {line}: {message}")]
    Malformed {
        /// 1-based line number of the offending record
        line: u64,
        /// Parser message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Text rejected by validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Error from language detection
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error while provisioning the engines
    #[error("Provisioning error: {0}")]
    Provisioning(#[from] ModelProvisioningError),

    /// The uploaded table is unusable
    #[error("Input error: {0}")]
    InputStructure(#[from] InputStructureError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
