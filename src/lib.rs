/*!
 * # langbridge - language detection and English translation
 *
 * A Rust library that validates free text, detects its language and
 * translates it to English, one text at a time or for every row of a table.
 *
 * ## Features
 *
 * - Word-length and sentence-length validation of raw text
 * - Language detection with an embedded trigram model (whatlang)
 * - Translation to English using LLM providers:
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Table processing with per-row error isolation and ordered results
 * - CSV/TSV reading with encoding and delimiter detection
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `validation`: Text validation rules
 * - `pipeline`: The processing core:
 *   - `pipeline::detection`: Language detection adapter
 *   - `pipeline::translation`: Translation adapter
 *   - `pipeline::row`: Per-row validate → detect → translate
 *   - `pipeline::batch`: Ordered processing of whole tables
 * - `providers`: Engine capabilities and their implementations
 * - `engines`: Startup construction and provisioning of the engines
 * - `table`: Reading uploaded tables into rows
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod engines;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod table;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use engines::Engines;
pub use errors::{
    AppError, DetectionError, InputStructureError, ModelProvisioningError, ProviderError, TranslationError,
    ValidationFailure,
};
pub use language_utils::{get_language_name, language_codes_match, normalize_detection_label, normalize_to_part2t};
pub use pipeline::{
    BatchProcessor, BatchResult, DetectionResult, LanguageDetectionAdapter, ProcessedRow, RowPipeline, TextInput,
    TranslationAdapter, TranslationResult,
};
pub use validation::{TextValidator, ValidationOutcome};
