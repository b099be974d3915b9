/*!
 * Text processing pipeline.
 *
 * - `detection`: language detection adapter and its result types
 * - `translation`: translation-to-English adapter and its result types
 * - `row`: validate → detect → translate for one text
 * - `batch`: ordered processing of whole tables
 */

pub mod batch;
pub mod detection;
pub mod row;
pub mod translation;

// Re-export main types
pub use batch::{BatchProcessor, BatchResult};
pub use detection::{DetectionResponse, DetectionResult, LanguageDetectionAdapter, format_accuracy};
pub use row::{FailureStage, ProcessedRow, RowFailure, RowPipeline, RowSuccess, TextInput};
pub use translation::{TranslationAdapter, TranslationResponse, TranslationResult};
