/*!
 * Validation module for raw input text.
 *
 * Text is checked before it reaches the inference engines:
 * - Word length bounds (characters per word)
 * - Sentence length bounds (words per sentence, words per text)
 */

pub mod text;

// Re-export main types
pub use text::{TextValidator, TextValidatorConfig, ValidationOutcome, split_sentences};
