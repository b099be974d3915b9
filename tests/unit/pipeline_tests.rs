/*!
 * Tests for the detection and translation adapters, the row pipeline and the batch processor
 */

use std::sync::Arc;

use langbridge::errors::{DetectionError, TranslationError};
use langbridge::pipeline::{
    BatchProcessor, DetectionResponse, FailureStage, LanguageDetectionAdapter, ProcessedRow, RowPipeline,
    TextInput, TranslationAdapter, format_accuracy,
};
use langbridge::providers::mock::{MockDetector, MockTranslator};
use langbridge::validation::TextValidator;

use crate::common::mock_providers::{FRENCH_TITLE, SPANISH_TITLE, news_detector, news_translator};

fn pipeline(validator: TextValidator, detector: &MockDetector, translator: &MockTranslator) -> RowPipeline {
    RowPipeline::new(
        validator,
        LanguageDetectionAdapter::new(Arc::new(detector.clone())),
        TranslationAdapter::new(Arc::new(translator.clone())),
    )
}

fn lenient_validator() -> TextValidator {
    TextValidator::new().sentence_lengths(2, 5000)
}

#[test]
fn test_format_accuracy_shouldUseTwoDecimals() {
    assert_eq!(format_accuracy(0.9912), "99.12%");
    assert_eq!(format_accuracy(1.0), "100.00%");
    assert_eq!(format_accuracy(0.0), "0.00%");
}

#[tokio::test]
async fn test_detect_withScriptedFrench_shouldReturnCodeAndConfidence() {
    let detector = news_detector();
    let adapter = LanguageDetectionAdapter::new(Arc::new(detector.clone()));

    let result = adapter.detect(FRENCH_TITLE).await.unwrap();

    assert_eq!(result.language_code, "fr");
    assert!((result.confidence_score - 0.9912).abs() < f64::EPSILON);
    assert_eq!(result.accuracy(), "99.12%");
    assert!(result.elapsed_millis >= 0.0);

    let response = DetectionResponse::from(&result);
    assert_eq!(response.language, "fr");
    assert_eq!(response.accuracy, "99.12%");
}

#[tokio::test]
async fn test_detect_withSameTextTwice_shouldCallEngineTwice() {
    let detector = news_detector();
    let adapter = LanguageDetectionAdapter::new(Arc::new(detector.clone()));

    let first = adapter.detect(SPANISH_TITLE).await.unwrap();
    let second = adapter.detect(SPANISH_TITLE).await.unwrap();

    assert_eq!(first.language_code, second.language_code);
    assert_eq!(first.confidence_score, second.confidence_score);
    assert_eq!(detector.call_count(), 2);
}

#[tokio::test]
async fn test_detect_withEngineErrors_shouldMapToDetectionErrors() {
    let adapter = LanguageDetectionAdapter::new(Arc::new(MockDetector::unavailable()));
    assert!(matches!(
        adapter.detect(FRENCH_TITLE).await,
        Err(DetectionError::ModelUnavailable(_))
    ));

    let adapter = LanguageDetectionAdapter::new(Arc::new(MockDetector::fixed("fr", 1.5)));
    assert!(matches!(
        adapter.detect(FRENCH_TITLE).await,
        Err(DetectionError::InvalidOutput(_))
    ));

    let detector = MockDetector::fixed("fr", 0.9);
    let adapter = LanguageDetectionAdapter::new(Arc::new(detector.clone()));
    assert!(matches!(adapter.detect("  ").await, Err(DetectionError::EmptyInput)));
    assert_eq!(detector.call_count(), 0);
}

#[tokio::test]
async fn test_translate_from_withAllowlist_shouldRejectOtherLanguages() {
    let translator = news_translator();
    let adapter = TranslationAdapter::new(Arc::new(translator.clone()))
        .with_supported_source_languages(vec!["fr".to_string()]);

    let result = adapter.translate_from(FRENCH_TITLE, "fra").await.unwrap();
    assert_eq!(result.english_text, "Hello everyone");

    let error = adapter.translate_from(SPANISH_TITLE, "es").await.unwrap_err();
    assert!(matches!(error, TranslationError::UnsupportedSourceLanguage(code) if code == "es"));
    assert_eq!(translator.call_count(), 1);
}

#[tokio::test]
async fn test_translate_withoutSourceLanguage_shouldPassNoHint() {
    let translator = news_translator();
    let adapter = TranslationAdapter::new(Arc::new(translator.clone()));

    let result = adapter.translate(SPANISH_TITLE).await.unwrap();

    assert_eq!(result.english_text, "Hello world");
    assert_eq!(translator.requests(), vec![(SPANISH_TITLE.to_string(), None)]);
}

#[tokio::test]
async fn test_translate_withEmptyEngineAnswer_shouldFail() {
    let adapter = TranslationAdapter::new(Arc::new(MockTranslator::empty()));
    assert!(matches!(
        adapter.translate(FRENCH_TITLE).await,
        Err(TranslationError::EmptyOutput)
    ));
}

#[tokio::test]
async fn test_row_process_withFrenchTitle_shouldSucceed() {
    let detector = news_detector();
    let translator = news_translator();

    let row = pipeline(TextValidator::new(), &detector, &translator)
        .process(&TextInput::from(FRENCH_TITLE))
        .await;

    match row {
        ProcessedRow::Success(success) => {
            assert_eq!(success.original_text, FRENCH_TITLE);
            assert_eq!(success.detected_language, "fr");
            assert_eq!(success.accuracy, "99.12%");
            assert_eq!(success.translated_text, "Hello everyone");
        }
        ProcessedRow::Failure(failure) => panic!("Expected success, got {:?}", failure),
    }
    assert_eq!(
        translator.requests(),
        vec![(FRENCH_TITLE.to_string(), Some("fr".to_string()))]
    );
}

#[tokio::test]
async fn test_row_process_withShortTitle_shouldFailValidationWithoutEngineCalls() {
    let detector = news_detector();
    let translator = news_translator();

    let row = pipeline(TextValidator::new(), &detector, &translator)
        .process(&TextInput::from(SPANISH_TITLE))
        .await;

    match row {
        ProcessedRow::Failure(failure) => {
            assert_eq!(failure.stage, FailureStage::Validation);
            assert_eq!(failure.original_text, SPANISH_TITLE);
            assert!(failure.error_reason.contains("minimum length of 3 words"));
        }
        ProcessedRow::Success(_) => panic!("Expected validation failure"),
    }
    assert_eq!(detector.call_count(), 0);
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_row_process_withDetectionFailure_shouldSkipTranslation() {
    let detector = MockDetector::failing();
    let translator = news_translator();

    let row = pipeline(TextValidator::new(), &detector, &translator)
        .process(&TextInput::from(FRENCH_TITLE))
        .await;

    assert!(matches!(row, ProcessedRow::Failure(ref f) if f.stage == FailureStage::Detection));
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_row_process_withTranslationFailure_shouldReportTranslationStage() {
    let detector = news_detector();
    let translator = MockTranslator::failing();

    let row = pipeline(TextValidator::new(), &detector, &translator)
        .process(&TextInput::from(FRENCH_TITLE))
        .await;

    match row {
        ProcessedRow::Failure(failure) => {
            assert_eq!(failure.stage, FailureStage::Translation);
            assert!(failure.error_reason.contains("500"));
        }
        ProcessedRow::Success(_) => panic!("Expected translation failure"),
    }
}

#[tokio::test]
async fn test_processed_row_json_shouldUseTableColumnNames() {
    let detector = news_detector();
    let translator = news_translator();
    let rows_pipeline = pipeline(TextValidator::new(), &detector, &translator);

    let success = rows_pipeline.process(&TextInput::from(FRENCH_TITLE)).await;
    let value = serde_json::to_value(&success).unwrap();
    assert_eq!(value["News_Title"], FRENCH_TITLE);
    assert_eq!(value["Detected_Language"], "fr");
    assert_eq!(value["Accuracy"], "99.12%");
    assert_eq!(value["English Translation"], "Hello everyone");

    let failure = rows_pipeline.process(&TextInput::from("")).await;
    let value = serde_json::to_value(&failure).unwrap();
    assert_eq!(value["News_Title"], "");
    assert_eq!(value["Stage"], "validation");
    assert!(value["Error"].as_str().unwrap().contains("no sentences"));
}

#[tokio::test]
async fn test_batch_process_withMixedRows_shouldKeepOrderAndCounts() {
    let detector = news_detector();
    let translator = news_translator();
    let processor = BatchProcessor::new(pipeline(lenient_validator(), &detector, &translator));

    let rows: Vec<TextInput> = vec![FRENCH_TITLE.into(), "".into(), SPANISH_TITLE.into()];
    let result = processor.process(&rows).await;

    assert_eq!(result.len(), 3);
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failure_count(), 1);

    let originals: Vec<&str> = result.iter().map(ProcessedRow::original_text).collect();
    assert_eq!(originals, vec![FRENCH_TITLE, "", SPANISH_TITLE]);
    assert!(!result.rows()[1].is_success());
}

#[tokio::test]
async fn test_batch_process_withProgress_shouldReportEveryRow() {
    let detector = news_detector();
    let translator = news_translator();
    let processor = BatchProcessor::new(pipeline(lenient_validator(), &detector, &translator));

    let reports = parking_lot::Mutex::new(Vec::new());
    let rows: Vec<TextInput> = vec![FRENCH_TITLE.into(), SPANISH_TITLE.into()];
    processor
        .process_with_progress(&rows, |done, total| reports.lock().push((done, total)))
        .await;

    assert_eq!(reports.into_inner(), vec![(1, 2), (2, 2)]);
}

#[tokio::test]
async fn test_batch_process_withConcurrencyLimit_shouldNotExceedIt() {
    let detector = MockDetector::fixed("fr", 0.9);
    let translator = MockTranslator::working().with_delay(20);
    let processor =
        BatchProcessor::new(pipeline(TextValidator::new(), &detector, &translator)).with_concurrency(2);

    let rows: Vec<TextInput> = (0..6)
        .map(|i| TextInput::new(format!("Titre numéro {} du jour", i)))
        .collect();
    let result = processor.process(&rows).await;

    assert_eq!(result.success_count(), 6);
    assert!(translator.max_in_flight() <= 2);
    for (i, row) in result.iter().enumerate() {
        assert_eq!(row.original_text(), format!("Titre numéro {} du jour", i));
    }
}
