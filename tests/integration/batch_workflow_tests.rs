/*!
 * End-to-end table processing through the controller with scripted engines
 */

use anyhow::Result;
use langbridge::app_config::Config;
use langbridge::errors::{AppError, InputStructureError};
use langbridge::file_utils::FileManager;
use langbridge::pipeline::{FailureStage, ProcessedRow, TextInput};
use langbridge::providers::mock::{MockDetector, MockTranslator};

use crate::common::{self, mock_providers::*};

fn success(row: &ProcessedRow) -> &langbridge::pipeline::RowSuccess {
    match row {
        ProcessedRow::Success(success) => success,
        ProcessedRow::Failure(failure) => panic!("Expected success, got {:?}", failure),
    }
}

fn failure(row: &ProcessedRow) -> &langbridge::pipeline::RowFailure {
    match row {
        ProcessedRow::Failure(failure) => failure,
        ProcessedRow::Success(success) => panic!("Expected failure, got {:?}", success),
    }
}

#[tokio::test]
async fn test_process_upload_withNewsTable_shouldDetectAndTranslateBothRows() -> Result<()> {
    common::init_logging();
    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(common::lenient_config(), &detector, &translator);

    let result = controller.process_upload(NEWS_TABLE.as_bytes()).await?;

    assert_eq!(result.len(), 2);
    let french = success(&result.rows()[0]);
    assert_eq!(french.original_text, FRENCH_TITLE);
    assert_eq!(french.detected_language, "fr");
    assert_eq!(french.accuracy, "99.12%");
    assert_eq!(french.translated_text, "Hello everyone");

    let spanish = success(&result.rows()[1]);
    assert_eq!(spanish.detected_language, "es");
    assert_eq!(spanish.accuracy, "97.00%");
    assert_eq!(spanish.translated_text, "Hello world");

    assert_eq!(
        translator.requests(),
        vec![
            (FRENCH_TITLE.to_string(), Some("fr".to_string())),
            (SPANISH_TITLE.to_string(), Some("es".to_string())),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_process_upload_withDefaultConfig_shouldRejectTwoWordTitle() -> Result<()> {
    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(Config::default(), &detector, &translator);

    let result = controller.process_upload(NEWS_TABLE.as_bytes()).await?;

    assert!(result.rows()[0].is_success());
    let rejected = failure(&result.rows()[1]);
    assert_eq!(rejected.original_text, SPANISH_TITLE);
    assert_eq!(rejected.stage, FailureStage::Validation);
    assert_eq!(detector.inputs(), vec![FRENCH_TITLE.to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_process_table_withEmptyRow_shouldFailWithoutEngineCalls() {
    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(Config::default(), &detector, &translator);

    let result = controller.process_table(&[TextInput::from("")]).await;

    assert_eq!(result.len(), 1);
    assert_eq!(failure(&result.rows()[0]).stage, FailureStage::Validation);
    assert_eq!(detector.call_count(), 0);
    assert_eq!(translator.call_count(), 0);
}

#[tokio::test]
async fn test_process_table_withNoRows_shouldReturnEmptyResult() {
    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(Config::default(), &detector, &translator);

    let result = controller.process_table(&[]).await;

    assert!(result.is_empty());
    assert_eq!(detector.call_count(), 0);
}

#[tokio::test]
async fn test_process_upload_withHeaderOnly_shouldReturnEmptyResult() -> Result<()> {
    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(Config::default(), &detector, &translator);

    let result = controller.process_upload(b"News_Title\n").await?;

    assert!(result.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_process_upload_withEmptyUpload_shouldReturnInputError() {
    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(Config::default(), &detector, &translator);

    let error = controller.process_upload(b"").await.unwrap_err();

    assert!(matches!(error, AppError::InputStructure(InputStructureError::Empty)));
}

#[tokio::test]
async fn test_process_table_withMixedOutcomes_shouldKeepInputOrder() {
    let detector = news_detector().with_script("Texto que nadie traduce hoy", "es", 0.8);
    let translator = news_translator();
    let mut config = common::lenient_config();
    config.translation.supported_source_languages = vec!["fr".to_string()];
    config.batch.max_concurrent_rows = 3;
    let controller = common::controller_with(config, &detector, &translator);

    let rows: Vec<TextInput> = vec![
        "Texto que nadie traduce hoy".into(),
        FRENCH_TITLE.into(),
        "x".into(),
        "Un autre titre en français".into(),
    ];
    let result = controller.process_table(&rows).await;

    assert_eq!(result.len(), 4);
    assert_eq!(failure(&result.rows()[0]).stage, FailureStage::Translation);
    assert!(failure(&result.rows()[0]).error_reason.contains("es"));
    assert_eq!(success(&result.rows()[1]).translated_text, "Hello everyone");
    assert_eq!(failure(&result.rows()[2]).stage, FailureStage::Validation);
    // Unscripted text falls back to the detector's default answer, which is not allowed here
    assert_eq!(failure(&result.rows()[3]).stage, FailureStage::Translation);
    assert_eq!(result.success_count(), 1);
}

#[tokio::test]
async fn test_process_table_withUnavailableTranslator_shouldFailEveryRowAtTranslation() {
    let detector = news_detector();
    let translator = MockTranslator::unavailable();
    let controller = common::controller_with(common::lenient_config(), &detector, &translator);

    let result = controller
        .process_table(&[FRENCH_TITLE.into(), SPANISH_TITLE.into()])
        .await;

    assert_eq!(result.failure_count(), 2);
    for row in &result {
        let rejected = failure(row);
        assert_eq!(rejected.stage, FailureStage::Translation);
        assert!(rejected.error_reason.contains("unavailable"));
    }
}

#[tokio::test]
async fn test_detect_language_calledTwice_shouldGiveSameAnswer() -> Result<()> {
    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(Config::default(), &detector, &translator);

    let first = controller.detect_language(FRENCH_TITLE).await?;
    let second = controller.detect_language(FRENCH_TITLE).await?;

    assert_eq!(first.language_code, second.language_code);
    assert_eq!(first.accuracy(), second.accuracy());
    assert_eq!(detector.call_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_process_file_withOutputDir_shouldWriteJsonRows() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_news_table(temp_dir.path())?;
    let output_dir = temp_dir.path().join("out");

    let detector = news_detector();
    let translator = news_translator();
    let controller = common::controller_with(common::lenient_config(), &detector, &translator);

    let (result, written) = controller.process_file(&input, Some(&output_dir)).await?;

    assert_eq!(result.success_count(), 2);
    let written = written.expect("output path should be returned");
    assert_eq!(written, output_dir.join("news.translated.json"));

    let json: serde_json::Value = serde_json::from_str(&FileManager::read_to_string(&written)?)?;
    let rows = json.as_array().expect("top-level array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["News_Title"], FRENCH_TITLE);
    assert_eq!(rows[0]["Detected_Language"], "fr");
    assert_eq!(rows[0]["Accuracy"], "99.12%");
    assert_eq!(rows[0]["English Translation"], "Hello everyone");
    assert_eq!(rows[1]["English Translation"], "Hello world");
    Ok(())
}

#[tokio::test]
async fn test_process_file_withoutOutputDir_shouldNotWrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_news_table(temp_dir.path())?;

    let detector = MockDetector::fixed("fr", 0.9);
    let translator = MockTranslator::working();
    let controller = common::controller_with(common::lenient_config(), &detector, &translator);

    let (result, written) = controller.process_file(&input, None).await?;

    assert_eq!(result.len(), 2);
    assert!(written.is_none());
    assert_eq!(success(&result.rows()[1]).translated_text, "[EN] Hola mundo");
    Ok(())
}
