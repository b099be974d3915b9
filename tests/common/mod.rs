/*!
 * Common test utilities for the langbridge test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use langbridge::app_config::Config;
use langbridge::app_controller::Controller;
use langbridge::engines::Engines;
use langbridge::providers::mock::{MockDetector, MockTranslator};

// Re-export the scripted engines
pub mod mock_providers;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates the two-row news table used across the suite
pub fn create_news_table(dir: &Path) -> Result<PathBuf> {
    create_test_file(dir, "news.csv", mock_providers::NEWS_TABLE.as_bytes())
}

/// Builds a controller around the given engines without touching the network
pub fn controller_with(config: Config, detector: &MockDetector, translator: &MockTranslator) -> Controller {
    let engines = Engines::new(Arc::new(detector.clone()), Arc::new(translator.clone()));
    Controller::with_engines(config, engines)
}

/// Configuration accepting two-word sentences such as "Hola mundo"
pub fn lenient_config() -> Config {
    let mut config = Config::default();
    config.validation.min_sentence_length = 2;
    config
}

/// Enables test logging once; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
