use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::engines::Engines;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::pipeline::{
    BatchProcessor, BatchResult, DetectionResult, LanguageDetectionAdapter, RowPipeline, TextInput,
    TranslationAdapter, TranslationResult,
};
use crate::table;
use crate::validation::TextValidator;

// @module: Application controller for text detection and translation

/// Entry point used by hosts: single-text operations and table processing
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Provisioned engines
    engines: Engines,
    // @field: Row pipeline wrapped in the batch processor
    batch: BatchProcessor,
}

impl Controller {
    /// Validate the configuration, then build and provision the engines
    pub async fn bootstrap(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        info!(
            "Provisioning engines: detection {:?}, translation {} ({})",
            config.detection.backend,
            config.translation.provider.display_name(),
            config.translation.get_model()
        );
        let engines = Engines::bootstrap(&config)
            .await
            .context("Failed to provision inference engines")?;

        Ok(Self::with_engines(config, engines))
    }

    // @method: Create a controller around already provisioned engines
    pub fn with_engines(config: Config, engines: Engines) -> Self {
        let pipeline = RowPipeline::new(
            TextValidator::with_config(config.validation.clone()),
            LanguageDetectionAdapter::new(engines.detector()),
            TranslationAdapter::new(engines.translator())
                .with_supported_source_languages(config.translation.supported_source_languages.clone()),
        );
        let batch = BatchProcessor::new(pipeline).with_concurrency(config.batch.max_concurrent_rows);

        Self { config, engines, batch }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    /// Reject text that fails validation when single-text gating is enabled
    fn gate(&self, text: &str) -> Result<(), AppError> {
        if self.config.validation.gate_single_text {
            self.batch.pipeline().validator().validate(text)?;
        }
        Ok(())
    }

    /// Detect the language of one text
    pub async fn detect_language(&self, text: &str) -> Result<DetectionResult, AppError> {
        self.gate(text)?;
        Ok(self.batch.pipeline().detection().detect(text).await?)
    }

    /// Translate one text into English
    pub async fn translate_text(&self, text: &str) -> Result<TranslationResult, AppError> {
        self.gate(text)?;
        Ok(self.batch.pipeline().translation().translate(text).await?)
    }

    /// Process already parsed rows
    pub async fn process_table(&self, rows: &[TextInput]) -> BatchResult {
        self.batch.process(rows).await
    }

    /// Parse an uploaded table and process its rows
    pub async fn process_upload(&self, bytes: &[u8]) -> Result<BatchResult, AppError> {
        let rows = table::parse_table(bytes)?;
        Ok(self.process_table(&rows).await)
    }

    /// Process a table file with a progress bar, optionally writing the JSON result
    ///
    /// Returns the result and the path it was written to, if any.
    pub async fn process_file(&self, input_file: &Path, output_dir: Option<&Path>) -> Result<(BatchResult, Option<PathBuf>)> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        if !FileManager::is_table_file(input_file) {
            warn!("{:?} does not have a table extension, reading it as CSV anyway", input_file);
        }

        let bytes = FileManager::read_bytes(input_file)?;
        let rows = table::parse_table(&bytes).with_context(|| format!("Failed to read table: {:?}", input_file))?;

        info!(
            "Processing {} rows with {} / {}",
            rows.len(),
            self.engines.detector().name(),
            self.engines.translator().name()
        );

        let progress_bar = ProgressBar::new(rows.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Processing");

        let pb = progress_bar.clone();
        let result = self
            .batch
            .process_with_progress(&rows, move |done, _total| pb.set_position(done as u64))
            .await;
        progress_bar.finish_and_clear();

        let output_path = match output_dir {
            Some(dir) => {
                let path = FileManager::generate_output_path(input_file, dir);
                let json = serde_json::to_string_pretty(&result).context("Failed to serialize batch result")?;
                FileManager::write_to_file(&path, &json)?;
                info!("Success: {}", path.display());
                Some(path)
            }
            None => None,
        };

        info!(
            "{} rows processed ({} failed) in {}",
            result.len(),
            result.failure_count(),
            Self::format_duration(start_time.elapsed())
        );

        Ok((result, output_path))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
