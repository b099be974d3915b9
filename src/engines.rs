/*!
 * Process-wide inference engines.
 *
 * `Engines` is built once at startup: both engines are constructed from the
 * configuration and provisioned before any text is processed. Adapters then
 * share the engines through `Arc`.
 */

use log::info;
use std::sync::Arc;
use url::Url;

use crate::app_config::{Config, DetectionBackend, DetectionConfig, TranslationConfig, TranslationProvider};
use crate::errors::ModelProvisioningError;
use crate::providers::anthropic::Anthropic;
use crate::providers::exclusive::{ExclusiveDetector, ExclusiveTranslator};
use crate::providers::ollama::Ollama;
use crate::providers::whatlang::WhatlangDetector;
use crate::providers::{DetectionCapability, TranslationCapability};

/// Loaded detection and translation engines
#[derive(Debug, Clone)]
pub struct Engines {
    detector: Arc<dyn DetectionCapability>,
    translator: Arc<dyn TranslationCapability>,
}

impl Engines {
    /// Wrap already constructed engines
    pub fn new(detector: Arc<dyn DetectionCapability>, translator: Arc<dyn TranslationCapability>) -> Self {
        Self { detector, translator }
    }

    /// Build both engines from the configuration and provision them
    pub async fn bootstrap(config: &Config) -> Result<Self, ModelProvisioningError> {
        let engines = Self::new(
            Self::load_detection_model(&config.detection)?,
            Self::load_translation_model(&config.translation)?,
        );
        engines.provision().await?;
        Ok(engines)
    }

    /// Build the detection engine described by the configuration
    pub fn load_detection_model(config: &DetectionConfig) -> Result<Arc<dyn DetectionCapability>, ModelProvisioningError> {
        let detector: Arc<dyn DetectionCapability> = match config.backend {
            DetectionBackend::Whatlang => Arc::new(WhatlangDetector::with_allowlist(&config.allowlist)?),
        };

        if config.serialize_access {
            Ok(Arc::new(ExclusiveDetector::new(detector)))
        } else {
            Ok(detector)
        }
    }

    /// Build the translation engine described by the configuration
    pub fn load_translation_model(
        config: &TranslationConfig,
    ) -> Result<Arc<dyn TranslationCapability>, ModelProvisioningError> {
        let common = &config.common;
        let model = config.get_model();

        let translator: Arc<dyn TranslationCapability> = match config.provider {
            TranslationProvider::Ollama => {
                let (host, port) = parse_endpoint(&config.get_endpoint())?;
                Arc::new(
                    Ollama::new(host, port, model)
                        .timeout(config.get_timeout_secs())
                        .retries(common.retry_count, common.retry_backoff_ms)
                        .prompt(common.system_prompt.clone(), common.temperature),
                )
            }
            TranslationProvider::Anthropic => {
                let api_key = config.get_api_key();
                if api_key.is_empty() {
                    return Err(ModelProvisioningError::InvalidConfiguration(
                        "Translation API key is required for Anthropic provider".to_string(),
                    ));
                }
                Arc::new(
                    Anthropic::new(api_key, config.get_endpoint(), model)
                        .timeout(config.get_timeout_secs())
                        .prompt(common.system_prompt.clone(), common.temperature)
                        .max_tokens(common.max_tokens),
                )
            }
        };

        if config.serialize_access {
            Ok(Arc::new(ExclusiveTranslator::new(translator)))
        } else {
            Ok(translator)
        }
    }

    /// Make sure both engines have their models; idempotent
    pub async fn provision(&self) -> Result<(), ModelProvisioningError> {
        self.detector.ensure_available().await?;
        info!("Detection engine ready: {}", self.detector.name());
        self.translator.ensure_available().await?;
        info!("Translation engine ready: {}", self.translator.name());
        Ok(())
    }

    pub fn detector(&self) -> Arc<dyn DetectionCapability> {
        Arc::clone(&self.detector)
    }

    pub fn translator(&self) -> Arc<dyn TranslationCapability> {
        Arc::clone(&self.translator)
    }
}

/// Split an endpoint into `scheme://host` and port
fn parse_endpoint(endpoint: &str) -> Result<(String, u16), ModelProvisioningError> {
    let invalid = |message: String| ModelProvisioningError::InvalidConfiguration(message);

    if endpoint.trim().is_empty() {
        return Err(invalid("Endpoint cannot be empty".to_string()));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)
    } else {
        Url::parse(&format!("http://{}", endpoint))
    }
    .map_err(|e| invalid(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| invalid(format!("Invalid host in endpoint: {}", endpoint)))?;
    let port = url.port_or_known_default().unwrap_or(80);

    Ok((format!("{}://{}", url.scheme(), host), port))
}
