use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{ModelProvisioningError, ProviderError};
use crate::providers::{TranslationCapability, render_system_prompt};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model used for translation
    model: String,
    /// System prompt template for translation
    system_prompt: String,
    /// Temperature for generation
    temperature: f32,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
    /// Total duration of the request in nanoseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
}

/// One locally available model, as listed by `/api/tags`
#[derive(Debug, Deserialize)]
pub struct LocalModel {
    /// Model name including tag (e.g. `llama3.2:3b`)
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<LocalModel>,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error: Option<String>,
}

impl GenerationRequest {
    /// Create a new generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client
    ///
    /// # Arguments
    /// * `host` - Host name, with or without scheme
    /// * `port` - Port appended when `host` carries none
    /// * `model` - Model used for translation
    pub fn new(host: impl Into<String>, port: u16, model: impl Into<String>) -> Self {
        Self {
            base_url: build_base_url(&host.into(), port),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            model: model.into(),
            system_prompt: crate::app_config::default_system_prompt(),
            temperature: 0.0,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout_secs: u64) -> Self {
        self.client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        self
    }

    /// Set the retry policy for failed requests
    pub fn retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Set the system prompt template and temperature
    pub fn prompt(mut self, system_prompt: impl Into<String>, temperature: f32) -> Self {
        self.system_prompt = system_prompt.into();
        self.temperature = temperature;
        self
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let response_text = response
                            .text()
                            .await
                            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
                        return parse_generation(&response_text);
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());

                    if status.as_u16() == 404 {
                        // Ollama answers 404 when the model is not pulled
                        return Err(ProviderError::ModelNotLoaded(error_text));
                    }
                    if !status.is_server_error() {
                        error!("Ollama API error ({}): {}", status, error_text);
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    }

                    error!(
                        "Ollama API error ({}): {} - attempt {}/{}",
                        status,
                        error_text,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message: error_text,
                    });
                }
                Err(e) => {
                    error!(
                        "Ollama API network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;

            if attempt <= self.max_retries {
                tokio::time::sleep(backoff_delay(self.backoff_base_ms, attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }

    /// List the models present on the server
    pub async fn list_models(&self) -> Result<Vec<LocalModel>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(tags.models)
    }

    /// Download a model onto the server
    pub async fn pull_model(&self, model: &str) -> Result<(), ProviderError> {
        let url = format!("{}/api/pull", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PullRequest { model, stream: false })
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        let pull: PullResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        match pull.error {
            Some(message) => Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            }),
            None if pull.status == "success" => Ok(()),
            None => Err(ProviderError::RequestFailed(format!(
                "Unexpected pull status: {}",
                pull.status
            ))),
        }
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        response["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

/// Longest wait between two attempts
const MAX_BACKOFF_MS: u64 = 60_000;

/// Exponential backoff before retry number `attempt` (1-based), capped at `MAX_BACKOFF_MS`
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
}

/// Construct a base URL with scheme and port
fn build_base_url(host: &str, port: u16) -> String {
    match host.split_once("://") {
        Some((scheme, host_part)) if host_part.contains(':') => format!("{}://{}", scheme, host_part),
        Some((scheme, host_part)) => format!("{}://{}:{}", scheme, host_part.trim_end_matches('/'), port),
        None => format!("http://{}:{}", host, port),
    }
}

/// Parse a generate response, tolerating a JSONL stream
fn parse_generation(response_text: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(generated) = serde_json::from_str::<GenerationResponse>(response_text) {
        return Ok(generated);
    }

    // A streamed answer is one JSON object per line; concatenate the pieces
    let mut full_response = String::new();
    let mut model = String::new();
    let mut done = false;
    for line in response_text.lines().filter(|l| !l.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
            let preview: String = response_text.chars().take(500).collect();
            error!("Failed to parse Ollama API response: {}. Raw response: {}", e, preview);
            ProviderError::ParseError(e.to_string())
        })?;
        if let Some(part) = value.get("response").and_then(|v| v.as_str()) {
            full_response.push_str(part);
        }
        if let Some(name) = value.get("model").and_then(|v| v.as_str()) {
            model = name.to_string();
        }
        done |= value.get("done").and_then(|v| v.as_bool()).unwrap_or(false);
    }

    Ok(GenerationResponse {
        model,
        response: full_response,
        done,
        total_duration: None,
    })
}

#[async_trait]
impl TranslationCapability for Ollama {
    async fn translate(&self, text: &str, source_language: Option<&str>) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(render_system_prompt(&self.system_prompt, source_language))
            .temperature(self.temperature);

        let response = self.generate(request).await?;
        Ok(response.response.trim().to_string())
    }

    async fn ensure_available(&self) -> Result<(), ModelProvisioningError> {
        let models = self.list_models().await.map_err(|e| ModelProvisioningError::Unreachable {
            model: self.model.clone(),
            message: e.to_string(),
        })?;

        match self.version().await {
            Ok(version) => debug!("Ollama {} at {}", version, self.base_url),
            Err(e) => debug!("Could not read Ollama version: {}", e),
        }

        if models.iter().any(|m| model_names_match(&m.name, &self.model)) {
            debug!("Ollama model {} already present", self.model);
            return Ok(());
        }

        info!("Model {} not found on {}. Pulling now...", self.model, self.base_url);
        self.pull_model(&self.model)
            .await
            .map_err(|e| ModelProvisioningError::Unavailable {
                model: self.model.clone(),
                message: e.to_string(),
            })?;
        info!("Model {} pulled", self.model);
        Ok(())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// `llama3` and `llama3:latest` name the same model
fn model_names_match(installed: &str, wanted: &str) -> bool {
    let with_tag = |name: &str| {
        if name.contains(':') {
            name.to_string()
        } else {
            format!("{}:latest", name)
        }
    };
    with_tag(installed) == with_tag(wanted)
}
