/*!
 * Mock engine implementations for testing.
 *
 * This module provides scripted engines that simulate different behaviors:
 * - `MockDetector::fixed(..)` - Always answers with the same label
 * - `MockDetector::failing()` - Every inference fails
 * - `MockTranslator::working()` - Prefixes the input with `[EN] `
 * - `MockTranslator::failing()` / `empty()` / `unsupported()` - Error paths
 *
 * Clones share their call counters, so a test can hand a clone to the
 * pipeline and inspect the original afterwards.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::errors::{ModelProvisioningError, ProviderError};
use crate::providers::{DetectionCapability, RawDetection, TranslationCapability};

/// Tracks calls and the peak number of overlapping calls
#[derive(Debug, Clone, Default)]
struct CallTracker {
    count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl CallTracker {
    fn enter(&self) -> usize {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.count.fetch_add(1, Ordering::SeqCst)
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Behavior mode for the mock detector
#[derive(Debug, Clone, PartialEq)]
pub enum MockDetectorBehavior {
    /// Answers with the given label and probability
    Fixed { label: String, probability: f64 },
    /// Every inference fails
    Failing,
    /// The model is not loaded
    Unavailable,
}

/// Mock language detection engine
#[derive(Debug, Clone)]
pub struct MockDetector {
    behavior: MockDetectorBehavior,
    scripted: HashMap<String, RawDetection>,
    provisioning_fails: bool,
    provisioned: Arc<AtomicBool>,
    tracker: CallTracker,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockDetector {
    pub fn new(behavior: MockDetectorBehavior) -> Self {
        Self {
            behavior,
            scripted: HashMap::new(),
            provisioning_fails: false,
            provisioned: Arc::new(AtomicBool::new(false)),
            tracker: CallTracker::default(),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `label` at `probability`
    pub fn fixed(label: impl Into<String>, probability: f64) -> Self {
        Self::new(MockDetectorBehavior::Fixed {
            label: label.into(),
            probability,
        })
    }

    pub fn failing() -> Self {
        Self::new(MockDetectorBehavior::Failing)
    }

    pub fn unavailable() -> Self {
        Self::new(MockDetectorBehavior::Unavailable)
    }

    /// Answer `text` with a specific label, overriding the default behavior
    pub fn with_script(mut self, text: impl Into<String>, label: impl Into<String>, probability: f64) -> Self {
        self.scripted
            .insert(text.into(), RawDetection::new(label, probability));
        self
    }

    /// Make `ensure_available` fail
    pub fn with_failing_provisioning(mut self) -> Self {
        self.provisioning_fails = true;
        self
    }

    /// Number of `detect` calls so far
    pub fn call_count(&self) -> usize {
        self.tracker.count.load(Ordering::SeqCst)
    }

    /// Peak number of overlapping `detect` calls
    pub fn max_in_flight(&self) -> usize {
        self.tracker.max_in_flight.load(Ordering::SeqCst)
    }

    /// Texts passed to `detect`, in call order
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }

    /// Whether `ensure_available` has succeeded
    pub fn is_provisioned(&self) -> bool {
        self.provisioned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetectionCapability for MockDetector {
    async fn detect(&self, text: &str) -> Result<RawDetection, ProviderError> {
        self.tracker.enter();
        self.inputs.lock().push(text.to_string());

        let result = if let Some(raw) = self.scripted.get(text) {
            Ok(raw.clone())
        } else {
            match &self.behavior {
                MockDetectorBehavior::Fixed { label, probability } => Ok(RawDetection::new(label.clone(), *probability)),
                MockDetectorBehavior::Failing => Err(ProviderError::RequestFailed(
                    "Simulated detection failure".to_string(),
                )),
                MockDetectorBehavior::Unavailable => Err(ProviderError::ModelNotLoaded(
                    "Simulated missing detection model".to_string(),
                )),
            }
        };

        self.tracker.leave();
        result
    }

    async fn ensure_available(&self) -> Result<(), ModelProvisioningError> {
        if self.provisioning_fails {
            return Err(ModelProvisioningError::Unavailable {
                model: "mock-detector".to_string(),
                message: "Simulated provisioning failure".to_string(),
            });
        }
        self.provisioned.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockTranslatorBehavior {
    /// Returns the input prefixed with `[EN] `
    Working,
    /// Returns the same translation for every input
    Fixed(String),
    /// Every request fails with a server error
    Failing,
    /// The model is not loaded
    Unavailable,
    /// Every source language is rejected
    Unsupported,
    /// Returns an empty translation
    Empty,
}

/// Mock translation engine
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockTranslatorBehavior,
    scripted: HashMap<String, String>,
    delay_ms: u64,
    provisioning_fails: bool,
    provisioned: Arc<AtomicBool>,
    tracker: CallTracker,
    requests: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl MockTranslator {
    pub fn new(behavior: MockTranslatorBehavior) -> Self {
        Self {
            behavior,
            scripted: HashMap::new(),
            delay_ms: 0,
            provisioning_fails: false,
            provisioned: Arc::new(AtomicBool::new(false)),
            tracker: CallTracker::default(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockTranslatorBehavior::Working)
    }

    pub fn fixed(translation: impl Into<String>) -> Self {
        Self::new(MockTranslatorBehavior::Fixed(translation.into()))
    }

    pub fn failing() -> Self {
        Self::new(MockTranslatorBehavior::Failing)
    }

    pub fn unavailable() -> Self {
        Self::new(MockTranslatorBehavior::Unavailable)
    }

    pub fn unsupported() -> Self {
        Self::new(MockTranslatorBehavior::Unsupported)
    }

    pub fn empty() -> Self {
        Self::new(MockTranslatorBehavior::Empty)
    }

    /// Translate `text` to `translation`, overriding the default behavior
    pub fn with_script(mut self, text: impl Into<String>, translation: impl Into<String>) -> Self {
        self.scripted.insert(text.into(), translation.into());
        self
    }

    /// Delay every answer
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Make `ensure_available` fail
    pub fn with_failing_provisioning(mut self) -> Self {
        self.provisioning_fails = true;
        self
    }

    /// Number of `translate` calls so far
    pub fn call_count(&self) -> usize {
        self.tracker.count.load(Ordering::SeqCst)
    }

    /// Peak number of overlapping `translate` calls
    pub fn max_in_flight(&self) -> usize {
        self.tracker.max_in_flight.load(Ordering::SeqCst)
    }

    /// `(text, source_language)` pairs passed to `translate`, in call order
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().clone()
    }

    /// Whether `ensure_available` has succeeded
    pub fn is_provisioned(&self) -> bool {
        self.provisioned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationCapability for MockTranslator {
    async fn translate(&self, text: &str, source_language: Option<&str>) -> Result<String, ProviderError> {
        self.tracker.enter();
        self.requests
            .lock()
            .push((text.to_string(), source_language.map(str::to_string)));

        if self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }

        let result = if let Some(translation) = self.scripted.get(text) {
            Ok(translation.clone())
        } else {
            match &self.behavior {
                MockTranslatorBehavior::Working => Ok(format!("[EN] {}", text)),
                MockTranslatorBehavior::Fixed(translation) => Ok(translation.clone()),
                MockTranslatorBehavior::Failing => Err(ProviderError::ApiError {
                    status_code: 500,
                    message: "Simulated translation failure".to_string(),
                }),
                MockTranslatorBehavior::Unavailable => Err(ProviderError::ModelNotLoaded(
                    "Simulated missing translation model".to_string(),
                )),
                MockTranslatorBehavior::Unsupported => Err(ProviderError::UnsupportedLanguage(
                    source_language.unwrap_or("unknown").to_string(),
                )),
                MockTranslatorBehavior::Empty => Ok(String::new()),
            }
        };

        self.tracker.leave();
        result
    }

    async fn ensure_available(&self) -> Result<(), ModelProvisioningError> {
        if self.provisioning_fails {
            return Err(ModelProvisioningError::Unavailable {
                model: "mock-translator".to_string(),
                message: "Simulated provisioning failure".to_string(),
            });
        }
        self.provisioned.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
