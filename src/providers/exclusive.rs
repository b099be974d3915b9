/*!
 * Lock wrappers for engines that must not serve two requests at once.
 *
 * The wrapped engine is called while an async mutex is held, so concurrent
 * rows queue up on the engine instead of calling into it in parallel.
 */

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::{ModelProvisioningError, ProviderError};
use crate::providers::{DetectionCapability, RawDetection, TranslationCapability};

/// Detection engine guarded by a mutex
#[derive(Debug)]
pub struct ExclusiveDetector {
    inner: Arc<dyn DetectionCapability>,
    lock: Mutex<()>,
}

impl ExclusiveDetector {
    pub fn new(inner: Arc<dyn DetectionCapability>) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl DetectionCapability for ExclusiveDetector {
    async fn detect(&self, text: &str) -> Result<RawDetection, ProviderError> {
        let _guard = self.lock.lock().await;
        self.inner.detect(text).await
    }

    async fn ensure_available(&self) -> Result<(), ModelProvisioningError> {
        let _guard = self.lock.lock().await;
        self.inner.ensure_available().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Translation engine guarded by a mutex
#[derive(Debug)]
pub struct ExclusiveTranslator {
    inner: Arc<dyn TranslationCapability>,
    lock: Mutex<()>,
}

impl ExclusiveTranslator {
    pub fn new(inner: Arc<dyn TranslationCapability>) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl TranslationCapability for ExclusiveTranslator {
    async fn translate(&self, text: &str, source_language: Option<&str>) -> Result<String, ProviderError> {
        let _guard = self.lock.lock().await;
        self.inner.translate(text, source_language).await
    }

    async fn ensure_available(&self) -> Result<(), ModelProvisioningError> {
        let _guard = self.lock.lock().await;
        self.inner.ensure_available().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
