/*!
 * Embedded language detector backed by the whatlang trigram models.
 *
 * The language profiles are compiled into the binary, so provisioning never
 * has to fetch an artifact.
 */

use async_trait::async_trait;
use log::debug;
use whatlang::{Detector, Lang};

use crate::errors::{ModelProvisioningError, ProviderError};
use crate::language_utils;
use crate::providers::{DetectionCapability, RawDetection};

/// Whatlang detection engine
pub struct WhatlangDetector {
    detector: Detector,
    allowlist: Vec<Lang>,
}

impl WhatlangDetector {
    /// Create a detector over every language whatlang knows
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
            allowlist: Vec::new(),
        }
    }

    /// Create a detector restricted to the given ISO 639 codes
    pub fn with_allowlist(codes: &[String]) -> Result<Self, ModelProvisioningError> {
        if codes.is_empty() {
            return Ok(Self::new());
        }

        let mut allowlist = Vec::with_capacity(codes.len());
        for code in codes {
            let lang = to_whatlang(code).ok_or_else(|| {
                ModelProvisioningError::InvalidConfiguration(format!(
                    "Language '{}' is not supported by the whatlang detector",
                    code
                ))
            })?;
            allowlist.push(lang);
        }

        Ok(Self {
            detector: Detector::with_allowlist(allowlist.clone()),
            allowlist,
        })
    }

    /// Languages this detector may answer with (empty = all)
    pub fn allowlist(&self) -> &[Lang] {
        &self.allowlist
    }
}

impl std::fmt::Debug for WhatlangDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatlangDetector")
            .field("allowlist", &self.allowlist)
            .finish()
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Map an ISO 639 code to a whatlang language
fn to_whatlang(code: &str) -> Option<Lang> {
    let part3 = language_utils::normalize_to_part2t(code).ok()?;
    // whatlang reports Mandarin rather than the Chinese macrolanguage
    let part3 = if part3 == "zho" { "cmn" } else { part3.as_str() };
    Lang::from_code(part3)
}

#[async_trait]
impl DetectionCapability for WhatlangDetector {
    async fn detect(&self, text: &str) -> Result<RawDetection, ProviderError> {
        let info = self.detector.detect(text).ok_or_else(|| {
            ProviderError::RequestFailed("Text has no recognizable script or language".to_string())
        })?;

        debug!(
            "whatlang: {} ({}) confidence {:.4}, reliable: {}",
            info.lang().eng_name(),
            info.lang().code(),
            info.confidence(),
            info.is_reliable()
        );

        Ok(RawDetection::new(info.lang().code(), info.confidence()))
    }

    async fn ensure_available(&self) -> Result<(), ModelProvisioningError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "whatlang"
    }
}
