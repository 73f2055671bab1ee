//! Configuration for form filling.

use crate::error::Result;
use crate::resolver::ResolutionStrategy;
use serde::Deserialize;
use std::path::Path;

/// Payload ceiling of the original deployment target (4 MiB).
pub const DEFAULT_PAYLOAD_CEILING: u64 = 4 * 1024 * 1024;

/// Shortest name fragment a fuzzy match may rely on.
pub const DEFAULT_MIN_FUZZY_LEN: usize = 3;

/// Form filling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillConfig {
    /// Size above which a filled document is flagged.
    pub payload_ceiling_bytes: u64,

    /// Reject oversized documents instead of only warning.
    pub enforce_payload_ceiling: bool,

    /// How field kinds are resolved.
    pub resolution: ResolutionStrategy,

    /// Minimum length of the contained side in a fuzzy substring match.
    pub min_fuzzy_len: usize,

    /// Infer the document variant from the template locator when the request omits it.
    pub infer_variant_from_locator: bool,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FillConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            payload_ceiling_bytes: DEFAULT_PAYLOAD_CEILING,
            enforce_payload_ceiling: false,
            resolution: ResolutionStrategy::Structural,
            min_fuzzy_len: DEFAULT_MIN_FUZZY_LEN,
            infer_variant_from_locator: false,
        }
    }

    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Set the payload ceiling in bytes.
    pub fn with_payload_ceiling(mut self, bytes: u64) -> Self {
        self.payload_ceiling_bytes = bytes;
        self
    }

    /// Turn the payload ceiling into a hard failure.
    pub fn with_enforced_ceiling(mut self, enforce: bool) -> Self {
        self.enforce_payload_ceiling = enforce;
        self
    }

    /// Select the field-kind resolution strategy.
    pub fn with_resolution(mut self, strategy: ResolutionStrategy) -> Self {
        self.resolution = strategy;
        self
    }

    /// Set the minimum fuzzy match length.
    pub fn with_min_fuzzy_len(mut self, len: usize) -> Self {
        self.min_fuzzy_len = len;
        self
    }

    /// Enable the legacy locator-based variant inference.
    pub fn with_variant_inference(mut self, enable: bool) -> Self {
        self.infer_variant_from_locator = enable;
        self
    }
}
