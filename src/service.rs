//! Request boundary: one fill request in, one stored document out.
//!
//! ```text
//! FillRequest ─validate─► resolve template ─► load ─► fill ─► save
//!                                                              │
//!                  FillResponse ◄─ persist ◄─ payload check ◄──┘
//! ```
//!
//! Every request works on its own template instance; a [`FillService`] can be
//! shared between threads.

use crate::catalog::DocumentVariant;
use crate::config::FillConfig;
use crate::error::{Error, Result};
use crate::filler::FormFiller;
use crate::form::FormTemplate;
use crate::gateway::{is_valid_destination, TemplateGateway};
use crate::value::FormData;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound fill request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FillRequest {
    /// Document variant identifier, e.g. `kyc-stock-corporation`
    pub document_variant: Option<String>,
    /// Template locator understood by the gateway
    pub template_locator: String,
    /// Field name or semantic key → value
    pub form_data: FormData,
    /// Caller's destination, e.g. a customer id
    pub destination_id: String,
}

impl FillRequest {
    /// Parse a JSON request body. Malformed bodies are [`Error::InvalidRequest`].
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::InvalidRequest(e.to_string()))
    }
}

/// Result of a successful fill request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResponse {
    /// Handle for downloading the filled document
    pub download_handle: String,
    /// Stored file name
    pub filename: String,
    /// Path relative to the storage root
    pub storage_path: String,
    /// Size of the filled document
    pub file_size_bytes: u64,
    /// Number of field writes
    pub fields_filled: usize,
    /// Non-fatal conditions, e.g. an oversized document
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Runs fill requests against a gateway.
#[derive(Debug)]
pub struct FillService<G> {
    gateway: G,
    config: FillConfig,
}

impl<G: TemplateGateway> FillService<G> {
    /// Service with default configuration.
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, FillConfig::default())
    }

    /// Service with explicit configuration.
    pub fn with_config(gateway: G, config: FillConfig) -> Self {
        Self { gateway, config }
    }

    /// Underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Active configuration.
    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Execute one request.
    pub fn fill(&self, request: &FillRequest) -> Result<FillResponse> {
        let request_id = Uuid::new_v4();
        let variant = self.validate(request)?;
        log::info!(
            "[{}] Filling {} as {} ({} data keys)",
            request_id,
            request.template_locator,
            variant,
            request.form_data.len()
        );

        let bytes = self.gateway.resolve_template(&request.template_locator)?;
        let mut template = FormTemplate::load(&bytes)?;
        let report = FormFiller::for_variant(variant, &self.config)
            .fill(&mut template, &request.form_data)?;
        let filled = template.save_to_bytes()?;

        let mut warnings = Vec::new();
        let size = filled.len() as u64;
        let ceiling = self.config.payload_ceiling_bytes;
        if size > ceiling {
            if self.config.enforce_payload_ceiling {
                return Err(Error::PayloadTooLarge { size, ceiling });
            }
            log::warn!(
                "[{}] Filled document is {} bytes, above the {} byte ceiling",
                request_id,
                size,
                ceiling
            );
            warnings.push(format!(
                "document size {} bytes exceeds the payload ceiling of {} bytes",
                size, ceiling
            ));
        }

        let stored = self
            .gateway
            .persist(&filled, variant, request.destination_id.trim())?;
        log::info!(
            "[{}] Wrote {} fields, stored as {}",
            request_id,
            report.filled,
            stored.storage_path
        );
        Ok(FillResponse {
            download_handle: stored.retrieval_handle,
            filename: stored.filename,
            storage_path: stored.storage_path,
            file_size_bytes: stored.size,
            fields_filled: report.filled,
            warnings,
        })
    }

    fn validate(&self, request: &FillRequest) -> Result<DocumentVariant> {
        if request.template_locator.trim().is_empty() {
            return Err(Error::InvalidRequest("templateLocator is required".to_string()));
        }
        let destination = request.destination_id.trim();
        if destination.is_empty() {
            return Err(Error::InvalidRequest("destinationId is required".to_string()));
        }
        if !is_valid_destination(destination) {
            return Err(Error::InvalidRequest(format!(
                "destinationId '{}' may only contain letters, digits, '-', '_' and '.'",
                destination
            )));
        }
        if request.form_data.is_empty() {
            return Err(Error::InvalidRequest("formData is empty".to_string()));
        }
        match request.document_variant.as_deref().map(str::trim) {
            Some(variant) if !variant.is_empty() => variant.parse(),
            _ if self.config.infer_variant_from_locator => {
                let inferred = DocumentVariant::infer_from_locator(&request.template_locator);
                log::warn!(
                    "documentVariant missing, inferred {} from locator {}",
                    inferred,
                    request.template_locator
                );
                Ok(inferred)
            },
            _ => Err(Error::InvalidRequest("documentVariant is required".to_string())),
        }
    }
}
