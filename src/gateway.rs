//! Template retrieval and document storage.
//!
//! The filler itself never does I/O. A [`TemplateGateway`] turns a template
//! locator into bytes and turns filled bytes into a retrievable document.
//! [`FsGateway`] serves a deployment backed by local directories;
//! [`MemoryGateway`] keeps everything in process.

use crate::catalog::DocumentVariant;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// A persisted filled document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    /// Handle the caller uses to download the document
    pub retrieval_handle: String,
    /// File name, `{variant}_{timestamp}_{digest}.pdf`
    pub filename: String,
    /// Path relative to the storage root
    pub storage_path: String,
    /// Size in bytes
    pub size: u64,
}

/// Source of templates and sink of filled documents.
pub trait TemplateGateway: Send + Sync {
    /// Fetch template bytes. Missing or empty templates are
    /// [`Error::TemplateUnavailable`].
    fn resolve_template(&self, locator: &str) -> Result<Vec<u8>>;

    /// Store filled bytes under the caller's destination.
    fn persist(
        &self,
        bytes: &[u8],
        variant: DocumentVariant,
        destination_id: &str,
    ) -> Result<StoredDocument>;
}

/// Storage file name: variant, UTC timestamp and the first 16 hex digits of the
/// content SHA-256.
pub fn document_filename(variant: DocumentVariant, bytes: &[u8], at: DateTime<Utc>) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        let _ = write!(hex, "{:02x}", byte);
    }
    format!("{}_{}_{}.pdf", variant, at.format("%Y%m%dT%H%M%SZ"), hex)
}

/// Whether a destination id can become a single directory level.
pub fn is_valid_destination(destination_id: &str) -> bool {
    !destination_id.is_empty()
        && destination_id != "."
        && destination_id != ".."
        && destination_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn validate_destination(destination_id: &str) -> Result<()> {
    if is_valid_destination(destination_id) {
        Ok(())
    } else {
        Err(Error::PersistFailed(format!(
            "invalid destination id '{}'",
            destination_id
        )))
    }
}

/// Directory-backed gateway.
///
/// Templates are read below `template_root`; locators must be relative and may
/// not leave the root. Filled documents go to `output_root/{destination}/`.
#[derive(Debug, Clone)]
pub struct FsGateway {
    template_root: PathBuf,
    output_root: PathBuf,
    base_url: Option<String>,
}

impl FsGateway {
    /// Create a gateway over two directories.
    pub fn new(template_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            template_root: template_root.into(),
            output_root: output_root.into(),
            base_url: None,
        }
    }

    /// Public URL prefix for retrieval handles. Without one, handles are
    /// absolute file paths.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn template_path(&self, locator: &str) -> Result<PathBuf> {
        let relative = Path::new(locator.trim());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if locator.trim().is_empty() || escapes {
            return Err(Error::TemplateUnavailable(format!(
                "locator '{}' is outside the template root",
                locator
            )));
        }
        Ok(self.template_root.join(relative))
    }
}

impl TemplateGateway for FsGateway {
    fn resolve_template(&self, locator: &str) -> Result<Vec<u8>> {
        let path = self.template_path(locator)?;
        let bytes = fs::read(&path).map_err(|e| {
            Error::TemplateUnavailable(format!("{}: {}", path.display(), e))
        })?;
        if bytes.is_empty() {
            return Err(Error::TemplateUnavailable(format!(
                "{} is empty",
                path.display()
            )));
        }
        log::debug!("Read template {} ({} bytes)", path.display(), bytes.len());
        Ok(bytes)
    }

    fn persist(
        &self,
        bytes: &[u8],
        variant: DocumentVariant,
        destination_id: &str,
    ) -> Result<StoredDocument> {
        validate_destination(destination_id)?;
        let filename = document_filename(variant, bytes, Utc::now());
        let dir = self.output_root.join(destination_id);
        let path = dir.join(&filename);
        fs::create_dir_all(&dir)
            .and_then(|_| fs::write(&path, bytes))
            .map_err(|e| Error::PersistFailed(format!("{}: {}", path.display(), e)))?;

        let storage_path = format!("{}/{}", destination_id, filename);
        let retrieval_handle = match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), storage_path),
            None => fs::canonicalize(&path)
                .unwrap_or_else(|_| path.clone())
                .display()
                .to_string(),
        };
        log::info!("Stored {} ({} bytes)", storage_path, bytes.len());
        Ok(StoredDocument {
            retrieval_handle,
            filename,
            storage_path,
            size: bytes.len() as u64,
        })
    }
}

/// In-process gateway. Handles are `mem://{uuid}`.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    templates: Mutex<HashMap<String, Vec<u8>>>,
    stored: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryGateway {
    /// Empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under a locator.
    pub fn with_template(self, locator: impl Into<String>, bytes: Vec<u8>) -> Self {
        if let Ok(mut templates) = self.templates.lock() {
            templates.insert(locator.into(), bytes);
        }
        self
    }

    /// Bytes stored under a retrieval handle.
    pub fn stored(&self, handle: &str) -> Option<Vec<u8>> {
        self.stored.lock().ok()?.get(handle).cloned()
    }

    /// Number of stored documents.
    pub fn stored_count(&self) -> usize {
        self.stored.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl TemplateGateway for MemoryGateway {
    fn resolve_template(&self, locator: &str) -> Result<Vec<u8>> {
        let templates = self
            .templates
            .lock()
            .map_err(|_| Error::TemplateUnavailable("template store is poisoned".to_string()))?;
        match templates.get(locator) {
            Some(bytes) if !bytes.is_empty() => Ok(bytes.clone()),
            Some(_) => Err(Error::TemplateUnavailable(format!("{} is empty", locator))),
            None => Err(Error::TemplateUnavailable(format!("no template at {}", locator))),
        }
    }

    fn persist(
        &self,
        bytes: &[u8],
        variant: DocumentVariant,
        destination_id: &str,
    ) -> Result<StoredDocument> {
        validate_destination(destination_id)?;
        let filename = document_filename(variant, bytes, Utc::now());
        let retrieval_handle = format!("mem://{}", uuid::Uuid::new_v4());
        self.stored
            .lock()
            .map_err(|_| Error::PersistFailed("document store is poisoned".to_string()))?
            .insert(retrieval_handle.clone(), bytes.to_vec());
        Ok(StoredDocument {
            retrieval_handle,
            storage_path: format!("{}/{}", destination_id, filename),
            filename,
            size: bytes.len() as u64,
        })
    }
}
