// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]

//! # acrofill
//!
//! AcroForm filling engine: projects a semantic data map onto a fillable PDF
//! template and returns the filled document.
//!
//! ## Core Features
//!
//! - **Typed setters**: text, checkbox, radio and dropdown writes driven by the
//!   document's native field types, with a name heuristic for untyped fields
//! - **Name resolution**: exact names, literal equivalents, positional groups for
//!   repeated blocks, and fuzzy matching for drifting template revisions
//! - **Business rules**: industry, stock listing, PEP and beneficial ownership
//!   declarations resolved into coordinated checkbox states
//! - **Request boundary**: validation, template retrieval, storage and a
//!   structured error taxonomy
//!
//! ## Quick Start
//!
//! ```ignore
//! use acrofill::{FillRequest, FillService, FsGateway};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = FillService::new(FsGateway::new("templates", "out"));
//! let request = FillRequest::from_json(&std::fs::read_to_string("request.json")?)?;
//! let response = service.fill(&request)?;
//! println!("{}", response.download_handle);
//! # Ok(())
//! # }
//! ```
//!
//! Lower-level use, without a gateway:
//!
//! ```ignore
//! use acrofill::{FormFiller, FormTemplate, FormData};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut template = FormTemplate::load(&std::fs::read("form.pdf")?)?;
//! let data: FormData = serde_json::from_str(r#"{"Firma": "Acme GmbH"}"#)?;
//! let report = FormFiller::generic().fill(&mut template, &data)?;
//! let bytes = template.save_to_bytes()?;
//! # Ok(())
//! # }
//! ```

// Error handling
pub mod error;

// Configuration
pub mod config;

// Input data
pub mod value;

// Field name normalization
pub mod names;

// AcroForm model
pub mod form;

// Variant field catalogs
pub mod catalog;

// Field kind resolution
pub mod resolver;

// Filling engine and business rules
pub mod filler;

// Template retrieval and storage
pub mod gateway;

// Request boundary
pub mod service;

// Re-exports
pub use catalog::DocumentVariant;
pub use config::FillConfig;
pub use error::{Error, ErrorKind, ErrorResponse, Result};
pub use filler::{BusinessRule, Fallback, FillReport, FormFiller};
pub use form::{FormDocument, FormTemplate, Kind};
pub use gateway::{FsGateway, MemoryGateway, StoredDocument, TemplateGateway};
pub use resolver::{ResolutionStrategy, TypeResolver};
pub use service::{FillRequest, FillResponse, FillService};
pub use value::{FormData, FormValue};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
