//! Fill a PDF form from a JSON request
//!
//! Runs one fill request against directory-backed template and output roots and
//! prints the response as JSON. On failure the structured error is printed and
//! the process exits with status 1.
//!
//! Usage:
//!   fill_form --request req.json --templates forms/ --output out/
//!   fill_form --request req.json --templates forms/ --output out/ --config fill.json --base-url https://files.example.com
//!   fill_form --list-fields form.pdf --variant kyc-stock-corporation
//!
//! Logging is controlled by RUST_LOG, e.g. `RUST_LOG=acrofill=debug`.

use acrofill::catalog::DocumentVariant;
use acrofill::config::FillConfig;
use acrofill::error::{Error, Result};
use acrofill::form::FormTemplate;
use acrofill::gateway::FsGateway;
use acrofill::resolver::TypeResolver;
use acrofill::service::{FillRequest, FillService};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Debug, Default)]
struct CliArgs {
    request: Option<PathBuf>,
    templates: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    base_url: Option<String>,
    list_fields: Option<PathBuf>,
    variant: Option<String>,
}

impl CliArgs {
    fn from_args() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut parsed = CliArgs::default();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = args
                .get(i + 1)
                .cloned()
                .ok_or_else(|| Error::InvalidRequest(format!("{} needs a value", flag)));
            match flag {
                "--request" => parsed.request = Some(PathBuf::from(value?)),
                "--templates" => parsed.templates = Some(PathBuf::from(value?)),
                "--output" => parsed.output = Some(PathBuf::from(value?)),
                "--config" => parsed.config = Some(PathBuf::from(value?)),
                "--base-url" => parsed.base_url = Some(value?),
                "--list-fields" => parsed.list_fields = Some(PathBuf::from(value?)),
                "--variant" => parsed.variant = Some(value?),
                other => {
                    return Err(Error::InvalidRequest(format!("unknown argument '{}'", other)));
                },
            }
            i += 2;
        }
        Ok(parsed)
    }
}

fn load_config(args: &CliArgs) -> Result<FillConfig> {
    match &args.config {
        Some(path) => FillConfig::from_json_file(path),
        None => Ok(FillConfig::default()),
    }
}

fn list_fields(path: &Path, args: &CliArgs) -> Result<String> {
    let config = load_config(args)?;
    let variant = match &args.variant {
        Some(v) => v.parse()?,
        None => DocumentVariant::Generic,
    };
    let bytes = fs::read(path)?;
    let template = FormTemplate::load(&bytes)?;
    let fields = template.describe(&TypeResolver::new(config.resolution), variant);
    Ok(serde_json::to_string_pretty(&fields)?)
}

fn fill(args: &CliArgs) -> Result<String> {
    let missing = |flag: &str| Error::InvalidRequest(format!("{} is required", flag));
    let request_path = args.request.as_ref().ok_or_else(|| missing("--request"))?;
    let templates = args.templates.as_ref().ok_or_else(|| missing("--templates"))?;
    let output = args.output.as_ref().ok_or_else(|| missing("--output"))?;

    let mut gateway = FsGateway::new(templates, output);
    if let Some(base_url) = &args.base_url {
        gateway = gateway.with_base_url(base_url.clone());
    }
    let service = FillService::with_config(gateway, load_config(args)?);

    let body = fs::read_to_string(request_path)?;
    let request = FillRequest::from_json(&body)?;
    let response = service.fill(&request)?;
    Ok(serde_json::to_string_pretty(&response)?)
}

fn run() -> Result<String> {
    let args = CliArgs::from_args()?;
    match &args.list_fields {
        Some(path) => list_fields(path, &args),
        None => fill(&args),
    }
}

fn main() {
    env_logger::init();

    match run() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            let response = e.to_response();
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{}", json),
                Err(_) => eprintln!("Error: {}", e),
            }
            process::exit(1);
        },
    }
}
