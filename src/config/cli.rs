use crate::utils::error::{RdpError, Result};
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "rdp")]
#[command(about = "Inspect a research data product described by a TOML manifest")]
pub struct CliConfig {
    /// Path to the product manifest
    #[arg(short, long, default_value = "rdp.toml")]
    pub manifest: PathBuf,

    /// Capability to resolve a service for (metadata-access, data-access)
    #[arg(short, long)]
    pub capability: Option<String>,

    /// Schema reference to fetch the newest metadata record for
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Write the data bundle listing to this CSV file
    #[arg(long)]
    pub export_data: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(tag) = &self.capability {
            tag.parse::<crate::domain::model::Capability>()?;
        }
        if let Some(schema) = &self.schema {
            crate::utils::validation::validate_non_empty_string("schema", schema)?;
        }
        if let Some(path) = &self.export_data {
            if path.as_os_str().is_empty() {
                return Err(RdpError::InvalidConfigValueError {
                    field: "export_data".to_string(),
                    value: String::new(),
                    reason: "Path cannot be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
