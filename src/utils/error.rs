use thiserror::Error;

#[derive(Error, Debug)]
pub enum RdpError {
    #[error("Invalid {kind} identifier: '{value}'")]
    InvalidIdentifierFormat { kind: String, value: String },

    #[error("Invalid endpoint '{endpoint}' for protocol '{protocol}': {reason}")]
    InvalidEndpoint {
        protocol: String,
        endpoint: String,
        reason: String,
    },

    #[error("Metadata does not conform to schema '{schema_ref}': {}", .errors.join("; "))]
    SchemaValidationError {
        schema_ref: String,
        errors: Vec<String>,
    },

    #[error("A research data product requires a persistent identifier")]
    MissingIdentifier,

    #[error("Unknown capability: '{tag}'")]
    UnknownCapability { tag: String },

    #[error("Invalid data reference '{reference}': {reason}")]
    InvalidDataReference { reference: String, reason: String },

    #[error("'{value}' is not in a supported format")]
    InvalidDate { value: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Identifier,
    Service,
    Metadata,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RdpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RdpError::InvalidIdentifierFormat { .. } | RdpError::MissingIdentifier => {
                ErrorCategory::Identifier
            }
            RdpError::InvalidEndpoint { .. } | RdpError::UnknownCapability { .. } => {
                ErrorCategory::Service
            }
            RdpError::SchemaValidationError { .. } | RdpError::InvalidDate { .. } => {
                ErrorCategory::Metadata
            }
            RdpError::InvalidDataReference { .. } | RdpError::CsvError(_) => ErrorCategory::Data,
            RdpError::ConfigError { .. }
            | RdpError::InvalidConfigValueError { .. }
            | RdpError::TomlError(_) => ErrorCategory::Configuration,
            RdpError::IoError(_) | RdpError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // bad input data; fixing the input is enough
            RdpError::SchemaValidationError { .. }
            | RdpError::InvalidDate { .. }
            | RdpError::InvalidDataReference { .. } => ErrorSeverity::Medium,
            RdpError::InvalidIdentifierFormat { .. }
            | RdpError::MissingIdentifier
            | RdpError::InvalidEndpoint { .. }
            | RdpError::ConfigError { .. }
            | RdpError::InvalidConfigValueError { .. }
            | RdpError::TomlError(_) => ErrorSeverity::High,
            // caller passed an unsupported tag
            RdpError::UnknownCapability { .. } => ErrorSeverity::High,
            RdpError::IoError(_) | RdpError::SerializationError(_) | RdpError::CsvError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RdpError::InvalidIdentifierFormat { kind, .. } => match kind.as_str() {
                "DOI" => "Use a DOI of the form 10.<registrant>/<suffix>, e.g. 10.1234/example"
                    .to_string(),
                "Handle" => "Use a Handle of the form <prefix>/<suffix>, e.g. 20.500.12345/abc"
                    .to_string(),
                _ => "Use an absolute URI including its scheme, e.g. https://example.org/rdp"
                    .to_string(),
            },
            RdpError::MissingIdentifier => {
                "Mint a persistent identifier before creating the product".to_string()
            }
            RdpError::InvalidEndpoint { protocol, .. } => format!(
                "Provide an absolute endpoint URL whose scheme fits the '{}' protocol",
                protocol
            ),
            RdpError::SchemaValidationError { schema_ref, .. } => format!(
                "Add the missing fields or fix their types so the record conforms to '{}'",
                schema_ref
            ),
            RdpError::UnknownCapability { .. } => {
                "Use one of: metadata-access, data-access".to_string()
            }
            RdpError::InvalidDataReference { .. } => {
                "Reference data by an absolute URI (https://, s3://, file://)".to_string()
            }
            RdpError::InvalidDate { .. } => {
                "Use a W3CDTF date such as 2019, 2019-12, 2019-12-24 or 2019-12-24T20:01+01:00"
                    .to_string()
            }
            RdpError::ConfigError { .. }
            | RdpError::InvalidConfigValueError { .. }
            | RdpError::TomlError(_) => {
                "Check the manifest file against the documented layout".to_string()
            }
            RdpError::IoError(_) => "Check that the file exists and is readable".to_string(),
            RdpError::SerializationError(_) | RdpError::CsvError(_) => {
                "Check the output location and retry".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Identifier => format!("Identifier problem: {}", self),
            ErrorCategory::Service => format!("Service problem: {}", self),
            ErrorCategory::Metadata => format!("Metadata problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, RdpError>;
