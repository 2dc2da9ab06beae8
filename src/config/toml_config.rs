use crate::adapters::schema::{SchemaDefinition, SchemaRegistry};
use crate::domain::credentials::UsernamePasswordCredential;
use crate::domain::data::DataReference;
use crate::domain::model::{Capability, Content, Value};
use crate::domain::pid::{PersistentIdentifier, PidKind};
use crate::domain::ports::Clock;
use crate::domain::rdp::{RdpFactory, RdpPreset, ResearchDataProduct};
use crate::utils::error::{RdpError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_unique_names, validate_url, Validate,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// TOML description of one research data product.
///
/// ```toml
/// [product]
/// pid = "10.5281/zenodo.3490396"
/// preset = "zenodo"
///
/// [[services]]
/// protocol = "https"
/// endpoint = "https://example.org/meta"
/// capabilities = ["metadata-access"]
///
/// [[metadata]]
/// schema = "dublin-core"
/// content = { title = "x" }
///
/// [[data]]
/// location = "https://example.org/files/survey.csv"
/// created_at = "2020-03-09T12:00:00Z"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdpManifest {
    pub product: ProductConfig,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub metadata: Vec<MetadataConfig>,
    #[serde(default)]
    pub data: Vec<DataConfig>,
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub pid: Option<String>,
    /// doi, handle or url; inferred from `pid` when absent
    pub kind: Option<String>,
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub protocol: String,
    pub endpoint: String,
    pub capabilities: Vec<String>,
    pub identifier_prefix: Option<String>,
    pub credential: Option<CredentialConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub schema: String,
    pub content: toml::Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub location: String,
    /// RFC 3339; stamped from the clock when absent
    pub created_at: Option<String>,
}

fn env_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"))
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RdpError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: format!("Expected an RFC 3339 timestamp: {}", e),
        })
}

fn unresolved_placeholder(value: &str) -> Option<&str> {
    let start = value.find("${")?;
    let rest = &value[start + 2..];
    rest.find('}').map(|end| &rest[..end])
}

impl RdpManifest {
    /// Loads a manifest file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses a manifest, then expands `${VAR}` inside its string values.
    /// Substituted text is taken verbatim and never re-read as TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut document: toml::Value = toml::Value::Table(toml::from_str(content)?);
        Self::substitute_in_value(&mut document);
        Ok(document.try_into()?)
    }

    fn substitute_in_value(value: &mut toml::Value) {
        match value {
            toml::Value::String(s) => {
                if env_placeholder().is_match(s) {
                    *s = Self::substitute_env_vars(s);
                }
            }
            toml::Value::Array(items) => items.iter_mut().for_each(Self::substitute_in_value),
            toml::Value::Table(table) => {
                table.iter_mut().for_each(|(_, v)| Self::substitute_in_value(v))
            }
            _ => {}
        }
    }

    /// Replaces `${VAR_NAME}`; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn preset(&self) -> RdpPreset {
        self.product
            .preset
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }

    /// Built-in schemas plus the ones declared in the manifest.
    pub fn schema_registry(&self) -> SchemaRegistry {
        let mut registry = SchemaRegistry::with_builtin();
        for definition in &self.schemas {
            registry.register(definition.clone());
        }
        registry
    }

    pub fn factory(&self, clock: Arc<dyn Clock>) -> RdpFactory {
        RdpFactory::new(clock, Arc::new(self.schema_registry()))
    }

    fn pid(&self) -> Result<Option<PersistentIdentifier>> {
        let Some(value) = self.product.pid.as_deref() else {
            return Ok(None);
        };
        let pid = match self.product.kind.as_deref() {
            Some(kind) => PersistentIdentifier::create(kind.parse::<PidKind>()?, value)?,
            None => PersistentIdentifier::parse(value)?,
        };
        Ok(Some(pid))
    }

    /// Builds the product. Any invalid entry aborts the whole build.
    pub fn build(&self, factory: &RdpFactory) -> Result<ResearchDataProduct> {
        let pid = self.pid()?.ok_or(RdpError::MissingIdentifier)?;
        let rdp = factory.create_with_pid(pid, self.preset())?;

        for config in &self.services {
            let capabilities = config
                .capabilities
                .iter()
                .map(|tag| tag.parse::<Capability>())
                .collect::<Result<Vec<_>>>()?;
            let mut service = factory.service(&config.protocol, &config.endpoint, capabilities)?;
            if let Some(prefix) = &config.identifier_prefix {
                service = service.with_identifier_prefix(prefix.clone());
            }
            if let Some(credential) = &config.credential {
                service = service.with_credential(UsernamePasswordCredential::new(
                    credential.username.clone(),
                    credential.password.clone(),
                ));
            }
            rdp.add_service(service);
        }

        for config in &self.metadata {
            let content: Content = config
                .content
                .clone()
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect();
            factory.record_metadata(&rdp, content, &config.schema)?;
        }

        for config in &self.data {
            let reference = match &config.created_at {
                Some(ts) => DataReference::create(
                    &config.location,
                    parse_timestamp("data.created_at", ts)?,
                )?,
                None => factory.data_reference(&config.location)?,
            };
            rdp.add_data(reference);
        }

        tracing::info!(
            "Built {} from manifest: {} services, {} metadata, {} data",
            rdp.pid(),
            rdp.services().len(),
            rdp.metadata().len(),
            rdp.data().len()
        );
        Ok(rdp)
    }
}

impl Validate for RdpManifest {
    fn validate(&self) -> Result<()> {
        if let Some(kind) = &self.product.kind {
            kind.parse::<PidKind>()?;
        }

        for service in &self.services {
            validate_non_empty_string("services.protocol", &service.protocol)?;
            validate_url("services.endpoint", &service.endpoint, &[])?;
            if service.capabilities.is_empty() {
                return Err(RdpError::InvalidConfigValueError {
                    field: "services.capabilities".to_string(),
                    value: service.endpoint.clone(),
                    reason: "A service needs at least one capability".to_string(),
                });
            }
            for tag in &service.capabilities {
                tag.parse::<Capability>()?;
            }
            if let Some(credential) = &service.credential {
                if let Some(var) = unresolved_placeholder(&credential.password) {
                    return Err(RdpError::ConfigError {
                        message: format!(
                            "Environment variable '{}' for the {} credential is not set",
                            var, service.endpoint
                        ),
                    });
                }
            }
        }

        for metadata in &self.metadata {
            validate_non_empty_string("metadata.schema", &metadata.schema)?;
        }

        for data in &self.data {
            validate_non_empty_string("data.location", &data.location)?;
            if let Some(ts) = &data.created_at {
                parse_timestamp("data.created_at", ts)?;
            }
        }

        for schema in &self.schemas {
            validate_non_empty_string("schemas.name", &schema.name)?;
        }
        validate_unique_names("schemas.name", self.schemas.iter().map(|s| s.name.as_str()))?;

        Ok(())
    }
}
