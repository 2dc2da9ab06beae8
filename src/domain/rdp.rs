use crate::domain::data::{DataBundle, DataReference};
use crate::domain::metadata::{MetadataAdd, MetadataBundle, Metadatum};
use crate::domain::datacite::DATACITE_SCHEMA;
use crate::domain::model::{Capability, Content, Value};
use crate::domain::pid::PersistentIdentifier;
use crate::domain::ports::{Clock, IdentifierResolver, SchemaValidator};
use crate::domain::service::{Service, ServiceAdd, ServiceBundle};
use crate::utils::error::{RdpError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

pub const ZENODO_OAI_ENDPOINT: &str = "https://zenodo.org/oai2d";
pub const ZENODO_OAI_PREFIX: &str = "oai:zenodo.org:";
pub const ZENODO_REST_ENDPOINT: &str = "https://zenodo.org/api";

/// Repository-specific setup applied when a product is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RdpPreset {
    #[default]
    Generic,
    Zenodo,
}

impl FromStr for RdpPreset {
    type Err = std::convert::Infallible;

    /// Unrecognized names fall back to `Generic`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "zenodo" => RdpPreset::Zenodo,
            _ => RdpPreset::Generic,
        })
    }
}

/// A persistent identifier together with the services, metadata and data it names.
///
/// The identifier is fixed at construction. The bundles only grow through their own
/// `add` operations; none of them can be replaced afterwards.
#[derive(Debug)]
pub struct ResearchDataProduct {
    pid: PersistentIdentifier,
    preset: RdpPreset,
    services: ServiceBundle,
    metadata: MetadataBundle,
    data: DataBundle,
}

impl ResearchDataProduct {
    pub fn create(
        pid: Option<PersistentIdentifier>,
        services: ServiceBundle,
        metadata: MetadataBundle,
        data: DataBundle,
    ) -> Result<Self> {
        let pid = pid.ok_or(RdpError::MissingIdentifier)?;
        tracing::info!(
            "Created research data product {} ({} services, {} metadata, {} data)",
            pid,
            services.len(),
            metadata.len(),
            data.len()
        );
        Ok(Self {
            pid,
            preset: RdpPreset::Generic,
            services,
            metadata,
            data,
        })
    }

    pub fn pid(&self) -> &PersistentIdentifier {
        &self.pid
    }

    pub fn preset(&self) -> RdpPreset {
        self.preset
    }

    pub fn services(&self) -> &ServiceBundle {
        &self.services
    }

    pub fn metadata(&self) -> &MetadataBundle {
        &self.metadata
    }

    pub fn data(&self) -> &DataBundle {
        &self.data
    }

    pub fn resolve_service(&self, capability: Capability) -> Option<Arc<Service>> {
        self.services.select(capability)
    }

    pub fn resolve_service_tag(&self, tag: &str) -> Result<Option<Arc<Service>>> {
        self.services.select_tag(tag)
    }

    pub fn metadata_for(&self, schema_ref: &str) -> Option<Arc<Metadatum>> {
        self.metadata.for_schema(schema_ref)
    }

    pub fn add_service(&self, service: Service) -> ServiceAdd {
        self.services.add(service)
    }

    pub fn add_metadatum(&self, metadatum: Metadatum) -> MetadataAdd {
        self.metadata.add(metadatum)
    }

    pub fn add_data(&self, reference: DataReference) -> bool {
        self.data.add_reference(reference)
    }

    /// Id used by the hosting repository: the Zenodo record number for Zenodo
    /// products (`10.5281/zenodo.3490396` -> `3490396`), the PID value otherwise.
    pub fn local_id(&self) -> &str {
        match self.preset {
            RdpPreset::Zenodo => self
                .pid
                .value()
                .rsplit('.')
                .next()
                .unwrap_or_else(|| self.pid.value()),
            RdpPreset::Generic => self.pid.value(),
        }
    }

    /// Identifier to send to the selected service for `capability`.
    pub fn request_identifier(&self, capability: Capability) -> Option<String> {
        self.resolve_service(capability)
            .map(|service| service.request_identifier(self.local_id()))
    }

    pub fn landing_page(&self, resolver: &dyn IdentifierResolver) -> Option<Url> {
        resolver.resolve(&self.pid)
    }

    /// First DataCite title, else the Dublin Core title.
    pub fn title(&self) -> Option<String> {
        let from_datacite = self.metadata_for(DATACITE_SCHEMA).and_then(|m| {
            m.datacite()
                .and_then(|dc| dc.titles().into_iter().next())
                .map(|t| t.text)
        });
        from_datacite.or_else(|| {
            self.metadata_for("dublin-core")
                .and_then(|m| m.get("title").and_then(Value::as_str).map(str::to_string))
        })
    }

    pub fn summary(&self) -> RdpSummary {
        RdpSummary {
            pid: self.pid.clone(),
            preset: self.preset,
            title: self.title(),
            services: self.services.len(),
            metadata_schemas: self.metadata.schemas(),
            metadata_records: self.metadata.len(),
            data_references: self.data.len(),
            metadata_service: self
                .resolve_service(Capability::MetadataAccess)
                .map(|s| s.endpoint().to_string()),
            data_service: self
                .resolve_service(Capability::DataAccess)
                .map(|s| s.endpoint().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RdpSummary {
    pub pid: PersistentIdentifier,
    pub preset: RdpPreset,
    pub title: Option<String>,
    pub services: usize,
    pub metadata_schemas: BTreeSet<String>,
    pub metadata_records: usize,
    pub data_references: usize,
    pub metadata_service: Option<String>,
    pub data_service: Option<String>,
}

/// Creates products and their entities with a shared clock and schema validator.
#[derive(Clone)]
pub struct RdpFactory {
    clock: Arc<dyn Clock>,
    validator: Arc<dyn SchemaValidator>,
}

impl RdpFactory {
    pub fn new(clock: Arc<dyn Clock>, validator: Arc<dyn SchemaValidator>) -> Self {
        Self { clock, validator }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn validator(&self) -> &dyn SchemaValidator {
        self.validator.as_ref()
    }

    /// Parses `pid` (DOI, Handle or URL) and applies `preset`.
    pub fn create(&self, pid: &str, preset: RdpPreset) -> Result<ResearchDataProduct> {
        let pid = PersistentIdentifier::parse(pid)?;
        self.create_with_pid(pid, preset)
    }

    pub fn create_with_pid(
        &self,
        pid: PersistentIdentifier,
        preset: RdpPreset,
    ) -> Result<ResearchDataProduct> {
        let services = ServiceBundle::new();
        if preset == RdpPreset::Zenodo {
            services.add(
                self.service("oai-pmh", ZENODO_OAI_ENDPOINT, [Capability::MetadataAccess])?
                    .with_identifier_prefix(ZENODO_OAI_PREFIX),
            );
            services.add(self.service(
                "zenodo-rest",
                ZENODO_REST_ENDPOINT,
                [Capability::DataAccess],
            )?);
        }

        let mut rdp = ResearchDataProduct::create(
            Some(pid),
            services,
            MetadataBundle::new(),
            DataBundle::new(),
        )?;
        rdp.preset = preset;
        Ok(rdp)
    }

    pub fn service(
        &self,
        protocol: &str,
        endpoint: &str,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Result<Service> {
        Service::create(protocol, endpoint, capabilities, self.clock.as_ref())
    }

    pub fn metadatum(&self, content: Content, schema_ref: &str) -> Result<Metadatum> {
        Metadatum::create(
            content,
            schema_ref,
            self.validator.as_ref(),
            self.clock.as_ref(),
        )
    }

    pub fn data_reference(&self, location: &str) -> Result<DataReference> {
        DataReference::create(location, self.clock.now())
    }

    /// Validates and records metadata; the product is untouched if validation fails.
    pub fn record_metadata(
        &self,
        rdp: &ResearchDataProduct,
        content: Content,
        schema_ref: &str,
    ) -> Result<MetadataAdd> {
        let metadatum = self.metadatum(content, schema_ref)?;
        Ok(rdp.add_metadatum(metadatum))
    }

    pub fn record_data(&self, rdp: &ResearchDataProduct, location: &str) -> Result<bool> {
        let reference = self.data_reference(location)?;
        Ok(rdp.add_data(reference))
    }
}

impl std::fmt::Debug for RdpFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdpFactory").finish_non_exhaustive()
    }
}
