use crate::core::{OrderedSet, SnapshotCell};
use crate::domain::credentials::UsernamePasswordCredential;
use crate::domain::model::Capability;
use crate::domain::ports::Clock;
use crate::utils::error::{RdpError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use url::Url;

/// Protocols whose name is also the endpoint's URL scheme.
const SCHEME_PROTOCOLS: [&str; 7] = ["http", "https", "ftp", "ftps", "sftp", "s3", "file"];

/// API protocols served over HTTP(S).
const WEB_API_PROTOCOLS: [&str; 6] = [
    "oai-pmh",
    "zenodo-rest",
    "rest",
    "sparql",
    "opendap",
    "graphql",
];

fn check_endpoint(protocol: &str, endpoint: &str) -> Result<Url> {
    let invalid = |reason: String| RdpError::InvalidEndpoint {
        protocol: protocol.to_string(),
        endpoint: endpoint.to_string(),
        reason,
    };

    if protocol.trim().is_empty() {
        return Err(invalid("protocol cannot be empty".to_string()));
    }

    let url = Url::parse(endpoint).map_err(|e| invalid(format!("not a URL: {}", e)))?;
    let protocol = protocol.to_ascii_lowercase();

    if SCHEME_PROTOCOLS.contains(&protocol.as_str()) {
        if url.scheme() != protocol {
            return Err(invalid(format!(
                "scheme '{}' does not match protocol",
                url.scheme()
            )));
        }
    } else if WEB_API_PROTOCOLS.contains(&protocol.as_str())
        && !matches!(url.scheme(), "http" | "https")
    {
        return Err(invalid(format!(
            "'{}' endpoints must use http or https, got '{}'",
            protocol,
            url.scheme()
        )));
    }

    if url.scheme() != "file" && url.host().is_none() {
        return Err(invalid("endpoint has no host".to_string()));
    }

    Ok(url)
}

/// Access point for a product's metadata and/or data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    protocol: String,
    endpoint: String,
    created_at: DateTime<Utc>,
    capabilities: BTreeSet<Capability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential: Option<UsernamePasswordCredential>,
    #[serde(skip)]
    endpoint_url: Url,
}

impl Service {
    pub fn create(
        protocol: &str,
        endpoint: &str,
        capabilities: impl IntoIterator<Item = Capability>,
        clock: &dyn Clock,
    ) -> Result<Self> {
        let endpoint_url = check_endpoint(protocol, endpoint)?;
        Ok(Self {
            protocol: protocol.to_string(),
            endpoint: endpoint.to_string(),
            created_at: clock.now(),
            capabilities: capabilities.into_iter().collect(),
            identifier_prefix: None,
            credential: None,
            endpoint_url,
        })
    }

    /// Prefix prepended to local ids in requests, e.g. `oai:zenodo.org:`.
    pub fn with_identifier_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.identifier_prefix = Some(prefix.into());
        self
    }

    pub fn with_credential(mut self, credential: UsernamePasswordCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn credential(&self) -> Option<&UsernamePasswordCredential> {
        self.credential.as_ref()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn request_identifier(&self, local_id: &str) -> String {
        match &self.identifier_prefix {
            Some(prefix) => format!("{}{}", prefix, local_id),
            None => local_id.to_string(),
        }
    }

    fn key(&self) -> ServiceKey {
        ServiceKey {
            protocol: self.protocol.to_ascii_lowercase(),
            endpoint: self.endpoint_url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ServiceKey {
    protocol: String,
    endpoint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAdd {
    Added,
    /// An older entry with the same protocol and endpoint was replaced.
    Replaced,
    /// The bundle already holds a newer entry for that protocol and endpoint.
    KeptExisting,
}

/// Services of a product, unique by `(protocol, endpoint)`, in insertion order.
#[derive(Debug, Default)]
pub struct ServiceBundle {
    services: SnapshotCell<OrderedSet<ServiceKey, Arc<Service>>>,
}

impl ServiceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, service: Service) -> ServiceAdd {
        let key = service.key();
        let outcome = self.services.modify(|set| {
            let existing = set.get(&key).map(|s| s.created_at);
            let outcome = match existing {
                None => ServiceAdd::Added,
                Some(created_at) if created_at > service.created_at => {
                    return ServiceAdd::KeptExisting;
                }
                Some(_) => {
                    set.remove(&key);
                    ServiceAdd::Replaced
                }
            };
            set.insert(key.clone(), Arc::new(service));
            outcome
        });
        tracing::debug!(
            "Service {} {} -> {:?}",
            key.protocol,
            key.endpoint,
            outcome
        );
        outcome
    }

    /// Newest service offering `capability`; on equal timestamps the earliest
    /// inserted one wins. `None` when no service offers it.
    pub fn select(&self, capability: Capability) -> Option<Arc<Service>> {
        let snapshot = self.services.load();
        let mut best: Option<&Arc<Service>> = None;
        for service in snapshot.iter().filter(|s| s.can(capability)) {
            match best {
                Some(current) if service.created_at <= current.created_at => {}
                _ => best = Some(service),
            }
        }
        let selected = best.cloned();
        tracing::debug!(
            "Selected {} for {}",
            selected
                .as_ref()
                .map(|s| s.endpoint())
                .unwrap_or("no service"),
            capability
        );
        selected
    }

    /// Like [`select`](Self::select) but takes a capability tag such as `"data-access"`.
    pub fn select_tag(&self, tag: &str) -> Result<Option<Arc<Service>>> {
        let capability = tag.parse::<Capability>()?;
        Ok(self.select(capability))
    }

    pub fn services(&self) -> Vec<Arc<Service>> {
        self.services.load().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.services.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.load().is_empty()
    }
}
