pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::RdpManifest;

pub use adapters::{ManualClock, ProxyResolver, SchemaRegistry, SystemClock};
pub use domain::data::{DataBundle, DataReference};
pub use domain::datacite::{DataCite, Person, PersonOrInstitution};
pub use domain::metadata::{MetadataBundle, Metadatum};
pub use domain::model::{Capability, Content, Scalar, Value};
pub use domain::pid::{PersistentIdentifier, PidKind};
pub use domain::ports::{Clock, IdentifierResolver, SchemaValidator, ValidationReport};
pub use domain::rdp::{RdpFactory, RdpPreset, ResearchDataProduct};
pub use domain::service::{Service, ServiceBundle};
pub use utils::error::{RdpError, Result};
