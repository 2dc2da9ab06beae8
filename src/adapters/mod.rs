// Adapters layer: concrete implementations of the domain ports (clock, schema validation, resolution).

pub mod clock;
pub mod export;
pub mod resolver;
pub mod schema;

pub use clock::{ManualClock, SystemClock};
pub use resolver::ProxyResolver;
pub use schema::{FieldType, SchemaDefinition, SchemaRegistry};

use crate::domain::rdp::RdpFactory;
use std::sync::Arc;

impl Default for RdpFactory {
    /// Wall clock and the built-in schema definitions.
    fn default() -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(SchemaRegistry::with_builtin()),
        )
    }
}
