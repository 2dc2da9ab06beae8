use crate::domain::model::Content;
use crate::domain::pid::PersistentIdentifier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// Source of creation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Outcome of checking metadata content against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl ValidationReport {
    pub fn passed() -> Self {
        Self {
            valid: true,
            messages: Vec::new(),
        }
    }

    pub fn failed(messages: Vec<String>) -> Self {
        Self {
            valid: false,
            messages,
        }
    }
}

pub trait SchemaValidator: Send + Sync {
    /// Must be deterministic for a given `(content, schema_ref)`.
    fn validate(&self, content: &Content, schema_ref: &str) -> ValidationReport;
}

/// Maps an identifier to a resolvable location such as a landing page.
pub trait IdentifierResolver: Send + Sync {
    fn resolve(&self, pid: &PersistentIdentifier) -> Option<Url>;
}
