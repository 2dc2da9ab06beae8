use crate::core::{OrderedSet, SnapshotCell};
use crate::utils::error::{RdpError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use url::Url;

const MEDIA_TYPES: [(&str, &str); 14] = [
    ("csv", "text/csv"),
    ("tsv", "text/tab-separated-values"),
    ("txt", "text/plain"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("nc", "application/x-netcdf"),
    ("h5", "application/x-hdf5"),
    ("parquet", "application/vnd.apache.parquet"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
];

fn guess_media_type(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    MEDIA_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
}

/// External data artifact: only its location and timestamp are held, never its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataReference {
    location: String,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_type: Option<&'static str>,
    #[serde(skip)]
    url: Url,
}

impl DataReference {
    pub fn create(location: &str, created_at: DateTime<Utc>) -> Result<Self> {
        let url = Url::parse(location).map_err(|e| RdpError::InvalidDataReference {
            reference: location.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(RdpError::InvalidDataReference {
                reference: location.to_string(),
                reason: "reference must be a hierarchical URI".to_string(),
            });
        }

        let media_type = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(guess_media_type);

        Ok(Self {
            location: location.to_string(),
            created_at,
            media_type,
            url,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn media_type(&self) -> Option<&'static str> {
        self.media_type
    }

    /// Last path segment, if non-empty.
    pub fn file_name(&self) -> Option<&str> {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
    }

    pub fn is_tabular(&self) -> bool {
        matches!(
            self.media_type,
            Some("text/csv") | Some("text/tab-separated-values")
        )
    }

    fn key(&self) -> (String, DateTime<Utc>) {
        (self.url.to_string(), self.created_at)
    }
}

/// Append-only set of data references, in insertion order.
#[derive(Debug, Default)]
pub struct DataBundle {
    references: SnapshotCell<OrderedSet<(String, DateTime<Utc>), Arc<DataReference>>>,
}

impl DataBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `location` and appends it. Returns `false` for an exact duplicate.
    pub fn add(&self, location: &str, created_at: DateTime<Utc>) -> Result<bool> {
        let reference = DataReference::create(location, created_at)?;
        Ok(self.add_reference(reference))
    }

    pub fn add_reference(&self, reference: DataReference) -> bool {
        let location = reference.location.clone();
        let inserted = self
            .references
            .modify(|set| set.insert(reference.key(), Arc::new(reference)));
        tracing::debug!("Data reference {} inserted: {}", location, inserted);
        inserted
    }

    pub fn references(&self) -> Vec<Arc<DataReference>> {
        self.references.load().iter().cloned().collect()
    }

    /// Every reference whose last path segment is `name`.
    pub fn by_file_name(&self, name: &str) -> Vec<Arc<DataReference>> {
        self.references
            .load()
            .iter()
            .filter(|r| r.file_name() == Some(name))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.references.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: &str) -> DateTime<Utc> {
        ts.parse().unwrap()
    }

    #[test]
    fn test_reference_well_formedness() {
        let t = at("2020-03-09T12:00:00Z");
        assert!(DataReference::create("https://zenodo.org/api/files/abc/survey.csv", t).is_ok());
        assert!(DataReference::create("s3://bucket/data/run-1.parquet", t).is_ok());
        for bad in ["survey.csv", "", "mailto:someone@example.org"] {
            assert!(
                matches!(
                    DataReference::create(bad, t),
                    Err(RdpError::InvalidDataReference { .. })
                ),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_media_type_and_file_name() {
        let t = at("2020-03-09T12:00:00Z");
        let csv = DataReference::create("https://example.org/files/Survey.CSV", t).unwrap();
        assert_eq!(csv.media_type(), Some("text/csv"));
        assert_eq!(csv.file_name(), Some("Survey.CSV"));
        assert!(csv.is_tabular());

        let pdf = DataReference::create("https://example.org/paper.pdf", t).unwrap();
        assert_eq!(pdf.media_type(), Some("application/pdf"));
        assert!(!pdf.is_tabular());

        let dir = DataReference::create("https://example.org/files/", t).unwrap();
        assert_eq!(dir.file_name(), None);
        assert_eq!(dir.media_type(), None);
    }

    #[test]
    fn test_bundle_is_append_only_set() {
        let bundle = DataBundle::new();
        let t1 = at("2020-01-01T00:00:00Z");
        let t2 = at("2021-01-01T00:00:00Z");
        assert!(bundle.add("https://example.org/a.csv", t1).unwrap());
        assert!(!bundle.add("https://example.org/a.csv", t1).unwrap());
        assert!(bundle.add("https://example.org/a.csv", t2).unwrap());
        assert!(bundle.add("https://example.org/b.json", t1).unwrap());
        assert!(bundle.add("not a reference", t1).is_err());

        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.by_file_name("a.csv").len(), 2);
        let order: Vec<_> = bundle
            .references()
            .iter()
            .map(|r| r.file_name().unwrap_or_default().to_string())
            .collect();
        assert_eq!(order, vec!["a.csv", "a.csv", "b.json"]);
    }
}
