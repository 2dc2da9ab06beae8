use crate::core::SnapshotCell;
use crate::domain::datacite::{DataCite, DATACITE_SCHEMA};
use crate::domain::model::{self, Content, Value};
use crate::domain::ports::{Clock, SchemaValidator, ValidationReport};
use crate::utils::error::{RdpError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// One metadata record, validated against its schema when created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadatum {
    schema_ref: String,
    created_at: DateTime<Utc>,
    content: Content,
    #[serde(skip)]
    report: ValidationReport,
}

impl Metadatum {
    /// Fails with `SchemaValidationError` when `content` does not conform to `schema_ref`.
    pub fn create(
        content: Content,
        schema_ref: &str,
        validator: &dyn SchemaValidator,
        clock: &dyn Clock,
    ) -> Result<Self> {
        let report = validator.validate(&content, schema_ref);
        if !report.valid {
            let errors = if report.messages.is_empty() {
                vec!["content rejected by validator".to_string()]
            } else {
                report.messages
            };
            tracing::debug!("Rejected metadata for '{}': {:?}", schema_ref, errors);
            return Err(RdpError::SchemaValidationError {
                schema_ref: schema_ref.to_string(),
                errors,
            });
        }

        Ok(Self {
            schema_ref: schema_ref.to_string(),
            created_at: clock.now(),
            content,
            report,
        })
    }

    pub fn schema_ref(&self) -> &str {
        &self.schema_ref
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Value at a dotted path, e.g. `"creator.name"`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        model::lookup(&self.content, path)
    }

    /// Typed accessors, for records of the `datacite` schema only.
    pub fn datacite(&self) -> Option<DataCite<'_>> {
        (self.schema_ref == DATACITE_SCHEMA).then(|| DataCite::new(&self.content))
    }

    pub fn is_valid(&self) -> bool {
        self.report.valid
    }

    /// Diagnostics the validator attached to an accepted record.
    pub fn validation_messages(&self) -> &[String] {
        &self.report.messages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataAdd {
    Added,
    /// An entry with the same schema and timestamp was superseded.
    Replaced,
}

/// Metadata records of a product, possibly several per schema, in insertion order.
#[derive(Debug, Default)]
pub struct MetadataBundle {
    entries: SnapshotCell<Vec<Arc<Metadatum>>>,
}

impl MetadataBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, metadatum: Metadatum) -> MetadataAdd {
        let schema_ref = metadatum.schema_ref.clone();
        let outcome = self.entries.modify(|entries| {
            let clash = entries.iter().position(|m| {
                m.schema_ref == metadatum.schema_ref && m.created_at == metadatum.created_at
            });
            match clash {
                Some(i) => {
                    entries.remove(i);
                    entries.push(Arc::new(metadatum));
                    MetadataAdd::Replaced
                }
                None => {
                    entries.push(Arc::new(metadatum));
                    MetadataAdd::Added
                }
            }
        });
        tracing::debug!("Metadata '{}' -> {:?}", schema_ref, outcome);
        outcome
    }

    /// Most recent record for `schema_ref`.
    pub fn for_schema(&self, schema_ref: &str) -> Option<Arc<Metadatum>> {
        let snapshot = self.entries.load();
        snapshot
            .iter()
            .filter(|m| m.schema_ref == schema_ref)
            .fold(None::<&Arc<Metadatum>>, |best, m| match best {
                Some(current) if current.created_at > m.created_at => Some(current),
                _ => Some(m),
            })
            .cloned()
    }

    /// Every record for `schema_ref`, oldest first.
    pub fn history(&self, schema_ref: &str) -> Vec<Arc<Metadatum>> {
        let mut records: Vec<_> = self
            .entries
            .load()
            .iter()
            .filter(|m| m.schema_ref == schema_ref)
            .cloned()
            .collect();
        records.sort_by_key(|m| m.created_at);
        records
    }

    pub fn schemas(&self) -> BTreeSet<String> {
        self.entries
            .load()
            .iter()
            .map(|m| m.schema_ref.clone())
            .collect()
    }

    pub fn entries(&self) -> Vec<Arc<Metadatum>> {
        self.entries.load().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use chrono::Duration;

    struct TitleRequired;

    impl SchemaValidator for TitleRequired {
        fn validate(&self, content: &Content, schema_ref: &str) -> ValidationReport {
            if content.contains_key("title") {
                ValidationReport::passed()
            } else {
                ValidationReport::failed(vec![format!("{}: missing field 'title'", schema_ref)])
            }
        }
    }

    fn content(title: &str) -> Content {
        let mut content = Content::new();
        content.insert("title".to_string(), title.into());
        content
    }

    #[test]
    fn test_invalid_content_fails_fast() {
        let clock = ManualClock::default();
        let err = Metadatum::create(Content::new(), "dublin-core", &TitleRequired, &clock)
            .unwrap_err();
        match err {
            RdpError::SchemaValidationError { schema_ref, errors } => {
                assert_eq!(schema_ref, "dublin-core");
                assert_eq!(errors, vec!["dublin-core: missing field 'title'".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_for_schema_returns_most_recent() {
        let clock = ManualClock::default();
        let bundle = MetadataBundle::new();
        bundle.add(Metadatum::create(content("first"), "dc", &TitleRequired, &clock).unwrap());
        clock.advance(Duration::minutes(1));
        bundle.add(Metadatum::create(content("second"), "dc", &TitleRequired, &clock).unwrap());
        bundle.add(Metadatum::create(content("other"), "datacite", &TitleRequired, &clock).unwrap());

        let latest = bundle.for_schema("dc").unwrap();
        assert_eq!(latest.get("title").and_then(Value::as_str), Some("second"));
        assert_eq!(bundle.history("dc").len(), 2);
        assert_eq!(bundle.len(), 3);
        assert!(bundle.for_schema("iso19115").is_none());
        assert_eq!(
            bundle.schemas().into_iter().collect::<Vec<_>>(),
            vec!["datacite".to_string(), "dc".to_string()]
        );
    }

    #[test]
    fn test_older_record_added_late_does_not_supersede() {
        let clock = ManualClock::default();
        let bundle = MetadataBundle::new();
        let old = Metadatum::create(content("old"), "dc", &TitleRequired, &clock).unwrap();
        clock.advance(Duration::seconds(10));
        let new = Metadatum::create(content("new"), "dc", &TitleRequired, &clock).unwrap();
        bundle.add(new);
        bundle.add(old);
        let latest = bundle.for_schema("dc").unwrap();
        assert_eq!(latest.get("title").and_then(Value::as_str), Some("new"));
    }

    #[test]
    fn test_same_schema_and_timestamp_keeps_latest_added() {
        let clock = ManualClock::default();
        let bundle = MetadataBundle::new();
        let a = Metadatum::create(content("a"), "dc", &TitleRequired, &clock).unwrap();
        let b = Metadatum::create(content("b"), "dc", &TitleRequired, &clock).unwrap();
        assert_eq!(bundle.add(a), MetadataAdd::Added);
        assert_eq!(bundle.add(b), MetadataAdd::Replaced);
        assert_eq!(bundle.len(), 1);
        let only = bundle.for_schema("dc").unwrap();
        assert_eq!(only.get("title").and_then(Value::as_str), Some("b"));
        assert!(only.is_valid());
    }

    #[test]
    fn test_datacite_view_only_for_datacite_records() {
        let clock = ManualClock::default();
        let dc = Metadatum::create(content("x"), "dublin-core", &TitleRequired, &clock).unwrap();
        assert!(dc.datacite().is_none());

        let mut c = Content::new();
        c.insert("titles".to_string(), Value::from(vec![Value::from("A title")]));
        c.insert("title".to_string(), "ignored by the view".into());
        let record = Metadatum::create(c, "datacite", &TitleRequired, &clock).unwrap();
        let view = record.datacite().unwrap();
        assert_eq!(view.titles()[0].text, "A title");
    }

    #[test]
    fn test_nested_get() {
        let clock = ManualClock::default();
        let mut c = content("x");
        let mut creator = Content::new();
        creator.insert("name".to_string(), "Weber, Tobias".into());
        c.insert("creator".to_string(), creator.into());
        let m = Metadatum::create(c, "dc", &TitleRequired, &clock).unwrap();
        assert_eq!(m.get("creator.name").and_then(Value::as_str), Some("Weber, Tobias"));
        assert!(m.get("creator.orcid").is_none());
    }
}
