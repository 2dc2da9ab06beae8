use crate::domain::datacite::{self, DATACITE_SCHEMA};
use crate::domain::model::{self, Content, Scalar, Value};
use crate::domain::ports::{SchemaValidator, ValidationReport};
use crate::utils::dates::DateValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Number,
    Boolean,
    /// Integer, or text holding one (XML-derived records carry years as text).
    Year,
    /// W3CDTF date or `start/end` range, as text.
    Date,
    /// One or more W3CDTF dates, bare or wrapped as `{ date = [...] }`.
    DateList,
    Sequence,
    Mapping,
    Any,
}

impl FieldType {
    fn check(&self, value: &Value) -> Result<(), String> {
        let ok = match (self, value) {
            (FieldType::Any, _) => true,
            (FieldType::Text, Value::Scalar(Scalar::Text(_))) => true,
            (FieldType::Integer, Value::Scalar(Scalar::Integer(_))) => true,
            (FieldType::Number, Value::Scalar(Scalar::Integer(_) | Scalar::Float(_))) => true,
            (FieldType::Boolean, Value::Scalar(Scalar::Bool(_))) => true,
            (FieldType::Year, Value::Scalar(Scalar::Integer(_))) => true,
            (FieldType::Year, Value::Scalar(Scalar::Text(s))) => {
                s.trim().parse::<i64>().is_ok()
            }
            (FieldType::Sequence, Value::Sequence(_)) => true,
            (FieldType::Mapping, Value::Mapping(_)) => true,
            (FieldType::Date, Value::Scalar(Scalar::Text(s))) => {
                return DateValue::parse(s).map(|_| ()).map_err(|e| e.to_string());
            }
            (
                FieldType::DateList,
                Value::Sequence(_) | Value::Mapping(_) | Value::Scalar(Scalar::Text(_)),
            ) => {
                for item in datacite::entries(Some(value), "date") {
                    let text = datacite::text_of(item, "date")
                        .ok_or_else(|| format!("date entry has no text: {}", item.type_name()))?;
                    DateValue::parse(text).map_err(|e| e.to_string())?;
                }
                return Ok(());
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("expected {:?}, found {}", self, value.type_name()))
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Scalar(Scalar::Null) => true,
        Value::Scalar(Scalar::Text(s)) => s.trim().is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Scalar(_) => false,
    }
}

/// Required fields plus expected field types, addressed by dotted path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldType>,
}

impl SchemaDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn require(mut self, path: &str, field_type: FieldType) -> Self {
        self.required.push(path.to_string());
        self.fields.insert(path.to_string(), field_type);
        self
    }

    pub fn optional(mut self, path: &str, field_type: FieldType) -> Self {
        self.fields.insert(path.to_string(), field_type);
        self
    }

    pub fn dublin_core() -> Self {
        Self::new("dublin-core")
            .require("title", FieldType::Any)
            .optional("creator", FieldType::Any)
            .optional("date", FieldType::Date)
            .optional("identifier", FieldType::Text)
    }

    /// Mandatory DataCite properties, with key names as in the DataCite XML.
    /// Containers may be flat sequences or wrap their children, as in
    /// [`DataCite`](crate::domain::datacite::DataCite).
    pub fn datacite() -> Self {
        Self::new(DATACITE_SCHEMA)
            .require("identifier", FieldType::Any)
            .require("creators", FieldType::Any)
            .require("titles", FieldType::Any)
            .require("publisher", FieldType::Any)
            .require("publicationYear", FieldType::Year)
            .optional("dates", FieldType::DateList)
    }

    pub fn check(&self, content: &Content) -> Vec<String> {
        let mut messages = Vec::new();
        for path in &self.required {
            match model::lookup(content, path) {
                None => messages.push(format!("missing required field '{}'", path)),
                Some(value) if is_blank(value) => {
                    messages.push(format!("required field '{}' is empty", path))
                }
                Some(_) => {}
            }
        }
        for (path, field_type) in &self.fields {
            if let Some(value) = model::lookup(content, path) {
                if let Value::Scalar(Scalar::Null) = value {
                    continue;
                }
                if let Err(reason) = field_type.check(value) {
                    messages.push(format!("field '{}': {}", path, reason));
                }
            }
        }
        messages
    }
}

/// Schema definitions keyed by schema reference.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, SchemaDefinition>,
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// `dublin-core` and `datacite`.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SchemaDefinition::dublin_core());
        registry.register(SchemaDefinition::datacite());
        registry
    }

    /// Adds `definition`, replacing any previous one with the same name.
    pub fn register(&mut self, definition: SchemaDefinition) {
        tracing::debug!("Registering schema '{}'", definition.name);
        self.schemas.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDefinition> {
        self.schemas.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}

impl SchemaValidator for SchemaRegistry {
    fn validate(&self, content: &Content, schema_ref: &str) -> ValidationReport {
        let Some(definition) = self.schemas.get(schema_ref) else {
            return ValidationReport::failed(vec![format!("unknown schema '{}'", schema_ref)]);
        };
        let messages = definition.check(content);
        if messages.is_empty() {
            ValidationReport::passed()
        } else {
            ValidationReport::failed(messages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(json: serde_json::Value) -> Content {
        match Value::from(json) {
            Value::Mapping(map) => map,
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_dublin_core_requires_title() {
        let registry = SchemaRegistry::with_builtin();
        assert!(registry.validate(&content(serde_json::json!({"title": "x"})), "dublin-core").valid);

        let report = registry.validate(&content(serde_json::json!({"creator": "y"})), "dublin-core");
        assert!(!report.valid);
        assert_eq!(report.messages, vec!["missing required field 'title'".to_string()]);

        let report = registry.validate(&content(serde_json::json!({"title": "  "})), "dublin-core");
        assert_eq!(report.messages, vec!["required field 'title' is empty".to_string()]);
    }

    #[test]
    fn test_datacite_types_and_dates() {
        let registry = SchemaRegistry::with_builtin();
        let good = content(serde_json::json!({
            "identifier": {"identifier": "10.5281/zenodo.3490396", "identifierType": "DOI"},
            "creators": [{"creatorName": "Weber, Tobias"}],
            "titles": ["s-sized Training and Evaluation Data"],
            "publisher": "Zenodo",
            "publicationYear": 2019,
            "dates": ["2019-10-16", "2018-01/2019-06"]
        }));
        let report = registry.validate(&good, "datacite");
        assert!(report.valid, "{:?}", report.messages);

        let bad = content(serde_json::json!({
            "identifier": "10.5281/zenodo.3490396",
            "creators": [],
            "titles": ["t"],
            "publisher": "Zenodo",
            "publicationYear": "MMXIX",
            "dates": ["2019-99"]
        }));
        let report = registry.validate(&bad, "datacite");
        assert!(!report.valid);
        assert_eq!(
            report.messages,
            vec![
                "required field 'creators' is empty".to_string(),
                "field 'dates': '2019-99' is not in a supported format".to_string(),
                "field 'publicationYear': expected Year, found text".to_string(),
            ]
        );
    }

    #[test]
    fn test_datacite_accepts_wrapped_xml_shape() {
        let registry = SchemaRegistry::with_builtin();
        let wrapped = content(serde_json::json!({
            "identifier": {"@identifierType": "DOI", "#text": "10.5281/zenodo.3490396"},
            "creators": {"creator": {"creatorName": "Weber, Tobias"}},
            "titles": {"title": "survey.csv"},
            "publisher": "Zenodo",
            "publicationYear": "2019",
            "dates": {"date": [
                {"@dateType": "Issued", "#text": "2019-10-15"},
                "2019-03-01/2019-03-04"
            ]}
        }));
        let report = registry.validate(&wrapped, "datacite");
        assert!(report.valid, "{:?}", report.messages);

        let mut bad_date = wrapped.clone();
        bad_date.insert(
            "dates".to_string(),
            Value::from(serde_json::json!({"date": {"@dateType": "Issued", "#text": "2019-13"}})),
        );
        assert_eq!(
            registry.validate(&bad_date, "datacite").messages,
            vec!["field 'dates': '2019-13' is not in a supported format".to_string()]
        );
    }

    #[test]
    fn test_unknown_schema_is_invalid() {
        let registry = SchemaRegistry::with_builtin();
        let report = registry.validate(&Content::new(), "iso19115");
        assert!(!report.valid);
        assert_eq!(report.messages, vec!["unknown schema 'iso19115'".to_string()]);
    }

    #[test]
    fn test_register_replaces_and_nested_paths() {
        let mut registry = SchemaRegistry::empty();
        registry.register(SchemaDefinition::new("custom").require("a", FieldType::Text));
        registry.register(
            SchemaDefinition::new("custom").require("project.name", FieldType::Text),
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["custom"]);

        let ok = content(serde_json::json!({"project": {"name": "RDP"}}));
        assert!(registry.validate(&ok, "custom").valid);
        let wrong = content(serde_json::json!({"project": {"name": 3}}));
        assert_eq!(
            registry.validate(&wrong, "custom").messages,
            vec!["field 'project.name': expected Text, found integer".to_string()]
        );
    }

    #[test]
    fn test_definition_from_toml() {
        let definition: SchemaDefinition = toml::from_str(
            r#"
            name = "project"
            required = ["title"]
            [fields]
            title = "text"
            started = "date"
            "#,
        )
        .unwrap();
        assert_eq!(definition.fields.get("started"), Some(&FieldType::Date));
        assert_eq!(definition.required, vec!["title".to_string()]);
    }
}
