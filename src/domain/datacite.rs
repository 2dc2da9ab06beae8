//! Typed view over a DataCite metadata record.
//!
//! Content follows the shape an XML-to-mapping conversion produces: XML
//! attributes are keys prefixed with `@` (the bare name is accepted too), and
//! element text sits either under the element's own name or under `#text`.
//! Container elements such as `titles` may wrap their children (`title`) or
//! hold them directly, and every repeatable child may be a single value or a
//! sequence. Entries that cannot be read are skipped rather than reported;
//! conformance is the schema validator's job.

use crate::domain::model::{Content, Scalar, Value};
use crate::utils::dates::DateValue;
use serde::Serialize;

pub const DATACITE_SCHEMA: &str = "datacite";

const SPDX_LICENSES: &str = "https://spdx.org/licenses";
const ORCID_ORG: &str = "https://orcid.org";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub text: String,
    pub title_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub text: String,
    pub description_type: Option<String>,
}

/// License or access statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rights {
    pub text: Option<String>,
    pub uri: Option<String>,
    /// SPDX license id, e.g. `CC-BY-4.0`
    pub spdx: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub text: String,
    pub scheme: Option<String>,
    pub scheme_uri: Option<String>,
    pub value_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub affiliations: Vec<String>,
    pub orcid: Option<String>,
    /// Only set for contributors
    pub contributor_type: Option<String>,
}

impl Person {
    /// Splits "Family, Given" names; other forms leave both parts empty.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let (family_name, given_name) = match name.split_once(", ") {
            Some((family, given)) => (Some(family.to_string()), Some(given.to_string())),
            None => (None, None),
        };
        Self {
            name,
            given_name,
            family_name,
            affiliations: Vec::new(),
            orcid: None,
            contributor_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersonOrInstitution {
    Person(Person),
    Institution {
        name: String,
        contributor_type: Option<String>,
    },
}

impl PersonOrInstitution {
    pub fn name(&self) -> &str {
        match self {
            PersonOrInstitution::Person(person) => &person.name,
            PersonOrInstitution::Institution { name, .. } => name,
        }
    }

    pub fn contributor_type(&self) -> Option<&str> {
        match self {
            PersonOrInstitution::Person(person) => person.contributor_type.as_deref(),
            PersonOrInstitution::Institution {
                contributor_type, ..
            } => contributor_type.as_deref(),
        }
    }

    pub fn as_person(&self) -> Option<&Person> {
        match self {
            PersonOrInstitution::Person(person) => Some(person),
            PersonOrInstitution::Institution { .. } => None,
        }
    }
}

/// A dated event of the record; `value` may be a `start/end` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Date {
    pub value: DateValue,
    pub date_type: Option<String>,
    pub information: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedResource {
    pub pid: String,
    pub pid_type: Option<String>,
    pub relation_type: Option<String>,
    pub scheme_uri: Option<String>,
    pub scheme_type: Option<String>,
}

/// A repeatable element: a single value or a sequence. Nulls are dropped.
pub fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Sequence(items)) => items.iter().filter(|v| !is_null(v)).collect(),
        Some(Value::Scalar(Scalar::Null)) | None => Vec::new(),
        Some(single) => vec![single],
    }
}

/// Children of a container element: unwraps `container.child` when the
/// container is a mapping, otherwise takes the container's value as is.
pub fn entries<'a>(value: Option<&'a Value>, child: &str) -> Vec<&'a Value> {
    match value {
        Some(Value::Mapping(map)) => one_or_many(map.get(child)),
        other => one_or_many(other),
    }
}

/// Text of an element: the value itself, or its `key` / `#text` entry.
pub fn text_of<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    match value {
        Value::Scalar(Scalar::Text(s)) => Some(s),
        Value::Mapping(map) => map
            .get(key)
            .or_else(|| map.get("#text"))
            .and_then(Value::as_str),
        _ => None,
    }
}

fn is_null(value: &Value) -> bool {
    matches!(value, Value::Scalar(Scalar::Null))
}

fn attr<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    let map = value.as_mapping()?;
    map.get(&format!("@{}", name))
        .or_else(|| map.get(name))
        .and_then(Value::as_str)
}

fn owned_attr(value: &Value, name: &str) -> Option<String> {
    attr(value, name).map(str::to_string)
}

fn child_text(value: &Value, key: &str) -> Option<String> {
    value
        .as_mapping()?
        .get(key)
        .and_then(|v| text_of(v, key))
        .map(str::to_string)
}

fn person_or_institution(entry: &Value, name_key: &str) -> PersonOrInstitution {
    let name_field = match entry {
        Value::Mapping(map) => map
            .get(name_key)
            .or_else(|| map.get("creatorName"))
            .or_else(|| map.get("contributorName")),
        text => Some(text),
    };
    let contributor_type = owned_attr(entry, "contributorType");

    if let Some(field) = name_field {
        if attr(field, "nameType") == Some("Organizational") {
            return PersonOrInstitution::Institution {
                name: text_of(field, name_key).unwrap_or_default().to_string(),
                contributor_type,
            };
        }
    }

    let name = name_field
        .and_then(|field| text_of(field, name_key))
        .unwrap_or_default();
    let mut person = Person::new(name);
    person.contributor_type = contributor_type;

    if let Value::Mapping(map) = entry {
        person.affiliations = one_or_many(map.get("affiliation"))
            .into_iter()
            .filter_map(|a| text_of(a, "affiliation"))
            .map(str::to_string)
            .collect();
        // explicit name parts win over the split
        if let Some(family) = child_text(entry, "familyName") {
            person.family_name = Some(family);
        }
        if let Some(given) = child_text(entry, "givenName") {
            person.given_name = Some(given);
        }
        person.orcid = one_or_many(map.get("nameIdentifier"))
            .into_iter()
            .filter(|ni| {
                attr(ni, "nameIdentifierScheme").is_some_and(|s| s.eq_ignore_ascii_case("orcid"))
                    || attr(ni, "schemeURI").is_some_and(|s| s.starts_with(ORCID_ORG))
            })
            .filter_map(|ni| text_of(ni, "nameIdentifier"))
            .last()
            .map(str::to_string);
    }

    PersonOrInstitution::Person(person)
}

/// Read-only accessors over DataCite content.
#[derive(Debug, Clone, Copy)]
pub struct DataCite<'a> {
    content: &'a Content,
}

impl<'a> DataCite<'a> {
    pub fn new(content: &'a Content) -> Self {
        Self { content }
    }

    fn field(&self, name: &str) -> Option<&'a Value> {
        self.content.get(name)
    }

    fn scalar_text(&self, name: &str) -> Option<String> {
        self.field(name)
            .and_then(|v| text_of(v, name))
            .map(str::to_string)
    }

    fn texts(&self, container: &str, child: &str) -> Vec<String> {
        entries(self.field(container), child)
            .into_iter()
            .filter_map(|v| text_of(v, child))
            .map(str::to_string)
            .collect()
    }

    /// The record's own identifier.
    pub fn pid(&self) -> Option<String> {
        self.scalar_text("identifier")
    }

    pub fn titles(&self) -> Vec<Title> {
        entries(self.field("titles"), "title")
            .into_iter()
            .filter_map(|t| {
                Some(Title {
                    text: text_of(t, "title")?.to_string(),
                    title_type: owned_attr(t, "titleType"),
                })
            })
            .collect()
    }

    pub fn descriptions(&self) -> Vec<Description> {
        entries(self.field("descriptions"), "description")
            .into_iter()
            .filter_map(|d| {
                Some(Description {
                    text: text_of(d, "description")?.to_string(),
                    description_type: owned_attr(d, "descriptionType"),
                })
            })
            .collect()
    }

    pub fn formats(&self) -> Vec<String> {
        self.texts("formats", "format")
    }

    pub fn sizes(&self) -> Vec<String> {
        self.texts("sizes", "size")
    }

    pub fn rights(&self) -> Vec<Rights> {
        entries(self.field("rightsList"), "rights")
            .into_iter()
            .map(|r| {
                let spdx_scheme = attr(r, "schemeURI").is_some_and(|s| s.starts_with(SPDX_LICENSES))
                    || attr(r, "rightsIdentifierScheme")
                        .is_some_and(|s| s.eq_ignore_ascii_case("spdx"));
                Rights {
                    text: text_of(r, "rights").map(str::to_string),
                    uri: owned_attr(r, "rightsURI"),
                    spdx: if spdx_scheme {
                        owned_attr(r, "rightsIdentifier")
                    } else {
                        None
                    },
                }
            })
            .collect()
    }

    pub fn subjects(&self) -> Vec<Subject> {
        entries(self.field("subjects"), "subject")
            .into_iter()
            .filter_map(|s| {
                Some(Subject {
                    text: text_of(s, "subject")?.to_string(),
                    scheme: owned_attr(s, "subjectScheme"),
                    scheme_uri: owned_attr(s, "schemeURI"),
                    value_uri: owned_attr(s, "valueURI"),
                })
            })
            .collect()
    }

    pub fn creators(&self) -> Vec<PersonOrInstitution> {
        entries(self.field("creators"), "creator")
            .into_iter()
            .map(|p| person_or_institution(p, "creatorName"))
            .collect()
    }

    pub fn contributors(&self) -> Vec<PersonOrInstitution> {
        entries(self.field("contributors"), "contributor")
            .into_iter()
            .map(|p| person_or_institution(p, "contributorName"))
            .collect()
    }

    pub fn language(&self) -> Option<String> {
        self.scalar_text("language")
    }

    pub fn version(&self) -> Option<String> {
        self.scalar_text("version")
    }

    /// Accepts an integer or numeric text.
    pub fn publication_year(&self) -> Option<i64> {
        let value = self.field("publicationYear")?;
        value
            .as_i64()
            .or_else(|| text_of(value, "publicationYear")?.trim().parse().ok())
    }

    /// Dates in supported W3CDTF formats; others are skipped.
    pub fn dates(&self) -> Vec<Date> {
        entries(self.field("dates"), "date")
            .into_iter()
            .filter_map(|d| {
                let value = DateValue::parse(text_of(d, "date")?).ok()?;
                Some(Date {
                    value,
                    date_type: owned_attr(d, "dateType"),
                    information: owned_attr(d, "dateInformation"),
                })
            })
            .collect()
    }

    /// `resourceTypeGeneral` of the record, e.g. `Dataset`.
    pub fn resource_type(&self) -> Option<String> {
        self.field("resourceType")
            .and_then(|v| attr(v, "resourceTypeGeneral"))
            .map(str::to_string)
    }

    pub fn related_resources(&self) -> Vec<RelatedResource> {
        entries(self.field("relatedIdentifiers"), "relatedIdentifier")
            .into_iter()
            .filter_map(|ri| {
                Some(RelatedResource {
                    pid: text_of(ri, "relatedIdentifier")?.to_string(),
                    pid_type: owned_attr(ri, "relatedIdentifierType"),
                    relation_type: owned_attr(ri, "relationType"),
                    scheme_uri: owned_attr(ri, "schemeURI"),
                    scheme_type: owned_attr(ri, "relatedMetadataScheme"),
                })
            })
            .collect()
    }
}
