use crate::utils::error::{RdpError, Result};
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use url::Url;

fn doi_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("static regex"))
}

fn handle_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)*/\S+$").expect("static regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PidKind {
    Doi,
    Handle,
    Url,
}

impl PidKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PidKind::Doi => "DOI",
            PidKind::Handle => "Handle",
            PidKind::Url => "URL",
        }
    }
}

impl fmt::Display for PidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PidKind {
    type Err = RdpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doi" => Ok(PidKind::Doi),
            "handle" | "hdl" => Ok(PidKind::Handle),
            "url" | "uri" => Ok(PidKind::Url),
            other => Err(RdpError::InvalidConfigValueError {
                field: "product.kind".to_string(),
                value: other.to_string(),
                reason: "Expected one of: doi, handle, url".to_string(),
            }),
        }
    }
}

/// A DOI, Handle or URL naming a research data product.
///
/// `value()` returns the string exactly as given; equality and hashing use the
/// normalized form (case-folded DOI/Handle, canonical URL serialization).
#[derive(Debug, Clone)]
pub struct PersistentIdentifier {
    kind: PidKind,
    value: String,
    normalized: String,
}

impl PersistentIdentifier {
    pub fn create(kind: PidKind, value: &str) -> Result<Self> {
        let invalid = || RdpError::InvalidIdentifierFormat {
            kind: kind.to_string(),
            value: value.to_string(),
        };

        let normalized = match kind {
            PidKind::Doi if doi_grammar().is_match(value) => value.to_lowercase(),
            PidKind::Handle if handle_grammar().is_match(value) => value.to_lowercase(),
            PidKind::Url if value.trim() == value && !value.is_empty() => {
                Url::parse(value).map_err(|_| invalid())?.to_string()
            }
            _ => return Err(invalid()),
        };

        Ok(Self {
            kind,
            value: value.to_string(),
            normalized,
        })
    }

    /// Infers the kind, trying DOI, then Handle, then URL.
    pub fn parse(value: &str) -> Result<Self> {
        [PidKind::Doi, PidKind::Handle]
            .into_iter()
            .find_map(|kind| Self::create(kind, value).ok())
            .map_or_else(|| Self::create(PidKind::Url, value), Ok)
    }

    pub fn kind(&self) -> PidKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Suffix after the first `/` for DOIs and Handles.
    pub fn suffix(&self) -> Option<&str> {
        match self.kind {
            PidKind::Doi | PidKind::Handle => self.value.split_once('/').map(|(_, s)| s),
            PidKind::Url => None,
        }
    }
}

impl PartialEq for PersistentIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.normalized == other.normalized
    }
}

impl Eq for PersistentIdentifier {}

impl Hash for PersistentIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.normalized.hash(state);
    }
}

impl fmt::Display for PersistentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PidKind::Doi => write!(f, "doi:{}", self.value),
            PidKind::Handle => write!(f, "hdl:{}", self.value),
            PidKind::Url => f.write_str(&self.value),
        }
    }
}

impl Serialize for PersistentIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PersistentIdentifier", 2)?;
        state.serialize_field("kind", self.kind.as_str())?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers_round_trip() {
        let cases = [
            (PidKind::Doi, "10.1234/example"),
            (PidKind::Doi, "10.5281/zenodo.3490396"),
            (PidKind::Handle, "20.500.12345/ABC-1"),
            (PidKind::Handle, "11304/f3d3e4a2"),
            (PidKind::Url, "https://example.org/datasets/42"),
        ];
        for (kind, value) in cases {
            let pid = PersistentIdentifier::create(kind, value).unwrap();
            assert_eq!(pid.value(), value);
            assert_eq!(pid.kind(), kind);
        }
    }

    #[test]
    fn test_malformed_identifiers_are_rejected() {
        let cases = [
            (PidKind::Doi, "10.12/short-registrant"),
            (PidKind::Doi, "11.1234/wrong-directory"),
            (PidKind::Doi, "10.1234/"),
            (PidKind::Doi, "10.1234/has space"),
            (PidKind::Handle, "abc/def"),
            (PidKind::Handle, "12345"),
            (PidKind::Url, "not a url"),
            (PidKind::Url, ""),
            (PidKind::Url, " https://example.org"),
        ];
        for (kind, value) in cases {
            let err = PersistentIdentifier::create(kind, value).unwrap_err();
            assert!(
                matches!(err, RdpError::InvalidIdentifierFormat { .. }),
                "{} {:?}",
                kind,
                value
            );
        }
    }

    #[test]
    fn test_equality_uses_normalized_value() {
        let a = PersistentIdentifier::create(PidKind::Doi, "10.5281/Zenodo.1").unwrap();
        let b = PersistentIdentifier::create(PidKind::Doi, "10.5281/zenodo.1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.value(), "10.5281/Zenodo.1");

        let u1 = PersistentIdentifier::create(PidKind::Url, "HTTPS://Example.org").unwrap();
        let u2 = PersistentIdentifier::create(PidKind::Url, "https://example.org/").unwrap();
        assert_eq!(u1, u2);

        let handle = PersistentIdentifier::create(PidKind::Handle, "10.5281/zenodo.1").unwrap();
        assert_ne!(handle, b);
    }

    #[test]
    fn test_parse_infers_kind() {
        assert_eq!(PersistentIdentifier::parse("10.1234/example").unwrap().kind(), PidKind::Doi);
        assert_eq!(PersistentIdentifier::parse("21.11101/x").unwrap().kind(), PidKind::Handle);
        assert_eq!(
            PersistentIdentifier::parse("https://example.org/x").unwrap().kind(),
            PidKind::Url
        );
        assert!(PersistentIdentifier::parse("some_id").is_err());
    }

    #[test]
    fn test_display_and_suffix() {
        let pid = PersistentIdentifier::parse("10.5281/zenodo.3490396").unwrap();
        assert_eq!(pid.to_string(), "doi:10.5281/zenodo.3490396");
        assert_eq!(pid.suffix(), Some("zenodo.3490396"));
        assert_eq!(
            serde_json::to_value(&pid).unwrap(),
            serde_json::json!({"kind": "DOI", "value": "10.5281/zenodo.3490396"})
        );
    }
}
