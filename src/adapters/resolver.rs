use crate::domain::pid::{PersistentIdentifier, PidKind};
use crate::domain::ports::IdentifierResolver;
use url::Url;

pub const DOI_PROXY: &str = "https://doi.org/";
pub const HANDLE_PROXY: &str = "https://hdl.handle.net/";

/// Resolves DOIs and Handles through their public proxies; URLs resolve to themselves.
#[derive(Debug, Clone)]
pub struct ProxyResolver {
    doi_proxy: String,
    handle_proxy: String,
}

impl ProxyResolver {
    pub fn new(doi_proxy: impl Into<String>, handle_proxy: impl Into<String>) -> Self {
        Self {
            doi_proxy: doi_proxy.into(),
            handle_proxy: handle_proxy.into(),
        }
    }
}

impl Default for ProxyResolver {
    fn default() -> Self {
        Self::new(DOI_PROXY, HANDLE_PROXY)
    }
}

impl IdentifierResolver for ProxyResolver {
    fn resolve(&self, pid: &PersistentIdentifier) -> Option<Url> {
        let location = match pid.kind() {
            PidKind::Doi => format!("{}{}", self.doi_proxy, pid.value()),
            PidKind::Handle => format!("{}{}", self.handle_proxy, pid.value()),
            PidKind::Url => pid.value().to_string(),
        };
        Url::parse(&location).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_through_proxies() {
        let resolver = ProxyResolver::default();
        let doi = PersistentIdentifier::parse("10.5281/zenodo.3490396").unwrap();
        assert_eq!(
            resolver.resolve(&doi).unwrap().as_str(),
            "https://doi.org/10.5281/zenodo.3490396"
        );
        let handle = PersistentIdentifier::parse("20.500.12345/abc").unwrap();
        assert_eq!(
            resolver.resolve(&handle).unwrap().as_str(),
            "https://hdl.handle.net/20.500.12345/abc"
        );
        let url = PersistentIdentifier::parse("https://example.org/rdp/1").unwrap();
        assert_eq!(resolver.resolve(&url).unwrap().as_str(), "https://example.org/rdp/1");
    }

    #[test]
    fn test_custom_proxy() {
        let resolver = ProxyResolver::new("https://dx.doi.org/", HANDLE_PROXY);
        let doi = PersistentIdentifier::parse("10.1234/example").unwrap();
        assert_eq!(
            resolver.resolve(&doi).unwrap().as_str(),
            "https://dx.doi.org/10.1234/example"
        );
    }
}
