use crate::utils::error::{RdpError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Parses `url_str` as an absolute URL. An empty `allowed_schemes` accepts any scheme.
pub fn validate_url(field_name: &str, url_str: &str, allowed_schemes: &[&str]) -> Result<Url> {
    if url_str.trim().is_empty() {
        return Err(RdpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => {
            if allowed_schemes.is_empty() || allowed_schemes.contains(&url.scheme()) {
                Ok(url)
            } else {
                Err(RdpError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: url_str.to_string(),
                    reason: format!(
                        "Unsupported URL scheme: {}. Allowed schemes: {}",
                        url.scheme(),
                        allowed_schemes.join(", ")
                    ),
                })
            }
        }
        Err(e) => Err(RdpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RdpError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique_names<'a, I>(field_name: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RdpError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.to_string(),
                reason: "Duplicate name".to_string(),
            });
        }
    }
    Ok(())
}
