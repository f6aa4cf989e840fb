//! IANA bootstrap document format (RFC 9224)

use crate::error::{BootstrapError, Result};
use crate::types::Category;
use serde::Deserialize;

/// A bootstrap document as published by IANA.
///
/// Each service is a list of string lists: the resource keys and the
/// candidate base URLs sit at the offsets given by
/// [`Category::service_offsets`].
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapDocument {
    #[serde(default)]
    pub publication: Option<String>,
    pub services: Vec<Vec<Vec<String>>>,
}

/// A resource key paired with the base URL chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry<'a> {
    pub resource: &'a str,
    pub base_url: String,
}

impl BootstrapDocument {
    /// Decode the JSON body of one document
    pub fn parse(category: Category, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BootstrapError::parse_failed(category, e.to_string()))
    }

    /// Flatten the services into `(resource, base URL)` pairs in document order
    pub fn entries(&self, category: Category) -> Result<Vec<ServiceEntry<'_>>> {
        let (resource_at, urls_at) = category.service_offsets();
        let mut entries = Vec::new();

        for (index, service) in self.services.iter().enumerate() {
            let (resources, urls) = match (service.get(resource_at), service.get(urls_at)) {
                (Some(resources), Some(urls)) => (resources, urls),
                _ => {
                    return Err(BootstrapError::parse_failed(
                        category,
                        format!("service {} has {} fields", index, service.len()),
                    ))
                }
            };

            let base_url = choose_url(urls).ok_or_else(|| {
                BootstrapError::parse_failed(category, format!("service {} lists no URLs", index))
            })?;

            entries.extend(resources.iter().map(|resource| ServiceEntry {
                resource: resource.as_str(),
                base_url: base_url.clone(),
            }));
        }

        Ok(entries)
    }
}

/// Pick the first HTTPS URL, falling back to the first URL, without trailing
/// slashes.
pub fn choose_url(urls: &[String]) -> Option<String> {
    urls.iter()
        .find(|url| url.starts_with("https://"))
        .or_else(|| urls.first())
        .map(|url| url.trim_end_matches('/').to_string())
}
