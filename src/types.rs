//! Core types and structures for rdap-bootstrap

use crate::error::{BootstrapError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the IANA bootstrap documents
pub const IANA_BOOTSTRAP_URL: &str = "https://data.iana.org/rdap";

/// One IANA bootstrap document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Dns,
    Ipv4,
    Ipv6,
    Asn,
    ObjectTags,
}

impl Category {
    /// Fixed load order. `Ipv4` precedes `Ipv6`, which fixes the order of
    /// entries in the coalesced IP registry.
    pub const ALL: [Category; 5] = [
        Category::Dns,
        Category::Ipv4,
        Category::Ipv6,
        Category::Asn,
        Category::ObjectTags,
    ];

    /// Document identifier as used in the IANA file name
    pub fn id(&self) -> &'static str {
        match self {
            Category::Dns => "dns",
            Category::Ipv4 => "ipv4",
            Category::Ipv6 => "ipv6",
            Category::Asn => "asn",
            Category::ObjectTags => "object-tags",
        }
    }

    /// File name of the document, e.g. `ipv4.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id())
    }

    /// Registry this document contributes to
    pub fn registry_kind(&self) -> RegistryKind {
        match self {
            Category::Dns => RegistryKind::Dns,
            Category::Ipv4 | Category::Ipv6 => RegistryKind::Ip,
            Category::Asn => RegistryKind::Asn,
            Category::ObjectTags => RegistryKind::ObjectTags,
        }
    }

    /// Offsets of the resource list and the URL list inside a service entry.
    ///
    /// Object-tag services carry a leading contact list.
    pub fn service_offsets(&self) -> (usize, usize) {
        match self {
            Category::ObjectTags => (1, 2),
            _ => (0, 1),
        }
    }

    /// Recover the category from a document URL or path
    pub fn from_url(url: &str) -> Option<Category> {
        let name = url.rsplit('/').next()?;
        Category::ALL
            .into_iter()
            .find(|category| name == category.file_name())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Registry held by a snapshot. Both IP documents feed `Ip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryKind {
    Dns,
    Ip,
    Asn,
    ObjectTags,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryKind::Dns => write!(f, "dns"),
            RegistryKind::Ip => write!(f, "ip"),
            RegistryKind::Asn => write!(f, "asn"),
            RegistryKind::ObjectTags => write!(f, "object-tags"),
        }
    }
}

/// RDAP query type, i.e. the first path segment of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Domain,
    Entity,
    Autnum,
    Ip,
}

impl ObjectType {
    /// Parse a query type token, ignoring case
    pub fn parse(token: &str) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "domain" => Ok(ObjectType::Domain),
            "entity" => Ok(ObjectType::Entity),
            "autnum" => Ok(ObjectType::Autnum),
            "ip" => Ok(ObjectType::Ip),
            _ => Err(BootstrapError::bad_request(format!(
                "unsupported object type '{}'",
                token
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Domain => "domain",
            ObjectType::Entity => "entity",
            ObjectType::Autnum => "autnum",
            ObjectType::Ip => "ip",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for loading and refreshing the bootstrap registries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Base URL the `{category}.json` documents are fetched from
    pub base_url: String,
    /// Timeout applied to each document fetch
    pub fetch_timeout: Duration,
    /// Delay between the end of one refresh and the start of the next
    pub refresh_interval: Duration,
    pub user_agent: String,
    pub log_level: String,
    /// Address or CIDR literals whose clients are refused
    pub blocklist: Vec<String>,
    /// Read documents from this directory instead of fetching them
    pub data_dir: Option<PathBuf>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            base_url: IANA_BOOTSTRAP_URL.to_string(),
            fetch_timeout: Duration::from_secs(30),
            refresh_interval: Duration::from_secs(6 * 3600),
            user_agent: format!("rdap-bootstrap/{}", crate::VERSION),
            log_level: "info".to_string(),
            blocklist: Vec::new(),
            data_dir: None,
        }
    }
}

impl BootstrapConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset or blank variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = get("RDAP_BOOTSTRAP_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("RDAP_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout = parse_secs("RDAP_FETCH_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = get("RDAP_REFRESH_INTERVAL_SECS") {
            config.refresh_interval = parse_secs("RDAP_REFRESH_INTERVAL_SECS", &secs)?;
        }
        if let Some(agent) = get("RDAP_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(level) = get("RDAP_LOG_LEVEL") {
            config.log_level = level;
        }
        if let Some(dir) = get("RDAP_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(list) = get("IP_BLOCK_LIST") {
            config.blocklist = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    /// URL of one bootstrap document
    pub fn document_url(&self, category: Category) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), category.file_name())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(BootstrapError::config(format!(
            "{} must be a positive number of seconds, got '{}'",
            key, value
        ))),
    }
}
