//! One complete set of registries produced by a single load

use super::{AsnRange, Registry};
use crate::net::AddressBlock;
use crate::types::{Category, RegistryKind};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// All four registries from one load.
///
/// Built once by the loader and then only read. A category whose document
/// could not be fetched is listed in `missing` and contributes no entries.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub dns: Registry<String>,
    pub ip: Registry<AddressBlock>,
    pub asn: Registry<AsnRange>,
    pub object_tags: Registry<String>,
    /// `publication` field of each loaded document, when present
    pub publications: HashMap<Category, String>,
    pub missing: Vec<Category>,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            dns: Registry::new(),
            ip: Registry::new(),
            asn: Registry::new(),
            object_tags: Registry::new(),
            publications: HashMap::new(),
            missing: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Number of entries in one registry
    pub fn entry_count(&self, kind: RegistryKind) -> usize {
        match kind {
            RegistryKind::Dns => self.dns.len(),
            RegistryKind::Ip => self.ip.len(),
            RegistryKind::Asn => self.asn.len(),
            RegistryKind::ObjectTags => self.object_tags.len(),
        }
    }

    /// Entry counts of all registries, in a fixed order
    pub fn entry_counts(&self) -> [(RegistryKind, usize); 4] {
        [
            RegistryKind::Dns,
            RegistryKind::Ip,
            RegistryKind::Asn,
            RegistryKind::ObjectTags,
        ]
        .map(|kind| (kind, self.entry_count(kind)))
    }

    /// Whether every document was loaded
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
