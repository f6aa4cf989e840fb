//! Query resolution: maps an RDAP query to the base URL of its server

use crate::bootstrap::RegistrySet;
use crate::error::{BootstrapError, Result};
use crate::net::AddressBlock;
use crate::registry::Snapshot;
use crate::types::ObjectType;
use std::sync::Arc;

/// Successful resolution of one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Base URL of the authoritative RDAP server
    pub base_url: String,
    /// `{base_url}/{type}/{object}`, with the object exactly as queried
    pub redirect_target: String,
}

/// Resolves queries against the active snapshot of a [`RegistrySet`]
#[derive(Clone)]
pub struct Resolver {
    registries: Arc<RegistrySet>,
}

impl Resolver {
    pub fn new(registries: Arc<RegistrySet>) -> Self {
        Self { registries }
    }

    /// Resolve `object` of the given query type.
    ///
    /// Fails with `BadRequest` when the type is unsupported or the object is
    /// malformed, and with `NotFound` when no registry entry matches.
    pub fn resolve(&self, object_type: &str, object: &str) -> Result<Resolution> {
        let snapshot = self.registries.current();
        resolve_in(&snapshot, object_type, object)
    }
}

/// Resolve a query against one snapshot
pub fn resolve_in(snapshot: &Snapshot, object_type: &str, object: &str) -> Result<Resolution> {
    let kind = ObjectType::parse(object_type)?;

    if object.is_empty() {
        return Err(BootstrapError::bad_request(format!("empty {} query", kind)));
    }

    let base_url = match kind {
        ObjectType::Domain => resolve_domain(snapshot, object),
        ObjectType::Entity => resolve_entity(snapshot, object),
        ObjectType::Autnum => resolve_autnum(snapshot, parse_autnum(object)?),
        ObjectType::Ip => {
            let block = AddressBlock::parse(object)
                .map_err(|_| BootstrapError::bad_request(format!("invalid IP address '{}'", object)))?;
            resolve_ip(snapshot, &block)
        }
    };

    let Some(base_url) = base_url else {
        tracing::debug!(object_type = %kind, object = %object, "No RDAP server found");
        return Err(BootstrapError::not_found(kind.as_str(), object));
    };

    let redirect_target = format!("{}/{}/{}", base_url, kind, object);
    tracing::debug!(
        object_type = %kind,
        object = %object,
        target = %redirect_target,
        "Query resolved"
    );

    Ok(Resolution {
        base_url: base_url.to_string(),
        redirect_target,
    })
}

/// Base URL for a domain name.
///
/// An entry matches when the name ends in `.{tld}`. The root zone entry
/// (empty TLD) also matches any name without a dot, i.e. a TLD itself.
pub fn resolve_domain<'a>(snapshot: &'a Snapshot, domain: &str) -> Option<&'a str> {
    let domain = domain.to_lowercase();
    snapshot.dns.search(|tld| {
        if tld.is_empty() && !domain.contains('.') {
            true
        } else {
            domain.ends_with(&format!(".{}", tld))
        }
    })
}

/// Base URL for an entity handle, matched on its `-{tag}` suffix
pub fn resolve_entity<'a>(snapshot: &'a Snapshot, handle: &str) -> Option<&'a str> {
    let handle = handle.to_lowercase();
    snapshot
        .object_tags
        .search(|tag| handle.ends_with(&format!("-{}", tag)))
}

/// Base URL for an autonomous system number
pub fn resolve_autnum(snapshot: &Snapshot, asn: u32) -> Option<&str> {
    snapshot.asn.search(|range| range.contains(asn))
}

/// Base URL for an address or block, from the first registry block containing it
pub fn resolve_ip<'a>(snapshot: &'a Snapshot, block: &AddressBlock) -> Option<&'a str> {
    snapshot.ip.search(|range| range.contains(block))
}

/// Parse `1701` or `AS1701`
fn parse_autnum(object: &str) -> Result<u32> {
    let digits = match object.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("as") => &object[2..],
        _ => object,
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BootstrapError::bad_request(format!(
            "invalid autonomous system number '{}'",
            object
        )));
    }

    digits.parse::<u32>().map_err(|_| {
        BootstrapError::bad_request(format!("autonomous system number '{}' out of range", object))
    })
}
