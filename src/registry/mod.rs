//! Bootstrap registries
//!
//! A registry maps resources (TLDs, CIDR blocks, ASN ranges, object tags) to
//! RDAP base URLs. Lookups are a linear scan in document order and the first
//! matching entry wins, so entries are never re-sorted or indexed.

pub mod snapshot;

pub use snapshot::Snapshot;

use crate::error::{BootstrapError, Result};
use crate::types::Category;
use std::fmt;

/// Ordered, append-only list of `(resource, base URL)` pairs
#[derive(Debug, Clone)]
pub struct Registry<R> {
    entries: Vec<(R, String)>,
}

impl<R> Registry<R> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry. The resource is stored as given.
    pub fn add(&mut self, resource: R, base_url: impl Into<String>) {
        self.entries.push((resource, base_url.into()));
    }

    /// Base URL of the first entry whose resource satisfies `predicate`
    pub fn search<F>(&self, predicate: F) -> Option<&str>
    where
        F: Fn(&R) -> bool,
    {
        self.entries
            .iter()
            .find(|(resource, _)| predicate(resource))
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&R, &str)> {
        self.entries.iter().map(|(r, url)| (r, url.as_str()))
    }
}

impl<R> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Closed range of autonomous system numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AsnRange {
    pub start: u32,
    pub end: u32,
}

impl AsnRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn single(asn: u32) -> Self {
        Self::new(asn, asn)
    }

    /// Parse `N` or `N-M` as found in the ASN bootstrap document
    pub fn parse(token: &str) -> Result<Self> {
        let parse_bound = |s: &str| {
            s.trim().parse::<u32>().map_err(|_| {
                BootstrapError::parse_failed(
                    Category::Asn,
                    format!("invalid AS number '{}' in range '{}'", s, token),
                )
            })
        };

        let range = match token.split_once('-') {
            Some((start, end)) => Self::new(parse_bound(start)?, parse_bound(end)?),
            None => Self::single(parse_bound(token)?),
        };

        if range.start > range.end {
            return Err(BootstrapError::parse_failed(
                Category::Asn,
                format!("AS range '{}' is inverted", token),
            ));
        }

        Ok(range)
    }

    pub fn contains(&self, asn: u32) -> bool {
        self.start <= asn && asn <= self.end
    }
}

impl fmt::Display for AsnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_returns_first_match() {
        let mut registry = Registry::new();
        registry.add("uk".to_string(), "https://first.example");
        registry.add("co.uk".to_string(), "https://second.example");
        registry.add("uk".to_string(), "https://third.example");

        let domain = "bbc.co.uk";
        let found = registry.search(|tld| domain.ends_with(&format!(".{}", tld)));
        assert_eq!(found, Some("https://first.example"));
    }

    #[test]
    fn test_search_absent() {
        let mut registry = Registry::new();
        registry.add(AsnRange::new(1, 10), "https://a.example");
        registry.add(AsnRange::new(5, 20), "https://b.example");

        assert_eq!(registry.search(|r| r.contains(7)), Some("https://a.example"));
        assert_eq!(registry.search(|r| r.contains(15)), Some("https://b.example"));
        assert_eq!(registry.search(|r| r.contains(21)), None);
        assert_eq!(Registry::<AsnRange>::new().search(|_| true), None);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut registry = Registry::new();
        registry.add(3u8, "c");
        registry.add(1u8, "a");
        let order: Vec<_> = registry.iter().map(|(r, _)| *r).collect();
        assert_eq!(order, vec![3, 1]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_asn_range_parse() {
        assert_eq!(AsnRange::parse("1700-1800").unwrap(), AsnRange::new(1700, 1800));
        assert_eq!(AsnRange::parse("4608").unwrap(), AsnRange::single(4608));
        assert_eq!(
            AsnRange::parse("4200000000-4294967294").unwrap(),
            AsnRange::new(4_200_000_000, 4_294_967_294)
        );
        assert!(AsnRange::parse("10-x").is_err());
        assert!(AsnRange::parse("20-10").is_err());
        assert!(AsnRange::parse("").is_err());
    }

    #[test]
    fn test_asn_range_contains_is_inclusive() {
        let range = AsnRange::new(1700, 1800);
        assert!(range.contains(1700));
        assert!(range.contains(1701));
        assert!(range.contains(1800));
        assert!(!range.contains(1699));
        assert!(!range.contains(1801));
        assert_eq!(range.to_string(), "1700-1800");
        assert_eq!(AsnRange::single(7).to_string(), "7");
    }
}
