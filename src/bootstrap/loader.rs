//! Fetches the IANA bootstrap documents and builds a [`Snapshot`]

use super::document::BootstrapDocument;
use super::source::{source_from_config, BootstrapSource};
use crate::error::{BootstrapError, Result};
use crate::net::AddressBlock;
use crate::registry::{AsnRange, Snapshot};
use crate::types::{BootstrapConfig, Category, RegistryKind};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Raw document bodies of one fetch round, `None` where the fetch failed
#[derive(Debug, Clone, Default)]
pub struct RawDocuments {
    bodies: Vec<(Category, Option<String>)>,
}

impl RawDocuments {
    /// Record the outcome for one category
    pub fn insert(&mut self, category: Category, body: Option<String>) {
        self.bodies.retain(|(c, _)| *c != category);
        self.bodies.push((category, body));
    }

    pub fn get(&self, category: Category) -> Option<&str> {
        self.bodies
            .iter()
            .find(|(c, _)| *c == category)
            .and_then(|(_, body)| body.as_deref())
    }

    /// Categories with no body, in load order
    pub fn missing(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_none())
            .collect()
    }
}

impl FromIterator<(Category, Option<String>)> for RawDocuments {
    fn from_iter<I: IntoIterator<Item = (Category, Option<String>)>>(iter: I) -> Self {
        let mut raw = RawDocuments::default();
        for (category, body) in iter {
            raw.insert(category, body);
        }
        raw
    }
}

/// Loads all bootstrap documents in parallel and turns them into registries
pub struct RegistryLoader {
    source: Arc<dyn BootstrapSource>,
    fetch_timeout: Duration,
}

impl RegistryLoader {
    pub fn new(source: Arc<dyn BootstrapSource>, fetch_timeout: Duration) -> Self {
        Self {
            source,
            fetch_timeout,
        }
    }

    /// Loader backed by the source the configuration selects
    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self::new(Arc::from(source_from_config(config)), config.fetch_timeout)
    }

    /// Fetch every document concurrently.
    ///
    /// Waits for all fetches to settle. A failed or timed-out category is
    /// logged and left without a body; only when every category fails is the
    /// whole fetch an error.
    pub async fn fetch(&self) -> Result<RawDocuments> {
        let start = Instant::now();
        let results = join_all(Category::ALL.into_iter().map(|c| self.fetch_one(c))).await;

        let mut first_error = None;
        let raw: RawDocuments = Category::ALL
            .into_iter()
            .zip(results)
            .map(|(category, result)| match result {
                Ok(body) => {
                    tracing::debug!(
                        category = %category,
                        bytes = %body.len(),
                        "Fetched bootstrap document"
                    );
                    (category, Some(body))
                }
                Err(e) => {
                    tracing::warn!(
                        category = %category,
                        location = %self.source.describe(category),
                        error = %e,
                        "Bootstrap document unavailable"
                    );
                    first_error.get_or_insert(e);
                    (category, None)
                }
            })
            .collect();

        tracing::debug!(
            fetched = %(Category::ALL.len() - raw.missing().len()),
            duration_ms = %start.elapsed().as_millis(),
            "Bootstrap fetch completed"
        );

        if raw.missing().len() == Category::ALL.len() {
            let cause = first_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no documents".to_string());
            return Err(BootstrapError::fetch_failed(
                Category::ALL[0],
                format!("every bootstrap document is unavailable ({})", cause),
                None,
            ));
        }

        Ok(raw)
    }

    async fn fetch_one(&self, category: Category) -> Result<String> {
        timeout(self.fetch_timeout, self.source.fetch(category))
            .await
            .map_err(|_| {
                BootstrapError::fetch_failed(
                    category,
                    format!("timed out after {}s", self.fetch_timeout.as_secs()),
                    Some(self.source.describe(category)),
                )
            })?
    }

    /// Build a snapshot from fetched documents.
    ///
    /// Any malformed document fails the whole snapshot.
    pub fn parse(raw: &RawDocuments) -> Result<Snapshot> {
        let mut snapshot = Snapshot::empty();

        for category in Category::ALL {
            let Some(text) = raw.get(category) else {
                snapshot.missing.push(category);
                continue;
            };

            let document = BootstrapDocument::parse(category, text)?;
            if let Some(publication) = &document.publication {
                snapshot.publications.insert(category, publication.clone());
            }

            for entry in document.entries(category)? {
                match category.registry_kind() {
                    RegistryKind::Dns => snapshot
                        .dns
                        .add(entry.resource.to_lowercase(), entry.base_url),
                    RegistryKind::ObjectTags => snapshot
                        .object_tags
                        .add(entry.resource.to_lowercase(), entry.base_url),
                    RegistryKind::Asn => snapshot
                        .asn
                        .add(AsnRange::parse(entry.resource)?, entry.base_url),
                    RegistryKind::Ip => {
                        let block = AddressBlock::parse(entry.resource)
                            .map_err(|e| BootstrapError::parse_failed(category, e.to_string()))?;
                        snapshot.ip.add(block, entry.base_url);
                    }
                }
            }
        }

        Ok(snapshot)
    }

    /// Fetch and parse in one step
    pub async fn load(&self) -> Result<Snapshot> {
        let raw = self.fetch().await?;
        Self::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::source::MemorySource;
    use async_trait::async_trait;

    const DNS: &str = r#"{"services": [[["XYZ"], ["https://rdap.centralnic.com/xyz/"]], [[""], ["https://rdap.iana.org/"]]]}"#;
    const IPV4: &str = r#"{"services": [[["1.0.0.0/8"], ["https://rdap.apnic.net/"]]]}"#;
    const IPV6: &str = r#"{"services": [[["2001:200::/23"], ["https://rdap.apnic.net/"]]]}"#;
    const ASN: &str = r#"{"services": [[["1700-1800", "4608"], ["http://rdap.example/asn", "https://rdap.example/asn/"]]]}"#;
    const TAGS: &str = r#"{"services": [[["contact@arin.net"], ["ARIN"], ["https://rdap.arin.net/registry/"]]]}"#;

    fn full_source() -> MemorySource {
        MemorySource::new()
            .with(Category::Dns, DNS)
            .with(Category::Ipv4, IPV4)
            .with(Category::Ipv6, IPV6)
            .with(Category::Asn, ASN)
            .with(Category::ObjectTags, TAGS)
    }

    fn loader(source: impl BootstrapSource + 'static) -> RegistryLoader {
        RegistryLoader::new(Arc::new(source), Duration::from_secs(5))
    }

    #[test]
    fn test_raw_documents_collect() {
        let raw: RawDocuments = [
            (Category::Dns, None),
            (Category::Asn, Some(ASN.to_string())),
            (Category::Dns, Some(DNS.to_string())),
        ]
        .into_iter()
        .collect();

        assert_eq!(raw.get(Category::Dns), Some(DNS));
        assert_eq!(
            raw.missing(),
            vec![Category::Ipv4, Category::Ipv6, Category::ObjectTags]
        );
    }

    #[tokio::test]
    async fn test_load_builds_all_registries() {
        let snapshot = loader(full_source()).load().await.unwrap();

        assert!(snapshot.is_complete());
        assert_eq!(snapshot.dns.len(), 2);
        assert_eq!(snapshot.ip.len(), 2);
        assert_eq!(snapshot.asn.len(), 2);
        assert_eq!(snapshot.object_tags.len(), 1);

        let tlds: Vec<&String> = snapshot.dns.iter().map(|(tld, _)| tld).collect();
        assert_eq!(tlds, vec!["xyz", ""]);
        assert_eq!(
            snapshot.asn.search(|r| r.contains(1750)),
            Some("https://rdap.example/asn")
        );
        assert_eq!(
            snapshot.object_tags.search(|t| t == "arin"),
            Some("https://rdap.arin.net/registry")
        );
    }

    #[tokio::test]
    async fn test_ip_registry_keeps_v4_before_v6() {
        let snapshot = loader(full_source()).load().await.unwrap();
        let blocks: Vec<String> = snapshot.ip.iter().map(|(b, _)| b.to_string()).collect();
        assert_eq!(blocks, vec!["1.0.0.0/8", "2001:200::/23"]);
    }

    #[tokio::test]
    async fn test_missing_category_is_absent_not_fatal() {
        let source = full_source();
        source.set(Category::Asn, None);

        let snapshot = loader(source).load().await.unwrap();
        assert_eq!(snapshot.missing, vec![Category::Asn]);
        assert!(snapshot.asn.is_empty());
        assert_eq!(snapshot.dns.len(), 2);
        assert_eq!(snapshot.ip.len(), 2);
        assert_eq!(snapshot.object_tags.len(), 1);
    }

    #[tokio::test]
    async fn test_one_ip_family_missing_keeps_the_other() {
        let source = full_source();
        source.set(Category::Ipv4, None);

        let snapshot = loader(source).load().await.unwrap();
        assert_eq!(snapshot.ip.len(), 1);
        assert_eq!(snapshot.missing, vec![Category::Ipv4]);
    }

    #[tokio::test]
    async fn test_malformed_document_fails_the_load() {
        let source = full_source();
        source.set(Category::ObjectTags, Some("[not json".to_string()));

        let err = loader(source).load().await.unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::ParseFailed { category: Category::ObjectTags, .. }
        ));
    }

    #[tokio::test]
    async fn test_bad_ip_resource_fails_the_load() {
        let source = full_source();
        source.set(
            Category::Ipv6,
            Some(r#"{"services": [[["2001:zz::/23"], ["https://rdap.apnic.net/"]]]}"#.to_string()),
        );

        let err = loader(source).load().await.unwrap_err();
        assert!(matches!(err, BootstrapError::ParseFailed { category: Category::Ipv6, .. }));
    }

    #[tokio::test]
    async fn test_nothing_fetched_is_an_error() {
        let err = loader(MemorySource::new()).fetch().await.unwrap_err();
        assert!(matches!(err, BootstrapError::FetchFailed { .. }));
    }

    struct SlowSource;

    #[async_trait]
    impl BootstrapSource for SlowSource {
        async fn fetch(&self, category: Category) -> Result<String> {
            if category == Category::Dns {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(r#"{"services": []}"#.to_string())
        }

        fn describe(&self, category: Category) -> String {
            category.file_name()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_category_times_out_alone() {
        let loader = RegistryLoader::new(Arc::new(SlowSource), Duration::from_secs(1));
        let raw = loader.fetch().await.unwrap();
        assert_eq!(raw.missing(), vec![Category::Dns]);
        assert!(raw.get(Category::Ipv4).is_some());
    }
}
