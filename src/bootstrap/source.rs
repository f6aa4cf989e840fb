//! Transports that supply raw bootstrap documents

use crate::error::{BootstrapError, Result};
use crate::types::{BootstrapConfig, Category};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Where bootstrap documents come from
#[async_trait]
pub trait BootstrapSource: Send + Sync {
    /// Fetch the raw body of one document
    async fn fetch(&self, category: Category) -> Result<String>;

    /// Human-readable location of a document, for logs
    fn describe(&self, category: Category) -> String;
}

/// Fetches documents over HTTP(S), normally from data.iana.org
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(config: &BootstrapConfig) -> Self {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to create configured HTTP client: {}. Using default.", e);
                Client::new()
            });

        Self::with_client(client, config.base_url.clone())
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BootstrapSource for HttpSource {
    async fn fetch(&self, category: Category) -> Result<String> {
        let url = self.describe(category);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BootstrapError::fetch_failed(
                category,
                format!("HTTP status {}", status),
                Some(url),
            ));
        }

        Ok(response.text().await?)
    }

    fn describe(&self, category: Category) -> String {
        format!("{}/{}", self.base_url, category.file_name())
    }
}

/// Reads `{dir}/{category}.json` from local disk
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl BootstrapSource for DirectorySource {
    async fn fetch(&self, category: Category) -> Result<String> {
        let path = self.dir.join(category.file_name());
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            BootstrapError::fetch_failed(category, e.to_string(), Some(path.display().to_string()))
        })
    }

    fn describe(&self, category: Category) -> String {
        self.dir.join(category.file_name()).display().to_string()
    }
}

/// Serves documents held in memory; categories without a body fail to fetch.
///
/// Bodies can be replaced between loads, which makes it convenient for
/// exercising refresh behaviour.
#[derive(Default)]
pub struct MemorySource {
    documents: Mutex<HashMap<Category, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the body served for `category`
    pub fn set(&self, category: Category, body: Option<String>) {
        let mut documents = self.documents.lock();
        match body {
            Some(body) => {
                documents.insert(category, body);
            }
            None => {
                documents.remove(&category);
            }
        }
    }

    pub fn with(self, category: Category, body: impl Into<String>) -> Self {
        self.set(category, Some(body.into()));
        self
    }
}

#[async_trait]
impl BootstrapSource for MemorySource {
    async fn fetch(&self, category: Category) -> Result<String> {
        self.documents
            .lock()
            .get(&category)
            .cloned()
            .ok_or_else(|| BootstrapError::fetch_failed(category, "no document available", None))
    }

    fn describe(&self, category: Category) -> String {
        format!("memory:{}", category.file_name())
    }
}

/// Build the source selected by the configuration
pub fn source_from_config(config: &BootstrapConfig) -> Box<dyn BootstrapSource> {
    match &config.data_dir {
        Some(dir) => Box::new(DirectorySource::new(dir.clone())),
        None => Box::new(HttpSource::new(config)),
    }
}
