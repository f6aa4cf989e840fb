//! Client address blocklist

use super::block::AddressBlock;
use crate::error::Result;
use crate::types::BootstrapConfig;

/// Set of blocks whose clients are refused
#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    blocks: Vec<AddressBlock>,
}

impl Blocklist {
    /// Parse a comma-separated list of address or CIDR literals
    pub fn parse(list: &str) -> Result<Self> {
        Self::from_entries(list.split(','))
    }

    /// Build from the configured literals
    pub fn from_config(config: &BootstrapConfig) -> Result<Self> {
        Self::from_entries(config.blocklist.iter().map(String::as_str))
    }

    fn from_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let blocks = entries
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(AddressBlock::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { blocks })
    }

    /// Whether any listed block contains `peer`
    pub fn is_blocked(&self, peer: &AddressBlock) -> bool {
        let blocked = self.blocks.iter().any(|block| block.contains(peer));
        if blocked {
            tracing::debug!(peer = %peer, "Client address is blocked");
        }
        blocked
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
