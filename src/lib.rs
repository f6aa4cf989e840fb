//! RDAP Bootstrap - find the authoritative RDAP server for any query
//!
//! Loads the IANA RDAP bootstrap registries, keeps them fresh in the
//! background, and resolves domains, IP addresses, autonomous system numbers
//! and entity handles to the base URL of the server that answers for them.

pub mod bootstrap;
pub mod error;
pub mod net;
pub mod registry;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use error::{BootstrapError, Result};
pub use types::{BootstrapConfig, Category, ObjectType, RegistryKind};

// Re-export main functionality
pub use bootstrap::{RegistryLoader, RegistrySet};
pub use net::{AddressBlock, Blocklist};
pub use registry::{AsnRange, Registry, Snapshot};
pub use resolver::{Resolution, Resolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
