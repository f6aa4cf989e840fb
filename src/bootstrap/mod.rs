//! Loading and refreshing the IANA RDAP bootstrap registries

pub mod document;
pub mod loader;
pub mod set;
pub mod source;

pub use document::BootstrapDocument;
pub use loader::{RawDocuments, RegistryLoader};
pub use set::RegistrySet;
pub use source::{source_from_config, BootstrapSource, DirectorySource, HttpSource, MemorySource};
