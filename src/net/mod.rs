//! IP address and CIDR handling

pub mod block;
pub mod blocklist;

pub use block::{AddressBlock, Family};
pub use blocklist::Blocklist;
