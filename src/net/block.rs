//! IP address / CIDR block model

use crate::error::{BootstrapError, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Address family of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Number of bits in an address of this family
    pub fn bit_width(&self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }
}

/// Numeric value of a block, kept per family so that a v4 bound can never be
/// compared against a v6 bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Bounds {
    V4 { addr: u32, min: u32, max: u32 },
    V6 { addr: u128, min: u128, max: u128 },
}

/// A single IP address or a CIDR block, IPv4 or IPv6.
///
/// `min <= addr <= max` holds for every value: the bounds are the address
/// with its host bits cleared and set respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressBlock {
    bounds: Bounds,
    mask_len: u8,
}

impl AddressBlock {
    /// Parse `address` or `address/mask_len`.
    ///
    /// The mask defaults to the full width of the family. Negative,
    /// non-numeric or over-long masks are rejected rather than clamped.
    pub fn parse(text: &str) -> Result<Self> {
        let (addr_part, mask_part) = match text.split_once('/') {
            Some((addr, mask)) => (addr, Some(mask)),
            None => (text, None),
        };

        let addr = IpAddr::from_str(addr_part)
            .map_err(|_| BootstrapError::invalid_address(text, "not a valid IP address"))?;

        let width = match addr {
            IpAddr::V4(_) => Family::V4.bit_width(),
            IpAddr::V6(_) => Family::V6.bit_width(),
        };

        let mask_len = match mask_part {
            None => width,
            Some(mask) => {
                if mask.is_empty() || !mask.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(BootstrapError::invalid_address(
                        text,
                        format!("invalid mask length '{}'", mask),
                    ));
                }
                match mask.parse::<u8>() {
                    Ok(len) if len <= width => len,
                    _ => {
                        return Err(BootstrapError::invalid_address(
                            text,
                            format!("mask length must be between 0 and {}", width),
                        ))
                    }
                }
            }
        };

        Ok(Self::from_addr(addr, mask_len))
    }

    /// Build a block from an address and a mask length already known to fit
    /// the family.
    fn from_addr(addr: IpAddr, mask_len: u8) -> Self {
        let bounds = match addr {
            IpAddr::V4(v4) => {
                let addr = u32::from(v4);
                // shifting by the full width yields no host bits
                let host = u32::MAX.checked_shr(u32::from(mask_len)).unwrap_or(0);
                Bounds::V4 {
                    addr,
                    min: addr & !host,
                    max: addr | host,
                }
            }
            IpAddr::V6(v6) => {
                let addr = u128::from(v6);
                let host = u128::MAX.checked_shr(u32::from(mask_len)).unwrap_or(0);
                Bounds::V6 {
                    addr,
                    min: addr & !host,
                    max: addr | host,
                }
            }
        };

        Self { bounds, mask_len }
    }

    pub fn family(&self) -> Family {
        match self.bounds {
            Bounds::V4 { .. } => Family::V4,
            Bounds::V6 { .. } => Family::V6,
        }
    }

    pub fn bit_width(&self) -> u8 {
        self.family().bit_width()
    }

    pub fn mask_len(&self) -> u8 {
        self.mask_len
    }

    /// Address as written, host bits included
    pub fn address(&self) -> IpAddr {
        match self.bounds {
            Bounds::V4 { addr, .. } => IpAddr::V4(Ipv4Addr::from(addr)),
            Bounds::V6 { addr, .. } => IpAddr::V6(Ipv6Addr::from(addr)),
        }
    }

    /// Lowest address in the block
    pub fn min_address(&self) -> IpAddr {
        match self.bounds {
            Bounds::V4 { min, .. } => IpAddr::V4(Ipv4Addr::from(min)),
            Bounds::V6 { min, .. } => IpAddr::V6(Ipv6Addr::from(min)),
        }
    }

    /// Highest address in the block
    pub fn max_address(&self) -> IpAddr {
        match self.bounds {
            Bounds::V4 { max, .. } => IpAddr::V4(Ipv4Addr::from(max)),
            Bounds::V6 { max, .. } => IpAddr::V6(Ipv6Addr::from(max)),
        }
    }

    /// Whether `other` lies entirely inside this block.
    ///
    /// Blocks of different families never contain each other.
    pub fn contains(&self, other: &AddressBlock) -> bool {
        match (self.bounds, other.bounds) {
            (Bounds::V4 { min, max, .. }, Bounds::V4 { min: lo, max: hi, .. }) => {
                lo >= min && hi <= max
            }
            (Bounds::V6 { min, max, .. }, Bounds::V6 { min: lo, max: hi, .. }) => {
                lo >= min && hi <= max
            }
            _ => false,
        }
    }
}

impl FromStr for AddressBlock {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())?;
        if self.mask_len < self.bit_width() {
            write!(f, "/{}", self.mask_len)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(s: &str) -> AddressBlock {
        AddressBlock::parse(s).unwrap()
    }

    #[test]
    fn test_parse_accepts_valid_literals() {
        for input in [
            "192.168.1.1",
            "192.168.1.0",
            "192.168.1.255",
            "192.168.1.0/32",
            "192.168.1.0/16",
            "0.0.0.0",
            "0.0.0.0/0",
            "255.255.255.255/32",
            "::",
            "::1",
            "::/128",
            "::/0",
            "::192.168.0.1",
            "::192.168.0.1/48",
            "dead:beef::",
        ] {
            assert!(AddressBlock::parse(input).is_ok(), "{} should parse", input);
        }
    }

    #[test]
    fn test_parse_rejects_invalid_literals() {
        for input in [
            "192.168.1.256",
            "192.168.1.0/33",
            "192.168.1.1/-1",
            ":::",
            "::/129",
            "::/-1",
            "dead:cow::",
            "10.0.0.0/",
            "10.0.0.0/8/8",
            "",
        ] {
            let err = AddressBlock::parse(input).unwrap_err();
            assert!(
                matches!(err, BootstrapError::InvalidAddress { .. }),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_bounds() {
        let b = block("192.168.1.77/24");
        assert_eq!(b.family(), Family::V4);
        assert_eq!(b.bit_width(), 32);
        assert_eq!(b.mask_len(), 24);
        assert_eq!(b.min_address().to_string(), "192.168.1.0");
        assert_eq!(b.max_address().to_string(), "192.168.1.255");
        assert_eq!(b.address().to_string(), "192.168.1.77");

        let all = block("::/0");
        assert_eq!(all.min_address().to_string(), "::");
        assert_eq!(
            all.max_address().to_string(),
            "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"
        );

        let host = block("2001:db8::1");
        assert_eq!(host.min_address(), host.max_address());
    }

    #[test]
    fn test_contains() {
        assert!(block("0.0.0.0/0").contains(&block("1.1.1.1")));
        assert!(!block("2.0.0.0/8").contains(&block("1.1.1.1")));
        assert!(block("192.168.1.0/25").contains(&block("192.168.1.127")));
        assert!(!block("192.168.1.0/25").contains(&block("192.168.1.128")));
        assert!(block("2001:db8::/32").contains(&block("2001:db8:ffff::/48")));
        assert!(!block("2001:db8::/48").contains(&block("2001:db8::/32")));
    }

    #[test]
    fn test_contains_is_reflexive() {
        for input in ["10.0.0.0/8", "10.1.2.3", "::/0", "2001:db8::/64", "0.0.0.0/0"] {
            let b = block(input);
            assert!(b.contains(&b), "{} should contain itself", input);
        }
    }

    #[test]
    fn test_cross_family_never_contains() {
        assert!(!block("::/0").contains(&block("2.0.0.0/8")));
        assert!(!block("2.0.0.0/8").contains(&block("::")));
        assert!(!block("0.0.0.0/0").contains(&block("::ffff:1.2.3.4")));
    }

    #[test]
    fn test_display() {
        assert_eq!(block("::").to_string(), "::");
        assert_eq!(block("192.168.1.1").to_string(), "192.168.1.1");
        assert_eq!(block("192.168.1.1/32").to_string(), "192.168.1.1");
        assert_eq!(block("192.168.1.0/24").to_string(), "192.168.1.0/24");
        assert_eq!(block("2001:DB8::/32").to_string(), "2001:db8::/32");
        assert_eq!(block("::192.168.0.1").to_string(), "::c0a8:1");
        assert_eq!(block("::192.168.0.1/48").to_string(), "::c0a8:1/48");
        assert_eq!(block("::ffff:1.2.3.4").to_string(), "::ffff:1.2.3.4");
        assert_eq!(block("2001:0db8:0000:0000:0000:0000:0000:0001").to_string(), "2001:db8::1");
    }

    #[test]
    fn test_from_str() {
        let parsed: AddressBlock = "10.1.2.3/8".parse().unwrap();
        assert_eq!(parsed, block("10.1.2.3/8"));
        assert!("10.1.2.3/".parse::<AddressBlock>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for input in ["::192.168.0.1", "::192.168.0.1/48", "dead:beef::/16", "10.0.0.1/8"] {
            let b = block(input);
            assert_eq!(block(&b.to_string()), b);
        }
    }
}
