//! The wire codec: address-kind dispatch and fixed-width integer encoding.
//!
//! Grounded in `proxy-types::DestAddr`'s `ToDestAddr` classification (try
//! IPv4, then IPv6, then fall back to a domain name) and in `proxy-socks`'s
//! `read_addr`/`write_addr` pair, generalized here into pure functions with
//! no stream attached.

use crate::error::{Error, ProtocolError, UsageError};

/// Destination or bound address as carried on the SOCKS5 wire.
///
/// A tagged sum, not a runtime-dispatched hierarchy: every consumer of an
/// `Address` matches exhaustively on the three kinds the protocol defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Ipv4([u8; 4]),
    Ipv6([u8; 16]),
    Domain(Vec<u8>),
}

impl Address {
    /// The `ATYP` byte this address would be encoded with.
    pub fn kind_byte(&self) -> u8 {
        match self {
            Address::Ipv4(_) => 0x01,
            Address::Domain(_) => 0x03,
            Address::Ipv6(_) => 0x04,
        }
    }

    /// Length of `DST.ADDR`/`BND.ADDR` as it appears on the wire, including
    /// the domain length-prefix byte where applicable.
    pub fn wire_len(&self) -> usize {
        match self {
            Address::Ipv4(_) => 4,
            Address::Ipv6(_) => 16,
            Address::Domain(name) => 1 + name.len(),
        }
    }

    /// Appends this address's wire representation to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            Address::Ipv4(octets) => out.extend_from_slice(octets),
            Address::Ipv6(octets) => out.extend_from_slice(octets),
            Address::Domain(name) => {
                let len = u8::try_from(name.len()).map_err(|_| {
                    UsageError::InvalidFieldLength {
                        field: "domain",
                        len: name.len(),
                    }
                })?;
                if len == 0 {
                    return Err(UsageError::InvalidFieldLength {
                        field: "domain",
                        len: 0,
                    }
                    .into());
                }
                out.push(len);
                out.extend_from_slice(name);
            }
        }
        Ok(())
    }

    pub fn as_ipv4(&self) -> Option<[u8; 4]> {
        match self {
            Address::Ipv4(octets) => Some(*octets),
            _ => None,
        }
    }

    pub fn as_domain(&self) -> Option<&[u8]> {
        match self {
            Address::Domain(name) => Some(name),
            _ => None,
        }
    }
}

/// Classifies a host string into an [`Address`], trying a literal IPv4
/// parse, then a literal IPv6 parse, and falling back to DOMAIN.
///
/// Mirrors `(&str).to_dest_addr()`'s try-IPv4-then-IPv6-then-domain order.
pub fn classify_address(host: &str) -> Result<Address, Error> {
    if let Ok(addr) = host.parse::<std::net::Ipv4Addr>() {
        return Ok(Address::Ipv4(addr.octets()));
    }
    if let Ok(addr) = host.parse::<std::net::Ipv6Addr>() {
        return Ok(Address::Ipv6(addr.octets()));
    }
    let name = host.as_bytes().to_vec();
    let len = name.len();
    if len == 0 || len > 255 {
        return Err(UsageError::InvalidFieldLength { field: "domain", len }.into());
    }
    Ok(Address::Domain(name))
}

/// `ATYP` → required fixed-width payload length, or `None` for DOMAIN (whose
/// length is only known after reading its length-prefix byte).
pub fn fixed_len_for_atyp(atyp: u8) -> Result<Option<usize>, Error> {
    match atyp {
        0x01 => Ok(Some(4)),
        0x03 => Ok(None),
        0x04 => Ok(Some(16)),
        other => Err(ProtocolError::Socks5UnknownAddressType(other).into()),
    }
}

/// Decodes an `Address` from exactly `wire_len()` bytes previously
/// classified by `atyp`/`domain_len`.
pub fn decode_fixed(atyp: u8, bytes: &[u8]) -> Address {
    match atyp {
        0x01 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(bytes);
            Address::Ipv4(octets)
        }
        0x04 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(bytes);
            Address::Ipv6(octets)
        }
        _ => Address::Domain(bytes.to_vec()),
    }
}

pub fn encode_u16_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

pub fn decode_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Parses a literal dotted-quad string into its 4 wire octets.
pub fn encode_ipv4(dotted_quad: &str) -> Result<[u8; 4], Error> {
    dotted_quad
        .parse::<std::net::Ipv4Addr>()
        .map(|addr| addr.octets())
        .map_err(|_| UsageError::Socks4RequiresIpv4.into())
}

/// Renders 4 wire octets back to their dotted-quad textual form.
pub fn decode_ipv4(octets: [u8; 4]) -> String {
    std::net::Ipv4Addr::from(octets).to_string()
}

/// Parses a literal IPv6 address string into its 16 wire octets.
pub fn encode_ipv6(textual: &str) -> Result<[u8; 16], Error> {
    textual
        .parse::<std::net::Ipv6Addr>()
        .map(|addr| addr.octets())
        .map_err(|_| {
            UsageError::InvalidFieldLength {
                field: "ipv6",
                len: textual.len(),
            }
            .into()
        })
}

/// Renders 16 wire octets back to their canonical IPv6 textual form.
pub fn decode_ipv6(octets: [u8; 16]) -> String {
    std::net::Ipv6Addr::from(octets).to_string()
}
