//! Failure taxonomy for the SOCKS state machines.
//!
//! Three kinds, matching the wire-facing contract: bytes the peer sent that
//! don't parse (`Protocol`), a call made in a state that forbids it
//! (`State`), and caller-supplied values that violate a constraint knowable
//! before anything touches the wire (`Usage`). None of these carry an
//! `#[from] io::Error` arm: this crate never performs I/O.

/// Any failure a [`crate::socks4::Socks4Connection`] or
/// [`crate::socks5::Socks5Connection`] can return.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// The peer sent bytes that don't conform to the protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// A call was made in a state that forbids it.
    #[error("state violation: {0}")]
    State(#[from] StateError),

    /// A caller-supplied value violates a protocol constraint.
    #[error("invalid usage: {0}")]
    Usage(#[from] UsageError),
}

/// Malformed bytes received from the peer.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ProtocolError {
    #[error("unexpected SOCKS4 reply version byte {0:#04x}, expected 0x00")]
    Socks4BadReplyVersion(u8),

    #[error("unexpected SOCKS5 version byte {0:#04x}, expected 0x05")]
    Socks5BadVersion(u8),

    #[error("unexpected SOCKS5 auth sub-negotiation version byte {0:#04x}, expected 0x01")]
    Socks5BadAuthVersion(u8),

    #[error("non-zero reserved byte {0:#04x} in SOCKS5 frame")]
    Socks5NonZeroReserved(u8),

    #[error("unknown SOCKS5 address type {0:#04x}")]
    Socks5UnknownAddressType(u8),

    #[error("SOCKS5 domain name has zero length")]
    Socks5ZeroLengthDomain,
}

/// A call was made in a state that does not permit it.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum StateError {
    #[error("{operation} is not valid in state {state}")]
    WrongState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("connection already reached a terminal state ({state})")]
    Terminal { state: &'static str },
}

/// A caller-supplied value violates a protocol constraint knowable before
/// anything is sent.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum UsageError {
    #[error("SOCKS4 requires a literal IPv4 destination address")]
    Socks4RequiresIpv4,

    #[error("SOCKS4A requires a literal IPv4 or domain destination address")]
    Socks4ARequiresIpv4OrDomain,

    #[error("UDP_ASSOCIATE is not supported by this core")]
    UdpAssociateUnsupported,

    #[error("auth methods list must contain between 1 and 255 entries, got {0}")]
    InvalidMethodCount(usize),

    #[error("{field} must be between 1 and 255 bytes, got {len}")]
    InvalidFieldLength { field: &'static str, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
