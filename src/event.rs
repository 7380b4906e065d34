//! Typed outputs of `receive_data`, and the small wire-code enums they wrap.

use crate::address::Address;

/// SOCKS4/4A reply code (`CD` field of the reply frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Socks4ReplyCode {
    RequestGranted,
    RequestRejectedOrFailed,
    RequestRejectedNoIdentd,
    RequestRejectedIdentdMismatch,
    /// A value outside the four defined by the OpenSSH memo. Preserved
    /// rather than rejected so a caller can still see exactly what the
    /// server sent; treated as failure for state-transition purposes.
    Unassigned(u8),
}

impl Socks4ReplyCode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x5a => Self::RequestGranted,
            0x5b => Self::RequestRejectedOrFailed,
            0x5c => Self::RequestRejectedNoIdentd,
            0x5d => Self::RequestRejectedIdentdMismatch,
            other => Self::Unassigned(other),
        }
    }

    pub fn is_granted(self) -> bool {
        matches!(self, Self::RequestGranted)
    }
}

/// SOCKS5 auth method byte, as negotiated in the method-selection exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Socks5Method {
    NoAuthRequired,
    Gssapi,
    UsernamePassword,
    NoAcceptable,
    /// IANA-assigned or privately-reserved range (`0x03..=0xFE` minus the
    /// methods above). This core never selects these itself but a server
    /// could in principle reply with one; it is surfaced rather than
    /// rejected, since "method unsupported by this core" and "malformed
    /// frame" are different failure shapes.
    Other(u8),
}

impl Socks5Method {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::NoAuthRequired,
            0x01 => Self::Gssapi,
            0x02 => Self::UsernamePassword,
            0xff => Self::NoAcceptable,
            other => Self::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::NoAuthRequired => 0x00,
            Self::Gssapi => 0x01,
            Self::UsernamePassword => 0x02,
            Self::NoAcceptable => 0xff,
            Self::Other(byte) => byte,
        }
    }
}

/// SOCKS5 reply code (`REP` field of the reply frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Socks5ReplyCode {
    Succeeded,
    GeneralFailure,
    ConnectionNotAllowed,
    NetworkUnreachable,
    HostUnreachable,
    ConnectionRefused,
    TtlExpired,
    CommandNotSupported,
    AddressTypeNotSupported,
    /// `0x09..=0xFF`, not defined by RFC 1928. Preserved as a passthrough
    /// event rather than rejected, since the frame shape is otherwise
    /// well-formed.
    Unassigned(u8),
}

impl Socks5ReplyCode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Succeeded,
            0x01 => Self::GeneralFailure,
            0x02 => Self::ConnectionNotAllowed,
            0x03 => Self::NetworkUnreachable,
            0x04 => Self::HostUnreachable,
            0x05 => Self::ConnectionRefused,
            0x06 => Self::TtlExpired,
            0x07 => Self::CommandNotSupported,
            0x08 => Self::AddressTypeNotSupported,
            other => Self::Unassigned(other),
        }
    }

    pub fn is_succeeded(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// An event produced by feeding bytes into a connection's `receive_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Socks4Reply {
        code: Socks4ReplyCode,
        port: u16,
        addr: [u8; 4],
    },
    Socks5AuthMethodsReply {
        method: Socks5Method,
    },
    Socks5UsernamePasswordReply {
        success: bool,
    },
    Socks5Reply {
        code: Socks5ReplyCode,
        bind_addr: Address,
        bind_port: u16,
    },
}
