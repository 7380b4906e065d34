//! The SOCKS5 handshake (RFC 1928): method negotiation, optional RFC 1929
//! username/password sub-negotiation, and the CONNECT/BIND request/reply.
//!
//! Grounded in `proxy-socks::socks5`'s client-side framing and in `libra`'s
//! `Codec` two-phase read (fixed header, then variable-length address) —
//! generalized here into a state machine with no stream attached. The
//! incremental two-phase parse of the final reply is the one place this
//! module earns its own shape rather than following `socks4.rs`'s single
//! fixed-size frame.

use log::{debug, trace};

use crate::address::{self, Address};
use crate::buffer::{InboundBuffer, OutboundBuffer};
use crate::command::Command;
use crate::error::{Error, ProtocolError, StateError, UsageError};
use crate::event::{Event, Socks5Method, Socks5ReplyCode};

const VERSION: u8 = 0x05;
const AUTH_VERSION: u8 = 0x01;
const METHODS_REPLY_LEN: usize = 2;
const AUTH_REPLY_LEN: usize = 2;
const REPLY_HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    MethodsSent,
    MethodAccepted,
    AuthSent,
    AuthAccepted,
    RequestSent,
    Succeeded,
    Failed,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Init => "Init",
            State::MethodsSent => "MethodsSent",
            State::MethodAccepted => "MethodAccepted",
            State::AuthSent => "AuthSent",
            State::AuthAccepted => "AuthAccepted",
            State::RequestSent => "RequestSent",
            State::Succeeded => "Succeeded",
            State::Failed => "Failed",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, State::Succeeded | State::Failed)
    }
}

/// A single-use SOCKS5 CONNECT/BIND handshake, optionally preceded by RFC
/// 1929 username/password authentication.
///
/// The caller drives it through whichever of the two shapes the negotiated
/// method requires:
///
/// ```text
/// Init -> negotiate_auth_methods -> MethodsSent -> (reply) -> MethodAccepted
///   -> [authenticate_username_password -> AuthSent -> (reply) -> AuthAccepted]
///   -> request -> RequestSent -> (reply) -> Succeeded | Failed
/// ```
#[derive(Debug)]
pub struct Socks5Connection {
    state: State,
    selected_method: Option<Socks5Method>,
    inbound: InboundBuffer,
    outbound: OutboundBuffer,
}

impl Default for Socks5Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Socks5Connection {
    pub fn new() -> Self {
        Self {
            state: State::Init,
            selected_method: None,
            inbound: InboundBuffer::new(),
            outbound: OutboundBuffer::new(),
        }
    }

    fn require_state(&self, operation: &'static str, expected: State) -> Result<(), Error> {
        if self.state != expected {
            return Err(StateError::WrongState {
                operation,
                state: self.state.name(),
            }
            .into());
        }
        Ok(())
    }

    fn fail(&mut self, err: impl Into<Error>) -> Error {
        let prior = self.state.name();
        self.state = State::Failed;
        let err = err.into();
        debug!("socks5: rejecting frame received in state {prior}: {err}");
        err
    }

    /// Encodes the method-selection request and transitions to
    /// `MethodsSent`.
    pub fn negotiate_auth_methods(&mut self, methods: &[Socks5Method]) -> Result<(), Error> {
        self.require_state("negotiate_auth_methods", State::Init)?;

        if methods.is_empty() || methods.len() > 255 {
            return Err(UsageError::InvalidMethodCount(methods.len()).into());
        }

        let mut packet = Vec::with_capacity(2 + methods.len());
        packet.push(VERSION);
        packet.push(methods.len() as u8);
        packet.extend(methods.iter().map(|m| m.as_byte()));
        self.outbound.push(&packet);

        self.state = State::MethodsSent;
        trace!("socks5: sent {} candidate methods", methods.len());
        Ok(())
    }

    /// Encodes an RFC 1929 username/password sub-negotiation request and
    /// transitions to `AuthSent`. Only valid after the server selected
    /// `UsernamePassword` in `MethodAccepted`.
    pub fn authenticate_username_password(&mut self, username: &[u8], password: &[u8]) -> Result<(), Error> {
        self.require_state("authenticate_username_password", State::MethodAccepted)?;

        if self.selected_method != Some(Socks5Method::UsernamePassword) {
            return Err(StateError::WrongState {
                operation: "authenticate_username_password",
                state: self.state.name(),
            }
            .into());
        }
        if username.is_empty() || username.len() > 255 {
            return Err(UsageError::InvalidFieldLength {
                field: "username",
                len: username.len(),
            }
            .into());
        }
        if password.is_empty() || password.len() > 255 {
            return Err(UsageError::InvalidFieldLength {
                field: "password",
                len: password.len(),
            }
            .into());
        }

        let mut packet = Vec::with_capacity(3 + username.len() + password.len());
        packet.push(AUTH_VERSION);
        packet.push(username.len() as u8);
        packet.extend_from_slice(username);
        packet.push(password.len() as u8);
        packet.extend_from_slice(password);
        self.outbound.push(&packet);

        self.state = State::AuthSent;
        trace!("socks5: sent username/password sub-negotiation");
        Ok(())
    }

    /// Encodes a CONNECT/BIND request and transitions to `RequestSent`.
    /// Valid from `MethodAccepted` (no-auth path) or `AuthAccepted`
    /// (username/password path).
    pub fn request(&mut self, command: Command, host: &str, port: u16) -> Result<(), Error> {
        if self.state != State::MethodAccepted && self.state != State::AuthAccepted {
            return Err(StateError::WrongState {
                operation: "request",
                state: self.state.name(),
            }
            .into());
        }
        if command == Command::UdpAssociate {
            return Err(UsageError::UdpAssociateUnsupported.into());
        }

        let addr = address::classify_address(host)?;

        let mut packet = Vec::with_capacity(6 + addr.wire_len());
        packet.push(VERSION);
        packet.push(command.as_u8());
        packet.push(0x00);
        packet.push(addr.kind_byte());
        addr.encode(&mut packet)?;
        packet.extend_from_slice(&port.to_be_bytes());
        self.outbound.push(&packet);

        self.state = State::RequestSent;
        trace!("socks5: sent request, awaiting reply");
        Ok(())
    }

    /// Feeds received bytes in, parsing at most one frame appropriate to the
    /// current state. Returns zero or one events; an incomplete frame
    /// leaves the buffer untouched and returns an empty vector so the
    /// caller can feed in more bytes later.
    pub fn receive_data(&mut self, bytes: &[u8]) -> Result<Vec<Event>, Error> {
        if self.state.is_terminal() {
            return Err(StateError::Terminal {
                state: self.state.name(),
            }
            .into());
        }

        self.inbound.append(bytes);

        match self.state {
            State::MethodsSent => self.parse_methods_reply(),
            State::AuthSent => self.parse_auth_reply(),
            State::RequestSent => self.parse_request_reply(),
            _ => Err(StateError::WrongState {
                operation: "receive_data",
                state: self.state.name(),
            }
            .into()),
        }
    }

    fn parse_methods_reply(&mut self) -> Result<Vec<Event>, Error> {
        let Some(frame) = self.inbound.peek(METHODS_REPLY_LEN) else {
            return Ok(Vec::new());
        };
        let version = frame[0];
        let method = Socks5Method::from_byte(frame[1]);
        self.inbound.consume(METHODS_REPLY_LEN);

        if version != VERSION {
            return Err(self.fail(ProtocolError::Socks5BadVersion(version)));
        }

        if method == Socks5Method::NoAcceptable {
            self.state = State::Failed;
        } else {
            self.selected_method = Some(method);
            self.state = State::MethodAccepted;
        }
        debug!("socks5: method negotiation settled, new state = {}", self.state.name());

        Ok(vec![Event::Socks5AuthMethodsReply { method }])
    }

    fn parse_auth_reply(&mut self) -> Result<Vec<Event>, Error> {
        let Some(frame) = self.inbound.peek(AUTH_REPLY_LEN) else {
            return Ok(Vec::new());
        };
        let version = frame[0];
        let status = frame[1];
        self.inbound.consume(AUTH_REPLY_LEN);

        if version != AUTH_VERSION {
            return Err(self.fail(ProtocolError::Socks5BadAuthVersion(version)));
        }

        let success = status == 0x00;
        self.state = if success { State::AuthAccepted } else { State::Failed };
        debug!("socks5: auth sub-negotiation settled, new state = {}", self.state.name());

        Ok(vec![Event::Socks5UsernamePasswordReply { success }])
    }

    /// Two-phase parse: first the 4-byte fixed header (`VER|REP|RSV|ATYP`),
    /// which tells us how many more bytes the address needs; then, once
    /// that much is available, the address plus the trailing 2-byte port.
    /// A short read at either phase leaves the buffer untouched.
    fn parse_request_reply(&mut self) -> Result<Vec<Event>, Error> {
        let Some(header) = self.inbound.peek(REPLY_HEADER_LEN) else {
            return Ok(Vec::new());
        };
        let version = header[0];
        let rep = header[1];
        let rsv = header[2];
        let atyp = header[3];

        if version != VERSION {
            return Err(self.fail(ProtocolError::Socks5BadVersion(version)));
        }
        if rsv != 0x00 {
            return Err(self.fail(ProtocolError::Socks5NonZeroReserved(rsv)));
        }

        let addr_len = match address::fixed_len_for_atyp(atyp) {
            Ok(Some(len)) => len,
            Ok(None) => {
                // DOMAIN: the length-prefix byte sits right after the header.
                let Some(with_len_byte) = self.inbound.peek(REPLY_HEADER_LEN + 1) else {
                    return Ok(Vec::new());
                };
                let domain_len = with_len_byte[REPLY_HEADER_LEN];
                if domain_len == 0 {
                    return Err(self.fail(ProtocolError::Socks5ZeroLengthDomain));
                }
                domain_len as usize + 1
            }
            Err(err) => return Err(self.fail(err)),
        };

        let total_len = REPLY_HEADER_LEN + addr_len + 2;
        let Some(frame) = self.inbound.peek(total_len) else {
            return Ok(Vec::new());
        };

        let addr_bytes = &frame[REPLY_HEADER_LEN..REPLY_HEADER_LEN + addr_len];
        let bind_addr = if atyp == 0x03 {
            address::decode_fixed(atyp, &addr_bytes[1..])
        } else {
            address::decode_fixed(atyp, addr_bytes)
        };
        let bind_port = address::decode_u16_be(&frame[total_len - 2..total_len]);
        self.inbound.consume(total_len);

        let code = Socks5ReplyCode::from_byte(rep);
        self.state = if code.is_succeeded() { State::Succeeded } else { State::Failed };
        debug!("socks5: request reply parsed, new state = {}", self.state.name());

        Ok(vec![Event::Socks5Reply {
            code,
            bind_addr,
            bind_port,
        }])
    }

    /// Returns and clears all bytes queued for the peer.
    pub fn data_to_send(&mut self) -> Vec<u8> {
        self.outbound.drain()
    }

    pub fn selected_method(&self) -> Option<Socks5Method> {
        self.selected_method
    }

    pub fn is_succeeded(&self) -> bool {
        self.state == State::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        self.state == State::Failed
    }
}
