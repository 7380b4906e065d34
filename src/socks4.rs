//! The SOCKS4 / SOCKS4A connect handshake: two states, one request frame,
//! one reply frame.
//!
//! Grounded in `proxy-socks::socks4::{write_socks_request, read_socks_reply}`
//! and in `async-proxy`'s own `Socks4General`/`Socks4NoIdent` constructors —
//! the buffer-layout arithmetic (`VN | CD | DSTPORT | DSTIP | USERID | NUL`)
//! is theirs, generalized here into a state machine that owns no socket.

use std::net::Ipv4Addr;

use log::{debug, trace};

use crate::buffer::{InboundBuffer, OutboundBuffer};
use crate::command::Command;
use crate::error::{Error, ProtocolError, StateError, UsageError};
use crate::event::{Event, Socks4ReplyCode};

const REPLY_FRAME_LEN: usize = 8;

/// Whether domain names are accepted (SOCKS4A) or only literal IPv4
/// addresses are (plain SOCKS4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Socks4,
    Socks4A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    AwaitingReply,
    Succeeded,
    Failed,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Init => "Init",
            State::AwaitingReply => "AwaitingReply",
            State::Succeeded => "Succeeded",
            State::Failed => "Failed",
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, State::Succeeded | State::Failed)
    }
}

/// A single-use SOCKS4 or SOCKS4A CONNECT/BIND handshake.
///
/// Created once per connection attempt with a (possibly empty) `user_id`,
/// driven by `request` then `receive_data`, and discarded once a terminal
/// state is reached.
#[derive(Debug)]
pub struct Socks4Connection {
    variant: Variant,
    user_id: Vec<u8>,
    state: State,
    inbound: InboundBuffer,
    outbound: OutboundBuffer,
}

impl Socks4Connection {
    pub fn new(variant: Variant, user_id: impl Into<Vec<u8>>) -> Self {
        Self {
            variant,
            user_id: user_id.into(),
            state: State::Init,
            inbound: InboundBuffer::new(),
            outbound: OutboundBuffer::new(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
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

    /// Encodes a CONNECT or BIND request and transitions to `AwaitingReply`.
    ///
    /// `host` is a literal IPv4 dotted-quad for SOCKS4; SOCKS4A additionally
    /// accepts any other string as a domain name, encoded after the sentinel
    /// address `0.0.0.1` per the SOCKS4A extension.
    pub fn request(&mut self, command: Command, host: &str, port: u16) -> Result<(), Error> {
        self.require_state("request", State::Init)?;

        if command == Command::UdpAssociate {
            return Err(UsageError::UdpAssociateUnsupported.into());
        }

        let domain = match (host.parse::<Ipv4Addr>(), self.variant) {
            (Ok(ip), _) => {
                self.encode_request(command, ip, port, None);
                self.state = State::AwaitingReply;
                trace!("socks4: sent request, awaiting reply");
                return Ok(());
            }
            (Err(_), Variant::Socks4) => return Err(UsageError::Socks4RequiresIpv4.into()),
            (Err(_), Variant::Socks4A) => host.as_bytes().to_vec(),
        };

        if domain.is_empty() {
            return Err(UsageError::Socks4ARequiresIpv4OrDomain.into());
        }

        self.encode_request(command, Ipv4Addr::new(0, 0, 0, 1), port, Some(&domain));
        self.state = State::AwaitingReply;
        trace!("socks4a: sent request with domain, awaiting reply");
        Ok(())
    }

    fn encode_request(&mut self, command: Command, dest_ip: Ipv4Addr, port: u16, domain: Option<&[u8]>) {
        let mut packet = Vec::with_capacity(9 + self.user_id.len() + domain.map_or(0, |d| d.len() + 1));
        packet.push(0x04);
        packet.push(command.as_u8());
        packet.extend_from_slice(&port.to_be_bytes());
        packet.extend_from_slice(&dest_ip.octets());
        packet.extend_from_slice(&self.user_id);
        packet.push(0x00);
        if let Some(domain) = domain {
            packet.extend_from_slice(domain);
            packet.push(0x00);
        }
        self.outbound.push(&packet);
    }

    /// Feeds received bytes in, parsing at most one reply frame.
    ///
    /// Returns the events newly parseable from the buffer — zero or one,
    /// since SOCKS4 has a single reply frame per handshake.
    pub fn receive_data(&mut self, bytes: &[u8]) -> Result<Vec<Event>, Error> {
        if self.state.is_terminal() {
            return Err(StateError::Terminal {
                state: self.state.name(),
            }
            .into());
        }
        self.require_state("receive_data", State::AwaitingReply)?;

        self.inbound.append(bytes);

        let Some(frame) = self.inbound.peek(REPLY_FRAME_LEN) else {
            return Ok(Vec::new());
        };

        let version = frame[0];
        if version != 0x00 {
            self.state = State::Failed;
            return Err(ProtocolError::Socks4BadReplyVersion(version).into());
        }

        let code = Socks4ReplyCode::from_byte(frame[1]);
        let reply_port = u16::from_be_bytes([frame[2], frame[3]]);
        let addr = [frame[4], frame[5], frame[6], frame[7]];
        self.inbound.consume(REPLY_FRAME_LEN);

        self.state = if code.is_granted() { State::Succeeded } else { State::Failed };
        debug!("socks4: reply parsed, new state = {}", self.state.name());

        Ok(vec![Event::Socks4Reply {
            code,
            port: reply_port,
            addr,
        }])
    }

    /// Returns and clears all bytes queued for the peer.
    pub fn data_to_send(&mut self) -> Vec<u8> {
        self.outbound.drain()
    }

    pub fn is_succeeded(&self) -> bool {
        self.state == State::Succeeded
    }

    pub fn is_failed(&self) -> bool {
        self.state == State::Failed
    }
}
