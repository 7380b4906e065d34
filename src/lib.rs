//! `socksio` — a sans-I/O implementation of the SOCKS4, SOCKS4A and SOCKS5
//! client handshakes.
//!
//! Every type in this crate is a pure state machine: feed it bytes with
//! `receive_data`, read bytes to send with `data_to_send`, and nothing here
//! ever touches a socket, a clock, or a thread. Wiring a connection up to an
//! actual transport — sync, async, or otherwise — is the caller's job.
//!
//! ```text
//! loop {
//!     for chunk in conn.data_to_send().chunks(4096) {
//!         socket.write_all(chunk)?;
//!     }
//!     let n = socket.read(&mut buf)?;
//!     for event in conn.receive_data(&buf[..n])? {
//!         // act on event
//!     }
//!     if conn.is_succeeded() || conn.is_failed() {
//!         break;
//!     }
//! }
//! ```
//!
//! Three connection types cover the three handshakes this crate knows:
//! [`socks4::Socks4Connection`] (SOCKS4 and SOCKS4A, selected by
//! [`socks4::Variant`]) and [`socks5::Socks5Connection`] (SOCKS5, with
//! optional RFC 1929 username/password authentication).

pub mod address;
pub mod buffer;
pub mod command;
pub mod error;
pub mod event;
pub mod socks4;
pub mod socks5;

pub use address::Address;
pub use command::Command;
pub use error::{Error, ProtocolError, Result, StateError, UsageError};
pub use event::{Event, Socks4ReplyCode, Socks5Method, Socks5ReplyCode};
pub use socks4::{Socks4Connection, Variant as Socks4Variant};
pub use socks5::Socks5Connection;
