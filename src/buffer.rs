//! An append-only, consume-on-parse byte FIFO.
//!
//! Built on [`bytes::BytesMut`] so append is amortized O(1) and consuming a
//! parsed prefix is a cheap pointer bump (`BytesMut::advance`) rather than a
//! `Vec` shift. Mirrors the buffering style of `libra`'s `tokio_util`-framed
//! SOCKS5 codec, without the `Decoder`/`Encoder` traits: nothing here reads
//! from or writes to a real transport.

use bytes::{Buf, BufMut, BytesMut};

/// Inbound staging buffer for bytes received from the peer.
///
/// Only a prefix of known length is ever consumed; anything beyond a parsed
/// frame stays put for the next call.
#[derive(Debug, Default)]
pub struct InboundBuffer {
    inner: BytesMut,
}

impl InboundBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.inner.put_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the first `n` bytes without removing them, or `None` if fewer
    /// than `n` bytes are currently buffered.
    pub fn peek(&self, n: usize) -> Option<&[u8]> {
        if self.inner.len() < n {
            None
        } else {
            Some(&self.inner[..n])
        }
    }

    /// Removes the first `n` bytes. Panics if fewer than `n` bytes are
    /// buffered; callers must `peek` first.
    pub fn consume(&mut self, n: usize) {
        self.inner.advance(n);
    }
}

/// Outbound staging buffer for bytes the state machine wants to send.
///
/// The connection never holds bytes across a [`OutboundBuffer::drain`] call:
/// every byte pushed before a drain is returned by it.
#[derive(Debug, Default)]
pub struct OutboundBuffer {
    inner: BytesMut,
}

impl OutboundBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.inner.put_slice(bytes);
    }

    /// Returns and clears all buffered bytes.
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.inner).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_without_consuming() {
        let mut buf = InboundBuffer::new();
        buf.append(&[1, 2, 3]);
        assert_eq!(buf.peek(2), Some(&[1, 2][..]));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.peek(4), None);
    }

    #[test]
    fn consume_removes_prefix_only() {
        let mut buf = InboundBuffer::new();
        buf.append(&[1, 2, 3, 4]);
        buf.consume(2);
        assert_eq!(buf.peek(2), Some(&[3, 4][..]));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn fragmented_appends_are_observationally_equivalent() {
        let mut one_shot = InboundBuffer::new();
        one_shot.append(&[1, 2, 3, 4, 5]);

        let mut fragmented = InboundBuffer::new();
        for b in [1u8, 2, 3, 4, 5] {
            fragmented.append(&[b]);
        }

        assert_eq!(one_shot.peek(5), fragmented.peek(5));
    }

    #[test]
    fn drain_clears_outbound() {
        let mut out = OutboundBuffer::new();
        out.push(&[1, 2]);
        out.push(&[3]);
        assert_eq!(out.drain(), vec![1, 2, 3]);
        assert_eq!(out.drain(), Vec::<u8>::new());
    }
}
