//! Property tests: however a reply frame is sliced across `receive_data`
//! calls, the events produced must be identical to feeding it in one shot,
//! and no prefix shorter than the frame may produce an event.

use proptest::prelude::*;

use socksio::{Command, Socks4Connection, Socks4Variant, Socks5Connection, Socks5Method};

fn arbitrary_chunking(total_len: usize) -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(1..=4usize, 1..total_len.max(2)).prop_map(move |weights| {
        let sum: usize = weights.iter().sum();
        let mut lengths = Vec::new();
        let mut remaining = total_len;
        for w in &weights {
            if remaining == 0 {
                break;
            }
            let share = ((*w * total_len) / sum.max(1)).max(1).min(remaining);
            lengths.push(share);
            remaining -= share;
        }
        if remaining > 0 {
            lengths.push(remaining);
        }
        lengths
    })
}

proptest! {
    #[test]
    fn socks4_reply_fragmentation_is_invariant(chunking in arbitrary_chunking(8)) {
        let whole = [0x00u8, 0x5a, 0x00, 0x50, 0x7f, 0x00, 0x00, 0x01];

        let mut one_shot = Socks4Connection::new(Socks4Variant::Socks4, Vec::new());
        one_shot.request(Command::Connect, "127.0.0.1", 80).unwrap();
        one_shot.data_to_send();
        let one_shot_events = one_shot.receive_data(&whole).unwrap();

        let mut fragmented = Socks4Connection::new(Socks4Variant::Socks4, Vec::new());
        fragmented.request(Command::Connect, "127.0.0.1", 80).unwrap();
        fragmented.data_to_send();

        let mut offset = 0;
        let mut fragmented_events = Vec::new();
        for len in chunking {
            let end = (offset + len).min(whole.len());
            if offset >= end {
                continue;
            }
            fragmented_events.extend(fragmented.receive_data(&whole[offset..end]).unwrap());
            offset = end;
        }
        if offset < whole.len() {
            fragmented_events.extend(fragmented.receive_data(&whole[offset..]).unwrap());
        }

        prop_assert_eq!(one_shot_events, fragmented_events);
        prop_assert!(fragmented.is_succeeded());
    }

    #[test]
    fn socks4_no_event_until_full_frame(prefix_len in 0usize..8) {
        let whole = [0x00u8, 0x5a, 0x00, 0x50, 0x7f, 0x00, 0x00, 0x01];

        let mut conn = Socks4Connection::new(Socks4Variant::Socks4, Vec::new());
        conn.request(Command::Connect, "127.0.0.1", 80).unwrap();
        conn.data_to_send();

        let events = conn.receive_data(&whole[..prefix_len]).unwrap();
        if prefix_len < whole.len() {
            prop_assert!(events.is_empty());
        } else {
            prop_assert_eq!(events.len(), 1);
        }
    }

    #[test]
    fn socks5_reply_fragmentation_is_invariant_across_address_kinds(
        chunking in arbitrary_chunking(10),
        use_ipv4 in any::<bool>(),
    ) {
        let whole: Vec<u8> = if use_ipv4 {
            vec![0x05, 0x00, 0x00, 0x01, 10, 0, 0, 1, 0x1f, 0x90]
        } else {
            let mut v = vec![0x05, 0x00, 0x00, 0x03, 0x04];
            v.extend_from_slice(b"host");
            v.extend_from_slice(&443u16.to_be_bytes());
            v
        };

        let make_conn = || {
            let mut c = Socks5Connection::new();
            c.negotiate_auth_methods(&[Socks5Method::NoAuthRequired]).unwrap();
            c.data_to_send();
            c.receive_data(&[0x05, 0x00]).unwrap();
            c.request(Command::Connect, "example.com", 80).unwrap();
            c.data_to_send();
            c
        };

        let mut one_shot = make_conn();
        let one_shot_events = one_shot.receive_data(&whole).unwrap();

        let mut fragmented = make_conn();
        let mut offset = 0;
        let mut fragmented_events = Vec::new();
        for len in chunking {
            let end = (offset + len).min(whole.len());
            if offset >= end {
                continue;
            }
            fragmented_events.extend(fragmented.receive_data(&whole[offset..end]).unwrap());
            offset = end;
        }
        if offset < whole.len() {
            fragmented_events.extend(fragmented.receive_data(&whole[offset..]).unwrap());
        }

        prop_assert_eq!(one_shot_events, fragmented_events);
        prop_assert!(fragmented.is_succeeded());
    }
}
