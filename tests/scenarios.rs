//! The end-to-end literal-byte scenarios.

use socksio::{
    Address, Command, Event, Socks4Connection, Socks4ReplyCode, Socks4Variant, Socks5Connection, Socks5Method,
    Socks5ReplyCode,
};

#[test]
fn scenario_socks5_username_password_then_domain_request() {
    let mut conn = Socks5Connection::new();
    conn.negotiate_auth_methods(&[Socks5Method::UsernamePassword]).unwrap();
    conn.data_to_send();

    let events = conn.receive_data(&[0x05, 0x02]).unwrap();
    assert_eq!(
        events,
        vec![Event::Socks5AuthMethodsReply {
            method: Socks5Method::UsernamePassword
        }]
    );

    conn.authenticate_username_password(b"u", b"p").unwrap();
    assert_eq!(conn.data_to_send(), vec![0x01, 0x01, b'u', 0x01, b'p']);

    let events = conn.receive_data(&[0x01, 0x00]).unwrap();
    assert_eq!(events, vec![Event::Socks5UsernamePasswordReply { success: true }]);

    conn.request(Command::Connect, "example.com", 80).unwrap();
    let sent = conn.data_to_send();
    let expected_start = [0x05, 0x01, 0x00, 0x03, 0x0b, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'c', b'o', b'm', 0x00, 0x50];
    assert_eq!(sent, expected_start);
}

#[test]
fn scenario_socks5_fragmented_reply_one_event_on_final_byte() {
    let mut conn = Socks5Connection::new();
    conn.negotiate_auth_methods(&[Socks5Method::NoAuthRequired]).unwrap();
    conn.data_to_send();
    conn.receive_data(&[0x05, 0x00]).unwrap();
    conn.request(Command::Connect, "127.0.0.1", 443).unwrap();
    conn.data_to_send();

    let reply = [0x05u8, 0x00, 0x00, 0x01, 0x7f, 0x00, 0x00, 0x01, 0x01, 0xbb];
    for (i, byte) in reply.iter().enumerate() {
        let events = conn.receive_data(std::slice::from_ref(byte)).unwrap();
        if i + 1 < reply.len() {
            assert!(events.is_empty(), "unexpected event at byte {i}");
        } else {
            assert_eq!(
                events,
                vec![Event::Socks5Reply {
                    code: Socks5ReplyCode::Succeeded,
                    bind_addr: Address::Ipv4([127, 0, 0, 1]),
                    bind_port: 443,
                }]
            );
        }
    }
    assert!(conn.is_succeeded());
}

#[test]
fn rejection_totality_socks4_unknown_atyp_equivalent_is_bad_version() {
    let mut conn = Socks4Connection::new(Socks4Variant::Socks4, Vec::new());
    conn.request(Command::Connect, "127.0.0.1", 80).unwrap();
    conn.data_to_send();

    let err = conn
        .receive_data(&[0x07, 0x5a, 0x00, 0x50, 0x7f, 0x00, 0x00, 0x01])
        .unwrap_err();
    assert!(matches!(err, socksio::Error::Protocol(_)));
    assert!(conn.is_failed());
}

#[test]
fn rejection_totality_socks5_unknown_address_type() {
    let mut conn = Socks5Connection::new();
    conn.negotiate_auth_methods(&[Socks5Method::NoAuthRequired]).unwrap();
    conn.data_to_send();
    conn.receive_data(&[0x05, 0x00]).unwrap();
    conn.request(Command::Connect, "127.0.0.1", 80).unwrap();
    conn.data_to_send();

    let err = conn
        .receive_data(&[0x05, 0x00, 0x00, 0x02, 0, 0, 0, 0])
        .unwrap_err();
    assert!(matches!(err, socksio::Error::Protocol(_)));
    assert!(conn.is_failed());
}

#[test]
fn scenario_socks4_connect_success_reply_code_is_granted() {
    assert!(Socks4ReplyCode::RequestGranted.is_granted());
    assert!(!Socks4ReplyCode::RequestRejectedOrFailed.is_granted());
    assert!(!Socks4ReplyCode::Unassigned(0x99).is_granted());
}
