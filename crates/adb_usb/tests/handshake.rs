mod common;

use adb_usb::{
    ADBCommand, ADBError, AUTH_RSAPUBLICKEY, AUTH_SIGNATURE, ConnectionConfig, ConnectionState,
    MessageCommand,
};
use common::*;
use std::time::Duration;

const TOKEN: &[u8; 20] = b"0123456789abcdefghij";

#[test]
fn cnxn_packet_advertises_host() -> anyhow::Result<()> {
    let mut device = device([cnxn()]);
    device.connect()?;

    let cnxn = &device.transport().sent[0];
    assert_eq!(cnxn.header().command(), MessageCommand::Cnxn);
    assert_eq!(cnxn.header().arg0(), 0x0100_0000);
    assert_eq!(cnxn.header().arg1(), 4096);
    assert_eq!(cnxn.payload(), b"host::\0");
    Ok(())
}

#[test]
fn device_without_auth_connects_directly() -> anyhow::Result<()> {
    let mut device = device([cnxn()]);
    device.connect()?;

    assert_eq!(device.state(), ConnectionState::Connected);
    assert_eq!(device.banner(), Some(DEVICE_BANNER));
    assert_eq!(device.transport().sent_commands(), [MessageCommand::Cnxn]);
    assert_eq!(device.transport().connects, 1);
    Ok(())
}

#[test]
fn signed_token_accepted() -> anyhow::Result<()> {
    let mut device = device([auth_token(TOKEN), cnxn()]);
    device.connect()?;

    let sent = &device.transport().sent;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].header().command(), MessageCommand::Auth);
    assert_eq!(sent[1].header().arg0(), AUTH_SIGNATURE);
    let expected: Vec<u8> = TOKEN.iter().rev().copied().collect();
    assert_eq!(sent[1].payload(), expected.as_slice());
    assert_eq!(device.state(), ConnectionState::Connected);
    Ok(())
}

#[test]
fn public_key_fallback_after_refused_signature() -> anyhow::Result<()> {
    let config = ConnectionConfig::default().with_auth_timeout(Duration::from_secs(30));
    let mut device = device_with_config([auth_token(TOKEN), auth_token(TOKEN), cnxn()], config);
    device.connect()?;

    let transport = device.transport();
    let auth: Vec<_> = transport
        .sent
        .iter()
        .filter(|m| m.header().command() == MessageCommand::Auth)
        .collect();
    assert_eq!(auth.len(), 2);
    assert_eq!(auth[0].header().arg0(), AUTH_SIGNATURE);
    assert_eq!(auth[1].header().arg0(), AUTH_RSAPUBLICKEY);

    let mut expected_key = PUBLIC_KEY.to_vec();
    expected_key.push(0);
    assert_eq!(auth[1].payload(), expected_key.as_slice());

    // the reply to the public key is awaited with the auth timeout
    assert_eq!(transport.read_timeouts.last(), Some(&Duration::from_secs(30)));
    assert_eq!(device.state(), ConnectionState::Connected);
    Ok(())
}

#[test]
fn signed_token_timeout_restarts_from_cnxn() -> anyhow::Result<()> {
    let mut device = device([auth_token(TOKEN), Reply::Timeout, cnxn()]);
    device.connect()?;

    assert_eq!(device.transport().count_sent(MessageCommand::Cnxn), 2);
    assert_eq!(device.state(), ConnectionState::Connected);
    Ok(())
}

#[test]
fn auth_challenge_timeout_restarts_from_cnxn() -> anyhow::Result<()> {
    let mut device = device([Reply::Timeout, auth_token(TOKEN), cnxn()]);
    device.connect()?;

    assert_eq!(
        device.transport().sent_commands(),
        [
            MessageCommand::Cnxn,
            MessageCommand::Cnxn,
            MessageCommand::Auth,
        ]
    );
    assert_eq!(device.state(), ConnectionState::Connected);
    Ok(())
}

#[test]
fn refused_public_key_restarts() -> anyhow::Result<()> {
    let mut device = device([
        auth_token(TOKEN),
        auth_token(TOKEN),
        auth_token(TOKEN),
        cnxn(),
    ]);
    device.connect()?;

    assert_eq!(
        device.transport().sent_commands(),
        [
            MessageCommand::Cnxn,
            MessageCommand::Auth,
            MessageCommand::Auth,
            MessageCommand::Cnxn,
        ]
    );
    assert_eq!(device.state(), ConnectionState::Connected);
    Ok(())
}

#[test]
fn attempts_are_capped() {
    let config = ConnectionConfig::default().with_max_connect_attempts(3);
    let mut device = device_with_config([], config);

    assert!(matches!(
        device.connect(),
        Err(ADBError::ConnectionAttemptsExhausted(3))
    ));
    assert_eq!(device.transport().count_sent(MessageCommand::Cnxn), 3);
    assert_eq!(device.transport().disconnects, 1);
    assert_eq!(device.state(), ConnectionState::NotConnected);
}

#[test]
fn unexpected_packet_aborts_and_releases() {
    let mut device = device([okay()]);

    assert!(matches!(
        device.connect(),
        Err(ADBError::ProtocolViolation(_))
    ));
    assert_eq!(device.transport().count_sent(MessageCommand::Cnxn), 1);
    assert_eq!(device.transport().disconnects, 1);
    assert_eq!(device.state(), ConnectionState::NotConnected);
}

#[test]
fn commands_require_a_connection() {
    let mut device = device([]);

    let result = device.run_command(ADBCommand::Shell {
        command: "ls".into(),
        print: false,
    });
    assert!(matches!(
        result,
        Err(ADBError::NotConnected(ConnectionState::NotConnected))
    ));
    assert!(device.transport().sent.is_empty());
}

#[test]
fn close_connection_releases_once() -> anyhow::Result<()> {
    let mut device = connected_device(vec![]);
    device.close_connection()?;

    assert_eq!(device.transport().disconnects, 1);
    assert_eq!(device.state(), ConnectionState::NotConnected);
    assert!(matches!(
        device.close_connection(),
        Err(ADBError::NotConnected(_))
    ));
    Ok(())
}
