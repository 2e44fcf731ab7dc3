//! Exercises `session::drive_session` against a mock chat server.
//!
//! `drive_session` takes an already-dialed `ChatStream`, so these tests
//! sidestep the TLS handshake `session::run` performs and connect to the
//! mock server in plaintext — the same seam `chat-test-utils::MockChatServer`
//! was built for.

mod common;

use std::sync::{Arc, Mutex};

use chat_client::config::ClientConfig;
use chat_client::session::drive_session;
use chat_protocol::{EventKind, SEPARATOR};
use chat_test_utils::MockChatServer;
use tokio_util::sync::CancellationToken;

fn chat_frame_payload() -> Vec<u8> {
    [
        &[SEPARATOR][..],
        b"hello from the room",
        &[SEPARATOR],
        b"user1",
        &[SEPARATOR, SEPARATOR, SEPARATOR, SEPARATOR],
        b"Nick",
    ]
    .concat()
}

#[tokio::test]
async fn frame_ordering_raw_precedes_every_decoded_kind() {
    let mut server = MockChatServer::start().await.expect("mock server binds");
    let (ws_stream, _response) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .expect("dial succeeds");

    let seen: Arc<Mutex<Vec<EventKind>>> = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = chat_protocol::Dispatcher::new();
    for kind in [
        EventKind::Raw,
        EventKind::Connect,
        EventKind::EnterChatRoom,
        EventKind::Chat,
        EventKind::Disconnect,
    ] {
        let seen = seen.clone();
        dispatcher.subscribe(kind, move |event| seen.lock().unwrap().push(event.kind()));
    }

    let config = ClientConfig::default();
    let cancel = CancellationToken::new();

    let drive = tokio::spawn(async move { drive_session(ws_stream, "99", &config, &dispatcher, cancel).await });

    let connection = server.next_connection().await;
    connection.send_frame("0005", &chat_frame_payload());
    connection.send_frame("0007", &[SEPARATOR]);

    let result = drive.await.expect("drive task does not panic");
    assert!(result.is_ok(), "clean server-initiated disconnect is not an error: {result:?}");

    let kinds = seen.lock().unwrap().clone();
    assert_eq!(
        kinds,
        vec![
            EventKind::Raw,
            EventKind::Connect,
            EventKind::Raw,
            EventKind::EnterChatRoom,
            EventKind::Raw,
            EventKind::Chat,
            EventKind::Raw,
            EventKind::Disconnect,
        ]
    );
}

#[tokio::test]
async fn disconnect_is_emitted_exactly_once_on_server_close() {
    let mut server = MockChatServer::start().await.expect("mock server binds");
    let (ws_stream, _response) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .expect("dial succeeds");

    let disconnects = Arc::new(Mutex::new(0usize));
    let mut dispatcher = chat_protocol::Dispatcher::new();
    let counter = disconnects.clone();
    dispatcher.subscribe(EventKind::Disconnect, move |_| *counter.lock().unwrap() += 1);

    let config = ClientConfig::default();
    let cancel = CancellationToken::new();
    let drive = tokio::spawn(async move { drive_session(ws_stream, "99", &config, &dispatcher, cancel).await });

    let connection = server.next_connection().await;
    connection.send_frame("0007", &[SEPARATOR]);

    let _ = drive.await.expect("drive task does not panic");
    assert_eq!(*disconnects.lock().unwrap(), 1);
}

#[tokio::test]
async fn unknown_type_code_does_not_interrupt_the_session() {
    let mut server = MockChatServer::start().await.expect("mock server binds");
    let (ws_stream, _response) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .expect("dial succeeds");

    let unknowns = Arc::new(Mutex::new(0usize));
    let mut dispatcher = chat_protocol::Dispatcher::new();
    let counter = unknowns.clone();
    dispatcher.subscribe(EventKind::Unknown, move |_| *counter.lock().unwrap() += 1);

    let config = ClientConfig::default();
    let cancel = CancellationToken::new();
    let drive = tokio::spawn(async move { drive_session(ws_stream, "99", &config, &dispatcher, cancel).await });

    let connection = server.next_connection().await;
    connection.send_frame("9999", &[SEPARATOR]);
    connection.send_frame("0007", &[SEPARATOR]);

    let result = drive.await.expect("drive task does not panic");
    assert!(result.is_ok());
    assert_eq!(*unknowns.lock().unwrap(), 1);
}
