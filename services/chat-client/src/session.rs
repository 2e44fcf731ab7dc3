//! The session state machine: resolve, handshake, join, and pump frames
//! until the caller cancels or a fatal error closes the connection.
//!
//! Mirrors the connect/handshake/send/recv shape other services in this
//! workspace use for their uplinks, generalized to this protocol's
//! handshake (`CONNECT` → `0001` ack → `JOIN` → `0002` ack) and its single
//! extra concurrent actor, the keepalive ticker.

use std::sync::Arc;
use std::time::Duration;

use chat_protocol::frame::{encode_connect, encode_join, encode_ping};
use chat_protocol::{ChatEvent, Dispatcher, Frame};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{ClientError, HandshakeError, ProtocolError};
use crate::resolver::RoomResolver;
use crate::tls::build_connector;

/// Where a session is in its lifetime. Not part of the public surface;
/// tracked for logging and to gate which frames are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Resolving,
    Connecting,
    Connected,
    Joined,
    Active,
    Closing,
    Closed,
}

/// The concrete stream type both the TLS and plaintext dial paths produce,
/// so `drive_session` can be exercised directly against a stream a test
/// dialed itself (see `chat-test-utils::MockChatServer`).
pub type ChatStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Drive one session to completion: resolve `room_id`, handshake, join,
/// and pump frames through `dispatcher` until `cancel` fires or a fatal
/// error occurs. Does not return until the session reaches `closed`.
pub async fn run(
    room_id: &str,
    resolver: &(dyn RoomResolver),
    config: &ClientConfig,
    dispatcher: &Dispatcher,
    cancel: CancellationToken,
) -> Result<(), ClientError> {
    tracing::debug!(room_id, state = ?SessionState::Resolving, "session starting");

    let descriptor = resolver.resolve(room_id).await?;

    tracing::debug!(state = ?SessionState::Connecting, "resolved, dialing chat websocket");

    let url = descriptor.websocket_url(room_id);
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| HandshakeError::InvalidUrl(e.to_string()))?;
    request
        .headers_mut()
        .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("chat"));

    if config.tls_insecure {
        tracing::warn!("TLS certificate verification is disabled for this session");
    }
    let connector = build_connector(config.tls_insecure);

    let (ws_stream, _response) =
        tokio_tungstenite::connect_async_tls_with_config(request, None, false, connector)
            .await
            .map_err(HandshakeError::Tungstenite)?;

    drive_session(ws_stream, &descriptor.room_id, config, dispatcher, cancel).await
}

/// Pump CONNECT/JOIN handshake frames and the receive loop over an
/// already-established WebSocket. Split out of `run` so integration tests
/// can dial a plaintext `ChatStream` against a mock server directly,
/// without needing a TLS-terminating mock.
pub async fn drive_session(
    ws_stream: ChatStream,
    join_room_id: &str,
    config: &ClientConfig,
    dispatcher: &Dispatcher,
    cancel: CancellationToken,
) -> Result<(), ClientError> {
    let mut state = SessionState::Connected;
    let (mut write, mut read) = ws_stream.split();

    tracing::debug!(?state, "websocket connected, sending CONNECT");

    write
        .send(Message::Binary(encode_connect().into()))
        .await
        .map_err(|source| ProtocolError::Send { frame: "CONNECT", source })?;

    let (ping_tx, mut ping_rx) = mpsc::unbounded_channel::<()>();
    let mut keepalive_handle: Option<tokio::task::JoinHandle<()>> = None;

    let mut server_disconnect_reason: Option<String> = None;
    let mut fatal: Option<ClientError> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("cancellation requested, closing session");
                break;
            }
            _ = ping_rx.recv() => {
                if let Err(source) = write.send(Message::Binary(encode_ping().into())).await {
                    fatal = Some(ProtocolError::Send { frame: "PING", source }.into());
                    break;
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Binary(bytes))) => {
                        let bytes_vec = bytes.to_vec();
                        dispatcher.emit(&ChatEvent::raw(bytes_vec.clone(), Utc::now()));

                        let frame = match Frame::decode(&bytes_vec) {
                            Ok(f) => f,
                            Err(e) => {
                                tracing::warn!(error = %e, "dropping malformed frame");
                                continue;
                            }
                        };

                        if frame.type_code == "0007" {
                            // Stash the reason; the post-loop block is the
                            // single emission site for `disconnect`, after
                            // the keepalive task and socket are torn down.
                            server_disconnect_reason = Some("server closed the session".to_owned());
                            break;
                        }

                        let event = ChatEvent::decode(&frame, Utc::now());

                        if frame.type_code == "0001" && state == SessionState::Connected {
                            state = SessionState::Joined;
                            tracing::debug!(?state, "connect acked, sending JOIN");
                            if let Err(source) = write.send(Message::Binary(encode_join(join_room_id).into())).await {
                                fatal = Some(ProtocolError::Send { frame: "JOIN", source }.into());
                                dispatcher.emit(&event);
                                break;
                            }
                            let interval = config.keepalive_interval;
                            let keepalive_tx = ping_tx.clone();
                            let keepalive_cancel = cancel.clone();
                            keepalive_handle = Some(tokio::spawn(keepalive_loop(interval, keepalive_tx, keepalive_cancel)));
                        } else if frame.type_code == "0002" && state == SessionState::Joined {
                            state = SessionState::Active;
                            tracing::debug!(?state, "joined, session active");
                        }

                        dispatcher.emit(&event);
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        fatal = Some(ProtocolError::PeerClosed.into());
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(source)) => {
                        fatal = Some(ProtocolError::Read(source).into());
                        break;
                    }
                }
            }
        }
    }

    state = SessionState::Closing;
    tracing::debug!(?state, "tearing down session");

    cancel.cancel();
    if let Some(handle) = keepalive_handle {
        let _ = handle.await;
    }
    let _ = write.close().await;

    state = SessionState::Closed;
    tracing::debug!(?state, "session closed");

    let (reason, error_kind) = match (server_disconnect_reason, &fatal) {
        (Some(reason), _) => (reason, None),
        (None, Some(err)) => (err.to_string(), Some(err.kind_tag().to_owned())),
        (None, None) => ("client closed the session".to_owned(), None),
    };
    dispatcher.emit(&ChatEvent::Disconnect {
        reason,
        error_kind,
        received_at: Utc::now(),
    });

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn keepalive_loop(interval: Duration, ping_tx: mpsc::UnboundedSender<()>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; consume it
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if ping_tx.send(()).is_err() {
                    break;
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}

/// Shorthand for the shared-ownership form `ChatClient` holds its resolver
/// in, so tests can inject a stub without pulling in the HTTP stack.
pub type SharedResolver = Arc<dyn RoomResolver>;
