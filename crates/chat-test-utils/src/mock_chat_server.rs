//! A scriptable mock chat server for exercising the session state machine
//! without a real network dependency.
//!
//! Mirrors `rt-test-utils::MockWsServer`: binds a random port, auto-replies
//! to the CONNECT/JOIN handshake frames, and hands the test a handle it can
//! use to push additional frames or close the connection on demand.

use std::net::SocketAddr;

use chat_protocol::frame::{Frame, SEPARATOR};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message;

/// Commands a test drives into an accepted connection.
enum ServerCommand {
    SendFrame(Vec<u8>),
    SendBytes(Vec<u8>),
    Close,
}

/// A handle to one accepted connection on the mock server.
pub struct MockChatConnection {
    tx: mpsc::UnboundedSender<ServerCommand>,
}

impl MockChatConnection {
    /// Send a well-formed frame to the client.
    pub fn send_frame(&self, type_code: &str, payload: &[u8]) {
        let bytes = Frame::encode(type_code, payload);
        let _ = self.tx.send(ServerCommand::SendFrame(bytes));
    }

    /// Send arbitrary bytes, bypassing the codec (for malformed-frame tests).
    pub fn send_raw(&self, bytes: Vec<u8>) {
        let _ = self.tx.send(ServerCommand::SendBytes(bytes));
    }

    /// Close the underlying WebSocket, simulating a server-initiated drop.
    pub fn close(&self) {
        let _ = self.tx.send(ServerCommand::Close);
    }
}

/// A mock chat server for integration tests.
pub struct MockChatServer {
    addr: SocketAddr,
    conn_rx: mpsc::UnboundedReceiver<MockChatConnection>,
    _task: tokio::task::JoinHandle<()>,
}

impl MockChatServer {
    /// Start the server, binding to a random available port.
    pub async fn start() -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (conn_tx, conn_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            accept_loop(listener, conn_tx).await;
        });

        Ok(Self {
            addr,
            conn_rx,
            _task: task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// The `ws://` URL a client should dial.
    pub fn ws_url(&self) -> String {
        format!("ws://{}/Websocket/test-room", self.addr)
    }

    /// Wait for the next client connection to complete its handshake and
    /// return a handle for scripting further frames.
    pub async fn next_connection(&mut self) -> MockChatConnection {
        self.conn_rx
            .recv()
            .await
            .expect("mock server accept task is still running")
    }
}

async fn accept_loop(listener: TcpListener, conn_tx: mpsc::UnboundedSender<MockChatConnection>) {
    loop {
        match listener.accept().await {
            Ok((stream, _peer)) => {
                let conn_tx = conn_tx.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, conn_tx).await;
                });
            }
            Err(_) => break,
        }
    }
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    conn_tx: mpsc::UnboundedSender<MockChatConnection>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
    let mut handle_sent = false;

    loop {
        tokio::select! {
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Binary(bytes))) => {
                        if let Ok(frame) = Frame::decode(&bytes) {
                            match frame.type_code.as_str() {
                                "0001" => {
                                    let ack = Frame::encode(
                                        "0001",
                                        &[&[SEPARATOR][..], b"mock_user", &[SEPARATOR], b"syn"].concat(),
                                    );
                                    write.send(Message::Binary(ack.into())).await?;
                                    if !handle_sent {
                                        handle_sent = true;
                                        let _ = conn_tx.send(MockChatConnection { tx: cmd_tx.clone() });
                                    }
                                }
                                "0002" => {
                                    let ack = Frame::encode(
                                        "0002",
                                        &[&[SEPARATOR, SEPARATOR][..], b"streamer", &[SEPARATOR; 4][..], b"ack"].concat(),
                                    );
                                    write.send(Message::Binary(ack.into())).await?;
                                }
                                _ => {}
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ServerCommand::SendFrame(bytes)) | Some(ServerCommand::SendBytes(bytes)) => {
                        write.send(Message::Binary(bytes.into())).await?;
                    }
                    Some(ServerCommand::Close) | None => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
