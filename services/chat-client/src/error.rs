use thiserror::Error;

pub use chat_protocol::FrameFormatError;

/// Resolution failed before a `RoomDescriptor` was ever produced.
///
/// Fatal: the session ends before `connecting`. Distinct from `NotLive` so
/// callers can treat that case as a polite "retry later" instead of a hard
/// failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request to the room resolution endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("room resolution response was not valid JSON or was missing the CHANNEL object")]
    InvalidShape,
    #[error("room is not currently live")]
    NotLive,
}

/// The WebSocket upgrade to the chat endpoint failed.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("invalid chat WebSocket URL: {0}")]
    InvalidUrl(String),
    #[error("WebSocket handshake failed: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),
}

/// A send failed, or the session observed a frame it could not have
/// received in its current state. Fatal: drives the machine to `closing`.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to send {frame} frame: {source}")]
    Send {
        frame: &'static str,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("socket read failed: {0}")]
    Read(#[source] tokio_tungstenite::tungstenite::Error),
    #[error("peer closed the WebSocket")]
    PeerClosed,
}

/// Top-level error `run()` returns on a fatal path.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// A stable short tag for the `disconnect` event's `error_kind` field.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            ClientError::Resolve(ResolveError::NotLive) => "not_live",
            ClientError::Resolve(_) => "resolve_error",
            ClientError::Handshake(_) => "handshake_error",
            ClientError::Protocol(_) => "protocol_error",
        }
    }
}
