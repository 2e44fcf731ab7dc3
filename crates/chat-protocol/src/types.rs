use serde::{Deserialize, Serialize};

/// Room parameters resolved once, before the WebSocket handshake.
///
/// Immutable for the lifetime of a session; a session resolves at most one
/// of these (resolution is not retried in-band).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    /// Whether the room is currently broadcasting. `false` fails resolution
    /// with `NotLive` before a descriptor is ever handed back to the caller.
    pub live: bool,
    /// Lowercased before the WebSocket URL is built.
    pub chat_host: String,
    /// The advertised port; the effective WebSocket port is `chat_port + 1`.
    pub chat_port: u32,
    /// Opaque chat-room number (the platform's `CHATNO`) sent back in the
    /// JOIN payload. Distinct from the room identifier the caller passed
    /// to `resolve`/`run`, which is used for the HTTP call and the
    /// WebSocket path instead — mirroring the upstream protocol's own
    /// split between the two identifiers.
    pub room_id: String,
    pub broadcaster_id: String,
    pub broadcaster_name: String,
    pub title: String,
    pub geo_cc: String,
    pub geo_rc: String,
    pub accept_language: String,
    pub service_language: String,
    pub quality_presets: Vec<String>,
}

impl RoomDescriptor {
    /// The effective WebSocket port, per the `+1` offset the upstream
    /// protocol has always used (see DESIGN.md Open Question (a) — do not
    /// "fix" this).
    pub fn websocket_port(&self) -> u32 {
        self.chat_port + 1
    }

    /// The WebSocket URL to dial for this room. `path_room_id` is the
    /// identifier the caller originally passed to `resolve` — the wire
    /// protocol uses that in the URL path, not `self.room_id` (see the
    /// field doc above).
    pub fn websocket_url(&self, path_room_id: &str) -> String {
        format!(
            "wss://{}:{}/Websocket/{}",
            self.chat_host.to_lowercase(),
            self.websocket_port(),
            path_room_id
        )
    }
}
