//! Shared test doubles for `chat-client`'s integration tests.

use async_trait::async_trait;
use chat_client::error::ResolveError;
use chat_client::{RoomDescriptor, RoomResolver};

/// A canned resolver: returns a fixed `RoomDescriptor` or a fixed failure,
/// regardless of the `room_id` it's asked to resolve. Lets the state
/// machine tests drive `ChatClient::run` without a real HTTP call.
pub enum StubResolver {
    Live(RoomDescriptor),
    NotLive,
}

#[async_trait]
impl RoomResolver for StubResolver {
    async fn resolve(&self, _room_id: &str) -> Result<RoomDescriptor, ResolveError> {
        match self {
            StubResolver::Live(descriptor) => Ok(descriptor.clone()),
            StubResolver::NotLive => Err(ResolveError::NotLive),
        }
    }
}

/// A `RoomDescriptor` with placeholder fields, overridable per test.
pub fn sample_descriptor() -> RoomDescriptor {
    RoomDescriptor {
        live: true,
        chat_host: "Chat-X".to_owned(),
        chat_port: 5000,
        room_id: "99".to_owned(),
        broadcaster_id: "bj1".to_owned(),
        broadcaster_name: "Streamer".to_owned(),
        title: "Test stream".to_owned(),
        geo_cc: "US".to_owned(),
        geo_rc: "".to_owned(),
        accept_language: "en".to_owned(),
        service_language: "en".to_owned(),
        quality_presets: vec!["HD".to_owned()],
    }
}
