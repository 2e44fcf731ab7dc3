//! A client for a live-streaming platform's chat room: resolve, handshake,
//! join, decode, and dispatch — nothing more. See `crate::session` for the
//! state machine and `crate::resolver` for how a room id becomes a
//! `RoomDescriptor`.

pub mod config;
pub mod error;
pub mod resolver;
pub mod session;
mod tls;

use std::sync::Arc;

use chat_protocol::{ChatEvent, Dispatcher, EventKind};
use tokio_util::sync::CancellationToken;

pub use chat_protocol::RoomDescriptor;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use resolver::{HttpResolver, RoomResolver};
pub use session::SharedResolver;

/// A chat session, holding a resolver, its configuration, and the
/// subscriber table. One `ChatClient` drives at most one `run()` at a time.
pub struct ChatClient {
    resolver: SharedResolver,
    config: ClientConfig,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
}

impl ChatClient {
    /// Build a client with the default `HttpResolver`.
    pub fn new(config: ClientConfig) -> Self {
        let resolver: SharedResolver = Arc::new(HttpResolver::new(config.resolve_timeout));
        ChatClient {
            resolver,
            config,
            dispatcher: Dispatcher::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Build a client with a caller-supplied resolver — the seam
    /// integration tests use to avoid real network calls.
    pub fn with_resolver(config: ClientConfig, resolver: SharedResolver) -> Self {
        ChatClient {
            resolver,
            config,
            dispatcher: Dispatcher::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Register `handler` for every event of `kind`. Handlers run
    /// synchronously, in registration order, on whichever task is driving
    /// `run()` — they must not block.
    pub fn subscribe(&mut self, kind: EventKind, handler: impl Fn(&ChatEvent) + Send + Sync + 'static) {
        self.dispatcher.subscribe(kind, handler);
    }

    /// Resolve `room_id`, handshake into its chat room, and pump frames to
    /// subscribers until `close()` is called or a fatal error occurs. Does
    /// not return until the session reaches `closed`.
    pub async fn run(&self, room_id: &str) -> Result<(), ClientError> {
        session::run(
            room_id,
            self.resolver.as_ref(),
            &self.config,
            &self.dispatcher,
            self.cancel.clone(),
        )
        .await
    }

    /// Signal a running `run()` call to close. Idempotent; safe to call
    /// before `run()` starts or after it has already returned.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Default for ChatClient {
    fn default() -> Self {
        ChatClient::new(ClientConfig::default())
    }
}
