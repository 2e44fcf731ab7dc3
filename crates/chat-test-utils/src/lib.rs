// chat-test-utils: shared mock chat server for chat-client's integration tests.

pub mod mock_chat_server;

pub use mock_chat_server::{MockChatConnection, MockChatServer};
