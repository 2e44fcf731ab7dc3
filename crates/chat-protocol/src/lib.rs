//! Wire format and message/event types for the chat room protocol.
//!
//! No I/O lives here — just the delimiter-based frame codec, the decoded
//! event types, and the subscriber dispatch table. `services/chat-client`
//! owns the HTTP resolve call, the WebSocket handshake, and the state
//! machine that drives frames through this crate.

pub mod dispatch;
pub mod error;
pub mod event;
pub mod frame;
pub mod types;

pub use dispatch::{Dispatcher, Handler};
pub use error::FrameFormatError;
pub use event::{ChatEvent, Donation, EventKind};
pub use frame::{Frame, ELEMENT_END, ELEMENT_START, SEPARATOR, SPACE, STARTER};
pub use types::RoomDescriptor;
