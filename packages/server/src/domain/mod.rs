//! Domain layer for the chat relay.
//!
//! Value objects, messages, commands, and the `Client` / `Room` pair that
//! the registry coordinates.

pub mod client;
pub mod command;
pub mod error;
pub mod message;
pub mod pusher;
pub mod room;
pub mod value_object;

pub use client::Client;
pub use command::Command;
pub use error::{ChatError, PushError, ValueObjectError};
pub use message::{Message, MessageKind};
pub use pusher::MessagePusher;
pub use room::Room;
pub use value_object::{ClientId, RoomName, Username};
