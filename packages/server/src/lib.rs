//! Multi-room line-based chat relay server.
//!
//! Clients connect over TCP, adopt a username, join named rooms, and
//! exchange room, server-wide, and private messages. Each line on the wire
//! is one UTF-8 message terminated by `\n`.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
