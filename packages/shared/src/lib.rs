//! Utilities shared by the chatrelay server and client binaries.

pub mod logger;
pub mod time;
