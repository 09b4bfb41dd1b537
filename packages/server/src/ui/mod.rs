//! TCP front end: accept loop and per-connection sessions.

mod server;
mod session;
mod signal;

pub use server::{Server, ServerError};
pub use session::{SessionSettings, handle_connection};
pub use signal::shutdown_signal;
