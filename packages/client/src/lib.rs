//! Interactive terminal client for the chatrelay server.

pub mod error;
pub mod input;
pub mod session;
pub mod ui;

pub use error::ClientError;
pub use session::run_client_session;
