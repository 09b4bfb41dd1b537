//! Outbound delivery seam.
//!
//! The domain pushes finished display lines through this trait and never
//! touches sockets directly. The concrete implementation lives in the
//! infrastructure layer.

use async_trait::async_trait;

use super::error::PushError;

/// Push lines to exactly one connected client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Hand one line (without trailing newline) to the client's connection
    async fn push(&self, line: &str) -> Result<(), PushError>;
}
