//! Server execution logic.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::{config::ServerConfig, usecase::ChatRegistry};

use super::{
    session::{SessionSettings, handle_connection},
    signal::shutdown_signal,
};

/// Fatal server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Line-based TCP chat relay server
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(ChatRegistry::with_default_rooms());
/// let server = Server::new(registry, ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    registry: Arc<ChatRegistry>,
    config: ServerConfig,
}

impl Server {
    pub fn new(registry: Arc<ChatRegistry>, config: ServerConfig) -> Self {
        Self { registry, config }
    }

    /// Bind the configured address and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the listening socket cannot be bound.
    /// There is no retry.
    pub async fn run(self) -> Result<(), ServerError> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Accept connections on `listener` until `shutdown` resolves.
    ///
    /// Every accepted connection gets its own session task; there is no
    /// connection limit.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let settings = SessionSettings::from(&self.config);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Stopped accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted connection from {}", peer);
                        let registry = self.registry.clone();
                        tokio::spawn(handle_connection(stream, peer, registry, settings));
                    }
                    Err(e) => tracing::warn!("Failed to accept connection: {}", e),
                },
            }
        }
    }
}
