//! Server configuration.

use thiserror::Error;

use crate::{
    domain::{RoomName, ValueObjectError},
    usecase::DEFAULT_ROOMS,
};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid default room '{name}': {source}")]
    InvalidRoom {
        name: String,
        #[source]
        source: ValueObjectError,
    },

    #[error("outbound queue capacity must be greater than zero")]
    ZeroQueueCapacity,

    #[error("maximum line length must be greater than zero")]
    ZeroMaxLineLength,
}

/// Runtime configuration of the chat relay server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Rooms created at startup
    pub default_rooms: Vec<String>,
    /// Lines buffered per client before further lines to it are dropped
    pub outbound_queue_capacity: usize,
    /// Longest accepted input line in bytes; a longer line ends the session
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            default_rooms: DEFAULT_ROOMS.iter().map(|name| name.to_string()).collect(),
            outbound_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check every setting, returning the validated default room names
    pub fn validate(&self) -> Result<Vec<RoomName>, ConfigError> {
        if self.outbound_queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.max_line_length == 0 {
            return Err(ConfigError::ZeroMaxLineLength);
        }

        self.default_rooms
            .iter()
            .map(|name| {
                RoomName::new(name).map_err(|source| ConfigError::InvalidRoom {
                    name: name.clone(),
                    source,
                })
            })
            .collect()
    }
}
