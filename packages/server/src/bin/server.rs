//! Multi-room chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatrelay-server
//! cargo run --bin chatrelay-server -- --host 0.0.0.0 --port 9000 --room lobby --room dev
//! ```

use std::sync::Arc;

use chatrelay_server::{
    config::{
        DEFAULT_HOST, DEFAULT_MAX_LINE_LENGTH, DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY, ServerConfig,
    },
    ui::Server,
    usecase::{ChatRegistry, DEFAULT_ROOMS},
};
use chatrelay_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatrelay-server")]
#[command(about = "Multi-room line-based chat relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Room created at startup (repeatable)
    #[arg(long = "room", value_name = "NAME", default_values = DEFAULT_ROOMS)]
    rooms: Vec<String>,

    /// Lines buffered per client before further lines to it are dropped
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Longest accepted input line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            default_rooms: args.rooms,
            outbound_queue_capacity: args.queue_capacity,
            max_line_length: args.max_line_length,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    let rooms = match config.validate() {
        Ok(rooms) => rooms,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    for room in &rooms {
        tracing::info!("Room {} created!", room);
    }

    let registry = Arc::new(ChatRegistry::new(Arc::new(SystemClock), rooms));
    let server = Server::new(registry, config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
