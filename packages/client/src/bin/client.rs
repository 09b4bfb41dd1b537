//! Terminal chat client for the chatrelay server.
//!
//! Connects over TCP, registers the chosen username with `/setname`, prints
//! every line the server sends, and forwards typed lines. `/quit` exits.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatrelay-client -- --username alice
//! cargo run --bin chatrelay-client -- -a 127.0.0.1:9000
//! ```

use clap::Parser;

use chatrelay_client::{
    input::resolve_username,
    run_client_session,
    ui::prompt_username,
};
use chatrelay_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "chatrelay-client")]
#[command(about = "Terminal client for the chatrelay multi-room chat server", long_about = None)]
struct Args {
    /// Server address (host:port)
    #[arg(short = 'a', long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Username to register; prompted for when omitted
    #[arg(short = 'u', long)]
    username: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let username = match args.username {
        Some(name) => resolve_username(Some(&name)),
        None => match prompt_username() {
            Ok(name) => name,
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = run_client_session(&args.addr, &username).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
