//! Chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --addr 0.0.0.0:8404
//! ```

use clap::Parser;
use hiroba_server::{
    config::{DEFAULT_ADDR, ServerConfig},
    metrics::install_recorder,
    ui::{Server, build_app_state},
};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Single-room ephemeral chat relay", long_about = None)]
struct Args {
    /// Address to listen on (host:port)
    #[arg(short = 'a', long, default_value = DEFAULT_ADDR)]
    addr: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ServerConfig::with_addr(args.addr);

    // 1. Metrics recorder (the server still runs without it)
    let metrics = match install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("Metrics disabled: {}", e);
            None
        }
    };

    // 2. Registry, Broadcaster, UseCases
    let state = build_app_state(&config, metrics);

    // 3. Run the server
    let server = Server::new(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
