//! Webhook fan-out server.
//!
//! Accepts webhooks and sends their payload to every client connected via
//! WebSocket, together with a live list of who is connected.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hookcast-server
//! cargo run --bin hookcast-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use hookcast_server::{
    client::{ConnectionSettings, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_QUEUE_CAPACITY},
    domain::{DEFAULT_HISTORY_SIZE, MessageHistory},
    hub::Hub,
    infrastructure::HtmxRosterFormatter,
    ui::{Server, ServerConfig},
    usecase::{AcceptConnectionUseCase, ListClientsUseCase, PublishWebhookUseCase},
};
use hookcast_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hookcast-server")]
#[command(about = "Broadcasts webhook payloads to connected WebSocket clients", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Capacity of each client's outbound queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Maximum size in bytes of a frame accepted from a client
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,

    /// Seconds a client may stay silent before it is disconnected
    #[arg(long, default_value = "60")]
    pong_wait_secs: u64,

    /// Seconds allowed to write one frame to a client
    #[arg(long, default_value = "10")]
    write_wait_secs: u64,

    /// Number of webhook messages shown on the home page
    #[arg(long, default_value_t = DEFAULT_HISTORY_SIZE)]
    history_size: usize,

    /// Directory containing static assets
    #[arg(long, default_value = "assets")]
    assets_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let settings = ConnectionSettings {
        queue_capacity: args.queue_capacity,
        max_message_size: args.max_message_size,
        pong_wait: Duration::from_secs(args.pong_wait_secs.max(1)),
        write_wait: Duration::from_secs(args.write_wait_secs.max(1)),
    };
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        assets_dir: args.assets_dir,
    };

    // Initialize dependencies in order:
    // 1. Hub
    // 2. UseCases
    // 3. Server

    // 1. Start the hub event loop
    let (hub, hub_handle) = Hub::spawn(Arc::new(HtmxRosterFormatter));

    // 2. Create UseCases
    let accept_connection_usecase = Arc::new(AcceptConnectionUseCase::new(hub.clone(), settings));
    let publish_webhook_usecase = Arc::new(PublishWebhookUseCase::new(
        Arc::new(hub.clone()),
        MessageHistory::new(args.history_size),
        Arc::new(SystemClock),
    ));
    let list_clients_usecase = Arc::new(ListClientsUseCase::new(hub.clone()));

    // 3. Create and run the server
    let server = Server::new(
        hub.clone(),
        accept_connection_usecase,
        publish_webhook_usecase,
        list_clients_usecase,
    );
    let result = server.run(config).await;

    hub.shutdown();
    if let Err(e) = hub_handle.await {
        tracing::error!("Hub task failed: {}", e);
    }

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
