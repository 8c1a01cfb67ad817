//! Terminal viewer for a Hookcast server.
//!
//! `watch` follows the broadcast stream and prints webhook messages and the
//! presence roster. Type `/hide` or `/show` to report yourself away or back.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! `post` sends one webhook payload.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hookcast-client -- watch --name alice
//! cargo run --bin hookcast-client -- post "deploy finished"
//! ```

use clap::{Parser, Subcommand};

use hookcast_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hookcast-client")]
#[command(about = "Terminal viewer and webhook sender for Hookcast", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the broadcast stream
    Watch {
        /// Display name shown to other viewers
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// WebSocket endpoint of the server
        #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/events")]
        url: String,
    },
    /// Send a webhook payload
    Post {
        /// Payload to broadcast (HTML allowed)
        payload: String,

        /// Webhook endpoint of the server
        #[arg(short = 'u', long, default_value = "http://127.0.0.1:8080/webhook")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let result = match args.command {
        Command::Watch { name, url } => hookcast_client::run_watcher(url, name).await,
        Command::Post { payload, url } => {
            hookcast_client::post_webhook(&reqwest::Client::new(), &url, payload).await
        }
    };

    if let Err(e) = result {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
