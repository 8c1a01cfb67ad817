//! One WebSocket viewing session.

use futures_util::{SinkExt, StreamExt};
use hookcast_shared::time::now_millis;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::error::ClientError;

use super::{
    domain::InputCommand,
    formatter::FrameFormatter,
    ui::redisplay_prompt,
};

const HELP: &str = "Commands: /hide (appear away), /show (appear active), /quit";

/// Watch the stream at `url` until the user quits or the connection drops.
///
/// Returns `Ok(())` when the user ends the session (`/quit`, Ctrl+C, Ctrl+D)
/// `Err(ClientError::ConnectionError)` when the server cannot be reached, and
/// `Err(ClientError::ConnectionLost)` when an established session drops.
pub async fn run_watch_session(
    url: &str,
    prompt: &str,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to {}", url);
    println!("\nWatching webhooks. {}\n", HELP);

    let (mut write, mut read) = ws_stream.split();

    let prompt_for_read = prompt.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", FrameFormatter::format_frame(&text, now_millis()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", FrameFormatter::format_binary(data.len()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ClientError::ConnectionLost("server went away".to_string()));
            }
            line = input.recv() => {
                let Some(line) = line else {
                    break;
                };

                let command = InputCommand::parse(&line);
                if command == InputCommand::Quit {
                    break;
                }
                match command.control_token() {
                    Some(token) => {
                        if let Err(e) = write.send(Message::Text(token.into())).await {
                            tracing::warn!("Failed to send '{}': {}", token, e);
                            read_task.abort();
                            return Err(ClientError::ConnectionLost(e.to_string()));
                        }
                        tracing::debug!("Sent control token '{}'", token);
                    }
                    None => {
                        println!("{}", HELP);
                        redisplay_prompt(prompt);
                    }
                }
            }
        }
    }

    if let Err(e) = write.send(Message::Close(None)).await {
        tracing::debug!("Failed to send close frame: {}", e);
    }
    read_task.abort();
    Ok(())
}
