//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode, header::AUTHORIZATION},
        protocol::Message,
    },
};

use kaiwa_server::infrastructure::dto::websocket::{ChatMessage, OutgoingMessage};
use kaiwa_shared::time::get_timestamp_millis;

use crate::{api::ApiClient, error::ClientError};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// Run one WebSocket session for `username` in `room_id`
///
/// History is printed first, followed by live messages. Lines typed on stdin
/// are sent over the same socket. Returns `Ok` when the user ends the input.
pub async fn run_client_session(
    api: &ApiClient,
    room_id: &str,
    username: &str,
) -> Result<(), ClientError> {
    let url = api.websocket_url(room_id, username)?;
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    if let Some(token) = api.token() {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    let (ws_stream, _response) = match connect_async(request).await {
        Ok(result) => result,
        Err(tungstenite::Error::Http(response)) => {
            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(ClientError::RoomNotFound(room_id.to_string()));
            }
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to chat server!");
    print!("{}", MessageFormatter::format_connected(room_id, username));

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming messages
    let username_for_read = username.to_string();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<ChatMessage>(&text) {
                        Ok(chat) => MessageFormatter::format_chat_message(
                            &chat.from,
                            &chat.text,
                            chat.timestamp,
                            &username_for_read,
                        ),
                        Err(_) => MessageFormatter::format_raw_message(&text),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(&username_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&username_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", username);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to send stdin lines over the WebSocket
    let username_for_write = username.to_string();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let msg = OutgoingMessage {
                text: line,
                timestamp: get_timestamp_millis(),
            };

            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send message: {}", e);
                write_error = true;
                break;
            }

            print!("\n{}", MessageFormatter::format_sent_confirmation(msg.timestamp));
            redisplay_prompt(&username_for_write);
        }

        let _ = write.send(Message::Close(None)).await;
        write_error
    });

    // If any one of the tasks completes, abort the other
    let connection_lost = tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            read_result.unwrap_or(false)
        }
        write_result = &mut write_task => {
            read_task.abort();
            write_result.unwrap_or(false)
        }
    };

    if connection_lost {
        return Err(ClientError::ConnectionError("Connection lost".to_string()));
    }
    Ok(())
}
