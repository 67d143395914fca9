//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{RoomId, Username},
    infrastructure::{dto::websocket::OutgoingMessage, stream::WebSocketMessageStream},
    ui::{error::ApiError, state::AppState},
};

/// Frames buffered for one socket before writes to its stream wait
const OUTBOUND_BUFFER: usize = 32;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub room_id: String,
    pub username: String,
}

/// Validate the request, then upgrade.
///
/// Invalid input and unknown rooms are rejected with a status code before
/// the upgrade happens.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (room_id, username) = state
        .connect_participant_usecase
        .validate(query.room_id, query.username)
        .await
        .inspect_err(|e| tracing::warn!("Rejected WebSocket connection: {}", e))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, username)))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// The task sends a close frame and exits once every `WebSocketMessageStream`
/// holding the other end of the channel is gone.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

/// Spawns a task that routes frames sent by the participant through SendMessage.
fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    room_id: RoomId,
    username: Username,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(participant = %username, "WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let outgoing = match serde_json::from_str::<OutgoingMessage>(&text) {
                        Ok(outgoing) => outgoing,
                        Err(e) => {
                            tracing::warn!(
                                participant = %username,
                                "Ignoring malformed frame: {}",
                                e
                            );
                            continue;
                        }
                    };
                    if let Err(e) = state
                        .send_message_usecase
                        .execute(
                            room_id.to_string(),
                            username.to_string(),
                            outgoing.text,
                            outgoing.timestamp,
                        )
                        .await
                    {
                        tracing::warn!(participant = %username, "Failed to send message: {}", e);
                    }
                }
                Message::Close(_) => {
                    tracing::info!(participant = %username, "Client requested close");
                    break;
                }
                _ => {}
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    room_id: RoomId,
    username: Username,
) {
    let (sender, receiver) = socket.split();
    let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
    let token = CancellationToken::new();
    let stream = Arc::new(WebSocketMessageStream::new(tx, token.clone()));

    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = receive_loop(receiver, state.clone(), room_id.clone(), username.clone());
    let mut connect_task = {
        let usecase = state.connect_participant_usecase.clone();
        let room_id = room_id.clone();
        let username = username.clone();
        tokio::spawn(async move { usecase.execute(&room_id, username, stream).await })
    };

    // If the socket side finishes first, cancel the stream so the connection
    // detaches; if the connection ends first (room deleted, replaced or write
    // failure), stop reading from the socket.
    let mut send_finished = false;
    let connect_result = tokio::select! {
        _ = &mut recv_task => None,
        _ = &mut send_task => {
            send_finished = true;
            None
        }
        result = &mut connect_task => Some(result),
    };
    token.cancel();
    recv_task.abort();
    let connect_result = match connect_result {
        Some(result) => result,
        None => connect_task.await,
    };

    match connect_result {
        Ok(Ok(())) => {
            tracing::info!(room_id = %room_id, participant = %username, "WebSocket session ended")
        }
        Ok(Err(e)) => tracing::warn!(
            room_id = %room_id,
            participant = %username,
            "WebSocket session ended with error: {}",
            e
        ),
        Err(e) => tracing::error!(
            room_id = %room_id,
            participant = %username,
            "Connect task failed: {}",
            e
        ),
    }

    // The stream is dropped with the connect task, so the pusher loop drains
    // what is left and closes the socket.
    if !send_finished {
        let _ = send_task.await;
    }
}
