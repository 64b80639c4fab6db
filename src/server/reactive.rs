use super::{ cors, AppState };
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::session::{ ChatSession, LazyPipeline };
use axum::{
    extract::{ ws::{ Message, WebSocket, WebSocketUpgrade }, State },
    response::{ Html, Response },
    routing::get,
    Router,
};
use chrono::Utc;
use futures::{ stream::SplitSink, SinkExt, StreamExt };
use log::{ info, warn, error };
use std::error::Error;
use std::sync::Arc;

const INDEX_PAGE: &str = include_str!("../../templates/index.html");
const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .layer(cors())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let pipeline = Arc::clone(&state.pipeline);
    ws.on_upgrade(move |socket| handle_socket(socket, pipeline))
}

async fn send_frame(
    tx: &mut SplitSink<WebSocket, Message>,
    frame: &ServerMessage
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let json = serde_json::to_string(frame)?;
    tx.send(Message::Text(json.into())).await?;
    Ok(())
}

/// One socket is one session: its own transcript, turns handled in arrival order.
async fn handle_socket(socket: WebSocket, pipeline: Arc<LazyPipeline>) {
    let (mut tx, mut rx) = socket.split();
    let mut session = ChatSession::new();
    info!("New chat session {}", session.id());

    while let Some(msg) = rx.next().await {
        let message = match msg {
            Ok(message) => message,
            Err(e) => {
                warn!("Session {} read error: {}", session.id(), e);
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        if text.as_str().len() > MAX_MESSAGE_SIZE {
            warn!(
                "Message in session {} exceeds size limit ({} > {})",
                session.id(),
                text.as_str().len(),
                MAX_MESSAGE_SIZE
            );
            let frame = ServerMessage::Error { message: "Message too large".to_string() };
            if let Err(e) = send_frame(&mut tx, &frame).await {
                error!("Failed to send size limit error in session {}: {}", session.id(), e);
            }
            if let Err(e) = tx.send(Message::Close(None)).await {
                warn!("Failed to close session {}: {}", session.id(), e);
            }
            break;
        }

        let frame = match serde_json::from_str::<ClientMessage>(text.as_str()) {
            Ok(ClientMessage::Chat { content }) => {
                if let Err(e) = send_frame(&mut tx, &ServerMessage::Processing).await {
                    error!("Error sending processing status in session {}: {}", session.id(), e);
                    break;
                }

                match session.handle_turn(&pipeline, &content).await {
                    Ok(answer) =>
                        ServerMessage::Response {
                            content: answer,
                            timestamp: Utc::now().timestamp(),
                        },
                    Err(e) =>
                        ServerMessage::Error {
                            message: format!("Error processing request: {}", e),
                        },
                }
            }
            Err(e) => {
                error!("Failed to parse message in session {}: {}", session.id(), e);
                ServerMessage::Error {
                    message: format!("Failed to parse message: {}", e),
                }
            }
        };

        if let Err(e) = send_frame(&mut tx, &frame).await {
            error!("Error sending message in session {}: {}", session.id(), e);
            break;
        }
    }

    info!(
        "Chat session {} closed after {} message(s)",
        session.id(),
        session.transcript().len()
    );
}
