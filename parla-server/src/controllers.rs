use axum::{extract::Extension, http::StatusCode, Json, extract::WebSocketUpgrade, response::IntoResponse};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{StreamExt, SinkExt};
use parla_core::{
    error::Error, models::MessageId, protocol::http::{CreateMessageRequest, MessageRecord},
    protocol::ws::PushEvent, utils::{new_message_id, now_timestamp},
};
use sqlx::{sqlite::SqliteRow, Row};
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;

/// Errore restituito dagli handler: status HTTP più l'Error condiviso nel body.
pub type ApiError = (StatusCode, Json<Error>);

fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (status, Json(Error::new(code, message)))
}

fn db_error(e: sqlx::Error) -> ApiError {
    tracing::error!(error = %e, "database failure");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", format!("db error: {}", e))
}

fn record_from_row(row: &SqliteRow) -> Result<MessageRecord, sqlx::Error> {
    let message_id: String = row.try_get("message_id")?;
    Ok(MessageRecord {
        id: Some(MessageId::new(message_id)),
        text: Some(row.try_get("text")?),
        sent_by_me: Some(row.try_get("sent_by_me")?),
        date: Some(row.try_get("date")?),
        client_msg_id: row.try_get("client_msg_id")?,
    })
}

/// Handler per GET /messages
pub async fn list_messages(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<MessageRecord>>, ApiError> {
    // l'ordine di inserimento è l'unico ordine garantito
    let rows = sqlx::query("SELECT message_id, text, sent_by_me, date, client_msg_id FROM messages ORDER BY seq")
        .fetch_all(&state.pool)
        .await
        .map_err(db_error)?;
    let records = rows
        .iter()
        .map(record_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(db_error)?;
    Ok(Json(records))
}

/// Handler per POST /messages
pub async fn create_message(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageRecord>), ApiError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "invalid_message", "text must not be empty"));
    }

    // l'id canonico lo assegna sempre il server
    let message_id = new_message_id();
    let date = req
        .date
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(now_timestamp);

    sqlx::query("INSERT INTO messages (message_id, text, sent_by_me, date, client_msg_id) VALUES (?, ?, ?, ?, ?)")
        .bind(&message_id)
        .bind(text)
        .bind(req.sent_by_me)
        .bind(&date)
        .bind(&req.client_msg_id)
        .execute(&state.pool)
        .await
        .map_err(db_error)?;

    let record = MessageRecord {
        id: Some(MessageId::new(message_id)),
        text: Some(text.to_string()),
        sent_by_me: Some(req.sent_by_me),
        date: Some(date),
        client_msg_id: req.client_msg_id,
    };

    // notifica tutte le sessioni push, compresa quella di chi ha inviato
    match serde_json::to_string(&PushEvent::MessageCreated(record.clone())) {
        Ok(frame) => {
            let delivered = state.broadcast(&frame);
            tracing::debug!(id = ?record.id, delivered, "message created");
        }
        Err(e) => tracing::warn!(error = %e, "could not encode push frame"),
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// Handler per /ws
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4().to_string();

    // Register sender per questa sessione WebSocket.
    // `tx` è un `UnboundedSender<String>` che `AppState::broadcast` usa
    // per inviare frame a questo client (server -> client).
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    state.ws_sessions.insert(session_id.clone(), tx.clone());
    tracing::info!(%session_id, "push session opened");

    /* socket.split() divide l'oggetto WebSocket in due metà indipendenti:
        sender (un Sink) usato per inviare messaggi verso il client,
        receiver (uno Stream) usato per ricevere messaggi dal client. */
    let (mut sender, mut receiver) = socket.split();

    // Task: forward messages from rx -> websocket
    let forward_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Il canale è solo server -> client: ai frame testuali rispondiamo con un errore
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(_) => {
                let err = Error::new("read_only", "the push channel does not accept frames");
                if let Ok(frame) = serde_json::to_string(&PushEvent::Error(err)) {
                    let _ = tx.send(frame);
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // cleanup
    state.ws_sessions.remove(&session_id);
    drop(tx);
    // ensure forward task ends
    let _ = forward_task.await;
    tracing::info!(%session_id, "push session closed");
}
