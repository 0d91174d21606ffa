use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use parla_core::{new_client_msg_id, now_timestamp, CreateMessageRequest, Message, MessageRecord};
use tracing::debug;
use url::Url;

use crate::error::{ensure_success, ClientError};

/// clientMsgId dei messaggi inviati da questo client.
/// Condiviso tra sender e subscriber: un'eco live che arriva prima della conferma
/// HTTP viene comunque riconosciuta come nostra.
#[derive(Debug, Clone, Default)]
pub struct OwnMessages(Arc<Mutex<HashSet<String>>>);

impl OwnMessages {
    pub fn register(&self, client_msg_id: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(client_msg_id.to_string());
    }

    pub fn contains(&self, client_msg_id: &str) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(client_msg_id)
    }

    /// Rimuove l'id e dice se c'era. Ogni id viene riconosciuto una volta sola.
    pub fn take(&self, client_msg_id: &str) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(client_msg_id)
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Invia un messaggio con POST /messages e restituisce la forma canonica assegnata dal server.
#[derive(Debug, Clone)]
pub struct MessageSender {
    http: reqwest::Client,
    url: Url,
    own: OwnMessages,
}

impl MessageSender {
    pub fn new(http: reqwest::Client, messages_url: Url, own: OwnMessages) -> Self {
        Self { http, url: messages_url, own }
    }

    /// Il testo viene trimmato; vuoto dopo il trim è `EmptyText` e nessuna richiesta parte.
    /// Il messaggio restituito ha sempre `sent_by_me = true`, qualunque cosa dica l'eco.
    pub async fn send(&self, text: &str) -> Result<Message, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyText);
        }

        let client_msg_id = new_client_msg_id();
        self.own.register(&client_msg_id);
        let request = CreateMessageRequest {
            text: text.to_string(),
            sent_by_me: true,
            date: Some(now_timestamp()),
            client_msg_id: Some(client_msg_id.clone()),
        };
        debug!(%client_msg_id, "sending message");

        let outcome = self.post(&request).await;
        if outcome.is_err() {
            // nessuna eco arriverà per un invio fallito
            self.own.take(&client_msg_id);
        }
        outcome
    }

    async fn post(&self, request: &CreateMessageRequest) -> Result<Message, ClientError> {
        let response = self.http.post(self.url.clone()).json(request).send().await?;
        let body = ensure_success(response).await?.bytes().await?;
        let record: MessageRecord = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Format(format!("send echo is not a message record: {e}")))?;

        Message::from_record(record, true)
            .ok_or_else(|| ClientError::Format("send echo has no id".to_string()))
    }
}
