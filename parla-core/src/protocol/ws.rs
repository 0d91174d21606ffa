/* Questo file definisce come viaggiano i dati sul canale push (server -> client).
    PushEvent è l'enum dell'envelope { type, payload }:
    MessageCreated -> "messages created", un messaggio appena salvato dal server
    Error -> errore fuori banda
    Il client legge prima un PushFrame generico, così i tipi che non conosce vengono ignorati
    invece di far fallire la deserializzazione.
*/
use serde::{Deserialize, Serialize};

use crate::{error::Error, protocol::http::MessageRecord};

/// Nome dell'evento emesso quando il remote store crea un messaggio.
pub const MESSAGES_CREATED: &str = "messages created";

/// Evento push con envelope { type, payload }.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PushEvent {
    /// Server → Client: nuovo messaggio creato.
    #[serde(rename = "messages created")]
    MessageCreated(MessageRecord),
    /// Server → Client: errore fuori banda.
    #[serde(rename = "error")]
    Error(Error),
}

/// Vista non tipizzata di un frame push.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl PushFrame {
    pub fn is_message_created(&self) -> bool {
        self.kind == MESSAGES_CREATED
    }
}
