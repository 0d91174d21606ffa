use serde::{Deserialize, Serialize};

use crate::models::MessageId;
/*
    dto per le richieste http su /messages
*/

/// Record di un messaggio così come viaggia sul wire (GET /messages, risposta di POST, eventi push).
/// In ingresso ogni campo è opzionale: la normalizzazione avviene in `Message::from_record`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_by_me: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Echo del clientMsgId scelto da chi ha inviato il messaggio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_msg_id: Option<String>,
}

// GET /messages restituisce direttamente un array JSON, senza envelope
pub type ListMessagesResponse = Vec<MessageRecord>;

/// Body di POST /messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sent_by_me: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>, // RFC3339 (opzionale)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_msg_id: Option<String>,
}
