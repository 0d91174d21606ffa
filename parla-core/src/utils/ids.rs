use uuid::Uuid;

/// Genera un nuovo clientMsgId unico (UUIDv4) come stringa.
pub fn new_client_msg_id() -> String {
    Uuid::new_v4().to_string()
}

/// Id canonico assegnato dal remote store ad un messaggio salvato.
pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}
