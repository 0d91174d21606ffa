use parla_core::{Message, MessageRecord};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ensure_success, ClientError};

/// Carica la history completa con GET /messages.
///
/// Ogni record viene normalizzato: `text` mancante diventa il placeholder, `date` mancante
/// l'istante corrente, `sent_by_me` è sempre false. I record senza id vengono scartati qui,
/// prima di arrivare allo store. Può essere richiamato più volte (refresh).
#[derive(Debug, Clone)]
pub struct HistoryLoader {
    http: reqwest::Client,
    url: Url,
}

impl HistoryLoader {
    pub fn new(http: reqwest::Client, messages_url: Url) -> Self {
        Self { http, url: messages_url }
    }

    pub async fn load(&self) -> Result<Vec<Message>, ClientError> {
        let response = self.http.get(self.url.clone()).send().await?;
        let body = ensure_success(response).await?.bytes().await?;

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Format(format!("history body is not json: {e}")))?;
        let Value::Array(items) = value else {
            return Err(ClientError::Format("history body is not an array of messages".to_string()));
        };

        let total = items.len();
        let messages: Vec<Message> = items.into_iter().filter_map(normalize).collect();
        debug!(loaded = messages.len(), skipped = total - messages.len(), "history loaded");
        Ok(messages)
    }
}

fn normalize(item: Value) -> Option<Message> {
    let record: MessageRecord = match serde_json::from_value(item) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, "skipping malformed history record");
            return None;
        }
    };
    let message = Message::from_record(record, false);
    if message.is_none() {
        warn!("skipping history record without id");
    }
    message
}
