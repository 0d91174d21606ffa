use reqwest::Response;
use thiserror::Error;

/// Errori del client. `Transport` e `Status` insieme formano la classe "transport":
/// rete, timeout e risposte non 2xx. Nessuno di questi viene ritentato internamente.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rete, timeout o TLS (layer reqwest).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Il remote store ha risposto con uno status non 2xx.
    #[error("remote store answered {status}: {message}")]
    Status { status: u16, message: String },

    /// La risposta non ha la forma attesa.
    #[error("unexpected response format: {0}")]
    Format(String),

    #[error("message text is empty")]
    EmptyText,

    /// Errore del websocket sottostante al canale push.
    #[error("push channel error: {0}")]
    Push(#[from] tokio_tungstenite::tungstenite::Error),

    /// Il canale push si è chiuso: serve una nuova sottoscrizione.
    #[error("push channel closed")]
    ChannelClosed,

    #[error("subscription task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// Lascia passare le risposte 2xx, trasforma le altre in `ClientError::Status`.
/// Se il body è un `parla_core::Error` ne usa il messaggio.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<parla_core::Error>(&body) {
        Ok(err) => err.message,
        Err(_) if body.is_empty() => status.canonical_reason().unwrap_or("no reason").to_string(),
        Err(_) => body,
    };
    Err(ClientError::Status { status: status.as_u16(), message })
}
