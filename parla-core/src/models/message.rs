use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::protocol::http::MessageRecord;
use crate::utils::time::{display_timestamp, parse_timestamp};

/// Testo mostrato quando un record arriva senza `text`.
pub const PLACEHOLDER_TEXT: &str = "No text available";

/// Identificativo opaco assegnato dal remote store.
///
/// Sul wire può essere una stringa o un intero: `1` e `"1"` sono lo stesso id.
/// Viene sempre riserializzato come stringa.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(s) => Self(s),
            WireId::Signed(n) => Self(n.to_string()),
            WireId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// Istante di creazione di un messaggio.
///
/// Le `date` leggibili diventano un istante strutturato; quelle che non lo sono
/// (es. "18/10/2025, 15:04:05" prodotta da un altro client) restano com'erano
/// e vengono mostrate così come sono.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Instant(OffsetDateTime),
    Raw(String),
}

impl Timestamp {
    pub fn now() -> Self {
        Self::Instant(OffsetDateTime::now_utc())
    }

    /// `date` vuota o assente non arriva qui: la decide `Message::from_record`.
    pub fn from_wire(raw: &str) -> Self {
        match parse_timestamp(raw) {
            Some(ts) => Self::Instant(ts),
            None => Self::Raw(raw.to_string()),
        }
    }

    pub fn instant(&self) -> Option<OffsetDateTime> {
        match self {
            Self::Instant(ts) => Some(*ts),
            Self::Raw(_) => None,
        }
    }

    /// Testo per il layer di rendering.
    pub fn display(&self) -> String {
        match self {
            Self::Instant(ts) => display_timestamp(*ts),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(ts: OffsetDateTime) -> Self {
        Self::Instant(ts)
    }
}

/// Messaggio di dominio, già normalizzato e pronto per lo store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    /// Annotazione solo locale, non fa parte dell'identità sul server.
    pub sent_by_me: bool,
    pub timestamp: Timestamp,
}

impl Message {
    /// Normalizza un record ricevuto dal remote store.
    ///
    /// Restituisce `None` se manca l'id: lo store non deve mai vedere candidati senza id.
    /// `text` vuoto o assente diventa [`PLACEHOLDER_TEXT`], `date` vuota o assente diventa
    /// l'istante corrente; una `date` presente ma non leggibile resta testo grezzo.
    /// Il `sentByMe` del record viene ignorato: decide il chiamante.
    pub fn from_record(record: MessageRecord, sent_by_me: bool) -> Option<Self> {
        let id = record.id?;
        let text = record
            .text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_TEXT.to_string());
        let timestamp = match record.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Timestamp::from_wire(raw),
            _ => Timestamp::now(),
        };

        Some(Self { id, text, sent_by_me, timestamp })
    }
}
