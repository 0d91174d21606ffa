//! parla-core: tipi condivisi tra client e server (modelli, DTO HTTP, eventi push, errori)
//! e lo store che riconcilia history, eventi live e conferme di invio.
//! Niente I/O o dipendenze non compatibili con WASM.

pub mod models;
pub mod protocol;
pub mod error;
pub mod store;
pub mod utils;

// Re-export utili per ridurre i percorsi nei crate client/server
pub use error::Error;
pub use models::{Message, MessageId, Timestamp, PLACEHOLDER_TEXT};
pub use protocol::ws::{PushEvent, PushFrame, MESSAGES_CREATED};
pub use protocol::http::{CreateMessageRequest, ListMessagesResponse, MessageRecord};
pub use store::ReconciledMessageStore;
pub use utils::{display_timestamp, format_rfc3339, new_client_msg_id, new_message_id, now_timestamp, parse_timestamp};
