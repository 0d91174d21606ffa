pub mod ws;
pub mod http;

// Re-export comodi
pub use ws::{PushEvent, PushFrame, MESSAGES_CREATED};
pub use http::{CreateMessageRequest, ListMessagesResponse, MessageRecord};
