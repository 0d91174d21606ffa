pub mod ids;
pub mod time;

pub use self::ids::{new_client_msg_id, new_message_id};
pub use self::time::{display_timestamp, format_rfc3339, now_timestamp, parse_timestamp};
