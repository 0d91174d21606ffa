use parla_core::Message;

/// Mostrato al posto della lista quando lo snapshot è vuoto.
pub const EMPTY_PLACEHOLDER: &str = "No messages yet";

/// Una riga per messaggio, `>` per quelli inviati da qui e `<` per quelli ricevuti.
pub fn render(snapshot: &[Message]) -> Vec<String> {
    if snapshot.is_empty() {
        return vec![EMPTY_PLACEHOLDER.to_string()];
    }
    snapshot.iter().map(render_line).collect()
}

pub fn render_line(message: &Message) -> String {
    let marker = if message.sent_by_me { '>' } else { '<' };
    format!("{marker} {}  [{}]", message.text, message.timestamp.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parla_core::{MessageId, Timestamp};
    use time::macros::datetime;

    #[test]
    fn empty_snapshot_shows_placeholder() {
        assert_eq!(render(&[]), vec![EMPTY_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn lines_mark_direction() {
        let ts = Timestamp::from(datetime!(2025-11-02 10:20:30 UTC));
        let sent = Message { id: MessageId::new("1"), text: "hi".into(), sent_by_me: true, timestamp: ts };
        let received = Message { sent_by_me: false, id: MessageId::new("2"), ..sent.clone() };

        assert_eq!(
            render(&[sent, received]),
            vec!["> hi  [2025-11-02 10:20:30]".to_string(), "< hi  [2025-11-02 10:20:30]".to_string()]
        );
    }

    // una date che non sappiamo leggere viene mostrata così come l'ha mandata il server
    #[test]
    fn raw_dates_are_shown_verbatim() {
        let message = Message {
            id: MessageId::new("1"),
            text: "hi".into(),
            sent_by_me: false,
            timestamp: Timestamp::Raw("10/18/2025, 3:04:05 PM".into()),
        };
        assert_eq!(render_line(&message), "< hi  [10/18/2025, 3:04:05 PM]");
    }
}
