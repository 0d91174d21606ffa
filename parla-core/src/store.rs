/* Store riconciliato: unica collezione ordinata dei messaggi noti.
    Tre produttori (history, eventi push, conferme di invio) propongono candidati,
    lo store li ammette solo se l'id non è già stato visto.
    L'ordine visibile è quello di ammissione: nessun ordinamento per timestamp.
*/
use std::collections::HashSet;

use crate::models::{Message, MessageId};

#[derive(Debug, Clone, Default)]
pub struct ReconciledMessageStore {
    messages: Vec<Message>,
    seen: HashSet<MessageId>,
}

impl ReconciledMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applica la regola di dedup a ciascun candidato, nell'ordine di arrivo.
    /// Restituisce quanti messaggi sono stati ammessi.
    pub fn merge<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = Message>,
    {
        let mut admitted = 0;
        for candidate in candidates {
            if self.admit(candidate) {
                admitted += 1;
            }
        }
        admitted
    }

    /// Batch dalla history: gli elementi già presenti restano dove sono.
    pub fn merge_history(&mut self, batch: Vec<Message>) -> usize {
        self.merge(batch)
    }

    /// Evento dal canale push.
    pub fn merge_live(&mut self, message: Message) -> bool {
        self.admit(message)
    }

    /// Conferma di un invio locale.
    pub fn merge_confirmed(&mut self, message: Message) -> bool {
        self.admit(message)
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    // il primo candidato con un dato id vince, i successivi vengono scartati
    fn admit(&mut self, candidate: Message) -> bool {
        if !self.seen.insert(candidate.id.clone()) {
            return false;
        }
        self.messages.push(candidate);
        true
    }
}
