use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use parla_core::{Message, ReconciledMessageStore};
use tokio::sync::watch;

/// Store riconciliato condiviso tra i produttori e il layer di rendering.
///
/// Ogni merge e ogni lettura passano dallo stesso mutex; dopo ogni merge che ammette
/// qualcosa viene pubblicato un nuovo snapshot sul canale `watch`.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<ReconciledMessageStore>>,
    updates: Arc<watch::Sender<Vec<Message>>>,
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStore {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Mutex::new(ReconciledMessageStore::new())),
            updates: Arc::new(updates),
        }
    }

    pub fn merge_history(&self, batch: Vec<Message>) -> usize {
        let mut store = self.lock();
        let admitted = store.merge_history(batch);
        self.publish(&store, admitted > 0);
        admitted
    }

    pub fn merge_live(&self, message: Message) -> bool {
        let mut store = self.lock();
        let admitted = store.merge_live(message);
        self.publish(&store, admitted);
        admitted
    }

    pub fn merge_confirmed(&self, message: Message) -> bool {
        let mut store = self.lock();
        let admitted = store.merge_confirmed(message);
        self.publish(&store, admitted);
        admitted
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().snapshot().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Receiver notificato ad ogni cambiamento dello snapshot.
    pub fn watch(&self) -> watch::Receiver<Vec<Message>> {
        self.updates.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, ReconciledMessageStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // pubblicato con il lock ancora preso, così gli snapshot escono nello stesso ordine dei merge
    fn publish(&self, store: &ReconciledMessageStore, changed: bool) {
        if changed {
            self.updates.send_replace(store.snapshot().to_vec());
        }
    }
}
