use parla_core::Message;
use tracing::{error, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::history::HistoryLoader;
use crate::live::{LiveUpdateSubscriber, PushChannel, Subscription, WsPushChannel};
use crate::sender::{MessageSender, OwnMessages};
use crate::shared::SharedStore;

/// Sessione di chat: collega history, canale push e invio allo stesso store,
/// e tiene la bozza del messaggio in composizione.
pub struct ChatSession {
    store: SharedStore,
    history: HistoryLoader,
    sender: MessageSender,
    subscription: Option<Subscription>,
    draft: String,
}

impl ChatSession {
    /// Apre il canale push su `config.push_url` e avvia la sessione.
    pub async fn start(config: &ClientConfig) -> Result<Self, ClientError> {
        let channel = WsPushChannel::connect(&config.push_url).await?;
        Self::start_with_channel(config, channel).await
    }

    /// Come `start`, con un canale push fornito dal chiamante.
    ///
    /// La sottoscrizione parte prima del caricamento della history, così nessun evento
    /// creato durante il load va perso. Un load fallito lascia lo snapshot vuoto:
    /// viene loggato e la sessione resta utilizzabile.
    pub async fn start_with_channel<C: PushChannel>(
        config: &ClientConfig,
        channel: C,
    ) -> Result<Self, ClientError> {
        let http = config.http_client()?;
        let messages_url = config.messages_url()?;
        let own = OwnMessages::default();
        let store = SharedStore::new();

        let live_store = store.clone();
        let subscription = LiveUpdateSubscriber::new(channel, own.clone()).subscribe(move |message| {
            live_store.merge_live(message);
        });

        let session = Self {
            store,
            history: HistoryLoader::new(http.clone(), messages_url.clone()),
            sender: MessageSender::new(http, messages_url, own),
            subscription: Some(subscription),
            draft: String::new(),
        };
        // l'errore è già loggato da refresh
        let _ = session.refresh().await;
        info!(messages = session.store.len(), "chat session started");
        Ok(session)
    }

    /// Ricarica la history e la unisce allo snapshot. In caso di errore lo snapshot non cambia.
    pub async fn refresh(&self) -> Result<usize, ClientError> {
        match self.history.load().await {
            Ok(batch) => Ok(self.store.merge_history(batch)),
            Err(e) => {
                error!(error = %e, "history load failed");
                Err(e)
            }
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Invia la bozza corrente.
    ///
    /// Bozza vuota: nessuna richiesta, `Ok(None)`. Successo: la conferma entra nello store
    /// e la bozza viene svuotata. Errore: bozza e snapshot restano come prima, il retry è
    /// lasciato all'utente.
    pub async fn submit(&mut self) -> Result<Option<Message>, ClientError> {
        if self.draft.trim().is_empty() {
            return Ok(None);
        }
        match self.sender.send(&self.draft).await {
            Ok(message) => {
                self.store.merge_confirmed(message.clone());
                self.draft.clear();
                Ok(Some(message))
            }
            Err(e) => {
                error!(error = %e, "send failed, draft kept");
                Err(e)
            }
        }
    }

    /// true finché il canale push è attivo. Se è caduto serve una nuova sessione.
    pub fn is_live(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Chiude la sottoscrizione e rilascia il canale push.
    pub async fn shutdown(mut self) -> Result<(), ClientError> {
        let Some(subscription) = self.subscription.take() else {
            return Ok(());
        };
        match subscription.unsubscribe().await {
            Err(ClientError::ChannelClosed) => {
                warn!("push channel had already dropped");
                Ok(())
            }
            other => other,
        }
    }
}
