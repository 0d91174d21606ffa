/* Canale push e sottoscrizione agli eventi "messages created".
    Il canale è un handle posseduto esplicitamente e iniettato nel subscriber:
    in produzione un websocket (WsPushChannel), nei test qualunque implementazione di PushChannel.
*/
use async_trait::async_trait;
use futures_util::StreamExt;
use parla_core::{Message, MessageRecord, PushFrame};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsFrame};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ClientError;
use crate::sender::OwnMessages;

#[async_trait]
pub trait PushChannel: Send + 'static {
    /// Prossimo frame testuale. `None` quando il canale si è chiuso.
    async fn next_frame(&mut self) -> Option<Result<String, ClientError>>;

    /// Rilascia il canale.
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Canale push su websocket (GET /ws del remote store).
pub struct WsPushChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsPushChannel {
    pub async fn connect(url: &Url) -> Result<Self, ClientError> {
        let (stream, _) = connect_async(url.as_str()).await?;
        info!(%url, "push channel connected");
        Ok(Self { stream })
    }
}

#[async_trait]
impl PushChannel for WsPushChannel {
    async fn next_frame(&mut self) -> Option<Result<String, ClientError>> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsFrame::Text(text))) => return Some(Ok(text)),
                Some(Ok(WsFrame::Close(_))) | None => return None,
                // ping, pong e frame binari non portano eventi
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Trasforma gli eventi del canale push in `Message` normalizzati.
pub struct LiveUpdateSubscriber<C> {
    channel: C,
    own: OwnMessages,
}

impl<C: PushChannel> LiveUpdateSubscriber<C> {
    pub fn new(channel: C, own: OwnMessages) -> Self {
        Self { channel, own }
    }

    /// Avvia la lettura del canale. `on_message` viene chiamata una volta per evento,
    /// nell'ordine di arrivo, dal task della sottoscrizione.
    pub fn subscribe<F>(self, mut on_message: F) -> Subscription
    where
        F: FnMut(Message) + Send + 'static,
    {
        let Self { mut channel, own } = self;
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let outcome = loop {
                tokio::select! {
                    // lo stop ha la precedenza: dopo unsubscribe nessun altro frame viene consegnato
                    biased;
                    _ = &mut stop_rx => break Ok(()),
                    frame = channel.next_frame() => match frame {
                        Some(Ok(text)) => {
                            if let Some(message) = decode_frame(&text, &own) {
                                on_message(message);
                            }
                        }
                        Some(Err(e)) => break Err(e),
                        None => break Err(ClientError::ChannelClosed),
                    },
                }
            };
            if let Err(e) = channel.close().await {
                debug!(error = %e, "push channel close failed");
            }
            outcome
        });

        Subscription { stop: stop_tx, task }
    }
}

/// Handle di una sottoscrizione attiva.
///
/// Anche il drop ferma il task e chiude il canale, ma solo `unsubscribe` attende
/// che sia successo.
pub struct Subscription {
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), ClientError>>,
}

impl Subscription {
    /// Ferma la sottoscrizione e chiude il canale. Quando ritorna, `on_message` non verrà
    /// più chiamata. Se il canale era già caduto restituisce l'errore che l'ha chiuso.
    pub async fn unsubscribe(self) -> Result<(), ClientError> {
        let Self { stop, task } = self;
        // il task potrebbe essere già terminato: in quel caso il receiver non c'è più
        let _ = stop.send(());
        task.await?
    }

    /// true se il canale è caduto (o la sottoscrizione è stata fermata).
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}

fn decode_frame(text: &str, own: &OwnMessages) -> Option<Message> {
    let frame: PushFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "dropping malformed push frame");
            return None;
        }
    };
    if !frame.is_message_created() {
        debug!(kind = %frame.kind, "ignoring push event");
        return None;
    }

    let record: MessageRecord = match serde_json::from_value(frame.payload) {
        Ok(record) => record,
        Err(e) => {
            warn!(error = %e, "dropping push event with malformed payload");
            return None;
        }
    };
    // l'eco consuma l'id: la conferma HTTP non ne ha bisogno
    let mine = record
        .client_msg_id
        .as_deref()
        .is_some_and(|id| own.take(id));

    let message = Message::from_record(record, mine);
    match &message {
        Some(m) => debug!(id = %m.id, mine, "live message"),
        None => warn!("dropping push event without id"),
    }
    message
}
