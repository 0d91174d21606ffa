#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parla_client::{ClientConfig, ClientError, PushChannel, SharedStore};
use parla_core::Message;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use url::Url;

/// Canale push in memoria: i test scrivono i frame dal lato `MemoryFeed`.
pub struct MemoryChannel {
    frames: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

pub struct MemoryFeed {
    tx: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

pub fn memory_channel() -> (MemoryFeed, MemoryChannel) {
    let (tx, frames) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));
    (MemoryFeed { tx, closed: closed.clone() }, MemoryChannel { frames, closed })
}

#[async_trait]
impl PushChannel for MemoryChannel {
    async fn next_frame(&mut self) -> Option<Result<String, ClientError>> {
        self.frames.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.closed.store(true, Ordering::SeqCst);
        self.frames.close();
        Ok(())
    }
}

impl MemoryFeed {
    /// false se il subscriber ha già chiuso il canale.
    pub fn push(&self, frame: impl Into<String>) -> bool {
        self.tx.send(frame.into()).is_ok()
    }

    pub fn created(&self, payload: Value) -> bool {
        self.push(json!({"type": "messages created", "payload": payload}).to_string())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Avvia un router axum su una porta libera e ne restituisce l'URL base.
pub async fn spawn_router(router: axum::Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move { axum::serve(listener, router.into_make_service()).await });
    Url::parse(&format!("http://127.0.0.1:{port}")).expect("url")
}

/// URL base su cui non ascolta nessuno.
pub async fn unreachable_base_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{port}")).expect("url")
}

pub fn config_for(base: Url) -> ClientConfig {
    ClientConfig::new(base).expect("config").with_timeout(Duration::from_secs(2))
}

/// Attende che lo snapshot abbia almeno `n` messaggi.
pub async fn wait_for_len(store: &SharedStore, n: usize) -> Vec<Message> {
    let mut updates = store.watch();
    let wait = async {
        loop {
            {
                let snapshot = updates.borrow_and_update();
                if snapshot.len() >= n {
                    return snapshot.clone();
                }
            }
            updates.changed().await.expect("store alive");
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("snapshot never reached the expected size")
}
