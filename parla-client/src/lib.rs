//! parla-client: client del remote store Parla.
//!
//! Tre adattatori ([`HistoryLoader`], [`LiveUpdateSubscriber`], [`MessageSender`]) alimentano
//! uno [`SharedStore`] riconciliato; [`ChatSession`] li collega come fa l'applicazione e
//! [`view`] produce le righe da mostrare.

pub mod config;
pub mod error;
pub mod history;
pub mod live;
pub mod sender;
pub mod session;
pub mod shared;
pub mod view;

pub use config::ClientConfig;
pub use error::ClientError;
pub use history::HistoryLoader;
pub use live::{LiveUpdateSubscriber, PushChannel, Subscription, WsPushChannel};
pub use sender::{MessageSender, OwnMessages};
pub use session::ChatSession;
pub use shared::SharedStore;
