use std::time::Duration;

use url::Url;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3030";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configurazione del client, letta una volta all'avvio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Radice del remote store; `messages` viene risolto rispetto a questo URL.
    pub base_url: Url,
    pub push_url: Url,
    /// Limite per ogni richiesta HTTP; la scadenza è un errore di transport.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let base_url = with_trailing_slash(base_url);
        let push_url = push_url_for(&base_url)?;
        Ok(Self { base_url, push_url, request_timeout: DEFAULT_TIMEOUT })
    }

    /// Legge PARLA_BASE_URL, PARLA_PUSH_URL e PARLA_TIMEOUT_SECS, con i default se assenti.
    pub fn from_env() -> Result<Self, ClientError> {
        let base = std::env::var("PARLA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(parse_url("PARLA_BASE_URL", &base)?)?;

        if let Ok(push) = std::env::var("PARLA_PUSH_URL") {
            config.push_url = parse_url("PARLA_PUSH_URL", &push)?;
        }
        if let Ok(secs) = std::env::var("PARLA_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("PARLA_TIMEOUT_SECS is not a number: {secs}")))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_push_url(mut self, push_url: Url) -> Self {
        self.push_url = push_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn messages_url(&self) -> Result<Url, ClientError> {
        self.base_url
            .join("messages")
            .map_err(|e| ClientError::Config(format!("cannot build messages url: {e}")))
    }

    /// Client HTTP condiviso da history e invio, con il timeout già applicato.
    pub fn http_client(&self) -> Result<reqwest::Client, ClientError> {
        Ok(reqwest::Client::builder().timeout(self.request_timeout).build()?)
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw.trim()).map_err(|e| ClientError::Config(format!("{var} is not a valid url ({e}): {raw}")))
}

// senza lo slash finale join("messages") sostituirebbe l'ultimo segmento
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn push_url_for(base: &Url) -> Result<Url, ClientError> {
    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(ClientError::Config(format!("unsupported base url scheme: {other}"))),
    };
    let mut url = base.join("ws").map_err(|e| ClientError::Config(format!("cannot build push url: {e}")))?;
    url.set_scheme(scheme)
        .map_err(|()| ClientError::Config(format!("cannot switch {base} to {scheme}")))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_url_follows_base_url() {
        let config = ClientConfig::new(Url::parse("http://localhost:3030").unwrap()).unwrap();
        assert_eq!(config.push_url.as_str(), "ws://localhost:3030/ws");
        assert_eq!(config.messages_url().unwrap().as_str(), "http://localhost:3030/messages");

        let config = ClientConfig::new(Url::parse("https://chat.example.com/api").unwrap()).unwrap();
        assert_eq!(config.push_url.as_str(), "wss://chat.example.com/api/ws");
        assert_eq!(config.messages_url().unwrap().as_str(), "https://chat.example.com/api/messages");
    }

    #[test]
    fn non_http_base_is_rejected() {
        let err = ClientConfig::new(Url::parse("ftp://localhost").unwrap()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
