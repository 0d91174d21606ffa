use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

// ri-utilizziamo le funzioni e strutture definite in lib.rs
use parla_server::{build_sqlite_url, connect_pool, run_migrations, serve, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Costruisci l'URL del database SQLite
    let db_url = build_sqlite_url().context("build sqlite DATABASE_URL")?;
    tracing::info!(%db_url, "using database");
    // Connetti al database
    let pool = connect_pool(&db_url).await.context("connect to sqlite")?;
    // Esegui le migrazioni del database
    run_migrations(&pool).await.context("run migrations")?;
    // Crea lo stato dell'applicazione condiviso
    let state = Arc::new(AppState::new(pool));
    // Ottieni l'indirizzo di binding dal env o usa il default
    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3030".to_string());
    // converte la stringa bind in un socketAddr -> il tipo della libreria standard che rappresenta host + porta
    let addr: SocketAddr = bind.parse().context("parse BIND_ADDR")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind tcp listener")?;
    tracing::info!("listening on http://{}", addr);

    serve(listener, state).await
}
