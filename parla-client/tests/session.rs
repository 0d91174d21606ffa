mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use common::{config_for, memory_channel, spawn_router, unreachable_base_url, wait_for_len};
use parla_client::{view, ChatSession, ClientConfig, MessageSender, OwnMessages};
use parla_server::{connect_pool, run_migrations, serve, AppState};
use serde_json::json;
use url::Url;

// Scenario: la history contiene id 1, poi arriva un evento live con lo stesso id
#[tokio::test]
async fn live_duplicate_of_history_appears_once() {
    let router = Router::new().route("/messages", get(|| async { Json(json!([{"id": 1, "text": "hi"}])) }));
    let config = config_for(spawn_router(router).await);
    let (feed, channel) = memory_channel();

    let session = ChatSession::start_with_channel(&config, channel).await.expect("session");
    assert_eq!(session.snapshot().len(), 1);

    feed.created(json!({"id": 1, "text": "hi"}));
    feed.created(json!({"id": 2, "text": "new"}));
    let snapshot = wait_for_len(session.store(), 2).await;

    let ids: Vec<&str> = snapshot.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["1", "2"]);
    session.shutdown().await.expect("shutdown");
    assert!(feed.is_closed());
}

// Scenario: history vuota e nessun evento, il rendering mostra lo stato "nessun messaggio"
#[tokio::test]
async fn empty_history_renders_placeholder() {
    let router = Router::new().route("/messages", get(|| async { Json(json!([])) }));
    let config = config_for(spawn_router(router).await);
    let (_feed, channel) = memory_channel();

    let session = ChatSession::start_with_channel(&config, channel).await.expect("session");

    assert!(session.snapshot().is_empty());
    assert_eq!(view::render(&session.snapshot()), vec![view::EMPTY_PLACEHOLDER.to_string()]);
    session.shutdown().await.expect("shutdown");
}

// Un load fallito lascia lo snapshot com'era e la sessione continua a ricevere eventi live
#[tokio::test]
async fn failed_history_load_keeps_snapshot() {
    let router = Router::new().route(
        "/messages",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let config = config_for(spawn_router(router).await);
    let (feed, channel) = memory_channel();

    let session = ChatSession::start_with_channel(&config, channel).await.expect("session");
    assert!(session.snapshot().is_empty());

    feed.created(json!({"id": "live", "text": "still here"}));
    wait_for_len(session.store(), 1).await;

    let err = session.refresh().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(session.snapshot().len(), 1);
    session.shutdown().await.expect("shutdown");
}

// Scenario: send fallisce con errore di transport, snapshot invariato e bozza conservata
#[tokio::test]
async fn failed_send_keeps_draft_and_snapshot() {
    let config = config_for(unreachable_base_url().await);
    let (feed, channel) = memory_channel();
    let mut session = ChatSession::start_with_channel(&config, channel).await.expect("session");

    feed.created(json!({"id": 1, "text": "from someone"}));
    let before = wait_for_len(session.store(), 1).await;

    session.set_draft("hello");
    let err = session.submit().await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(session.draft(), "hello");
    assert_eq!(session.snapshot(), before);
    session.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn blank_draft_is_ignored() {
    let config = config_for(unreachable_base_url().await);
    let (_feed, channel) = memory_channel();
    let mut session = ChatSession::start_with_channel(&config, channel).await.expect("session");

    session.set_draft("   ");
    assert!(session.submit().await.expect("no request").is_none());
    assert_eq!(session.draft(), "   ");
    session.shutdown().await.expect("shutdown");
}

async fn spawn_parla_server() -> (Url, Arc<AppState>) {
    let pool = connect_pool("sqlite::memory:").await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    let state = Arc::new(AppState::new(pool));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(serve(listener, state.clone()));
    (Url::parse(&format!("http://127.0.0.1:{port}")).expect("url"), state)
}

async fn wait_for_sessions(state: &AppState, n: usize) {
    for _ in 0..200 {
        if state.ws_sessions.len() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("push sessions never reached {n}");
}

/*
    Obiettivo test (end to end con parla-server):
    - la history esistente viene caricata all'avvio
    - un messaggio di un altro client arriva via push e non è nostro
    - un messaggio inviato da noi arriva sia come conferma HTTP sia come eco push,
      ma compare una sola volta ed è marcato come nostro
*/
#[tokio::test]
async fn end_to_end_with_reference_store() {
    let (base, state) = spawn_parla_server().await;
    let config = ClientConfig::new(base).expect("config");
    let other = MessageSender::new(
        config.http_client().expect("http"),
        config.messages_url().expect("url"),
        OwnMessages::default(),
    );

    let earlier = other.send("earlier").await.expect("seed history");

    let mut session = ChatSession::start(&config).await.expect("session");
    assert_eq!(session.snapshot().len(), 1);
    assert_eq!(session.snapshot()[0].id, earlier.id);
    wait_for_sessions(&state, 1).await;

    let theirs = other.send("from another client").await.expect("other send");
    let snapshot = wait_for_len(session.store(), 2).await;
    assert_eq!(snapshot[1].id, theirs.id);
    assert!(!snapshot[1].sent_by_me);

    session.set_draft("hello");
    let mine = session.submit().await.expect("send").expect("not blank");
    assert!(mine.sent_by_me);
    assert_eq!(session.draft(), "");

    // lascia il tempo all'eco push di arrivare
    tokio::time::sleep(Duration::from_millis(200)).await;
    let snapshot = session.snapshot();
    let copies: Vec<_> = snapshot.iter().filter(|m| m.id == mine.id).collect();
    assert_eq!(copies.len(), 1);
    assert!(copies[0].sent_by_me);
    assert_eq!(snapshot.len(), 3);

    // un refresh non duplica nulla
    assert_eq!(session.refresh().await.expect("refresh"), 0);
    assert_eq!(session.snapshot().len(), 3);

    session.shutdown().await.expect("shutdown");
    for _ in 0..200 {
        if state.ws_sessions.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("push session was not released on shutdown");
}
