use anyhow::Context;
use parla_client::{view, ChatSession, ClientConfig};
use parla_core::Message;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// Ogni riga da stdin è un messaggio da inviare; una riga vuota ritenta l'ultima bozza fallita.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // i log vanno su stderr, stdout resta per la lista dei messaggi
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env().context("read client configuration")?;
    let mut session = ChatSession::start(&config).await.context("start chat session")?;
    let mut updates = session.store().watch();
    print_snapshot(&session.snapshot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else { break };
                if !line.trim().is_empty() {
                    session.set_draft(line);
                }
                if let Err(e) = session.submit().await {
                    eprintln!("send failed: {e} (press enter to retry \"{}\")", session.draft());
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_snapshot(&snapshot);
            }
        }
        if !session.is_live() {
            eprintln!("push channel closed, exiting");
            break;
        }
    }

    session.shutdown().await.context("close push channel")?;
    Ok(())
}

fn print_snapshot(snapshot: &[Message]) {
    println!("----");
    for line in view::render(snapshot) {
        println!("{line}");
    }
}
