//! Chat Store - Replay Binary
//!
//! Replays a JSONL event log into a store and writes the resulting snapshot.
//!
//! ```text
//! chat-store-replay <events.jsonl> [snapshot.json]
//! ```
//!
//! Without a snapshot argument the path comes from `CHAT_STORE_SNAPSHOT_PATH`;
//! if that is unset too, the snapshot is printed to stdout.

use std::sync::Arc;

use futures::{future, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio_stream::wrappers::LinesStream;
use tracing::{info, warn};

use chat_store::{logging, ChatStore, NoopFetcher, StoreConfig, StoreEvent, StoreResult};

#[tokio::main]
async fn main() -> StoreResult<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(events_path) = args.next() else {
        eprintln!("usage: chat-store-replay <events.jsonl> [snapshot.json]");
        std::process::exit(2);
    };

    let mut config = StoreConfig::from_env();
    if let Some(path) = args.next() {
        config = config.with_snapshot_path(path);
    }
    let store = Arc::new(ChatStore::with_config(config, Arc::new(NoopFetcher)));
    if store.load()? {
        info!(chats = store.chats().len(), "resuming from existing snapshot");
    }

    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || shutdown.notify_one()) {
            warn!(error = %e, "could not install Ctrl+C handler");
        }
    }

    let file = File::open(&events_path).await?;
    let events = LinesStream::new(BufReader::new(file).lines())
        .enumerate()
        .filter_map(|(index, line)| {
            let event = match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => match StoreEvent::from_json_line(&line) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        warn!(line = index + 1, error = %e, "skipping malformed event");
                        None
                    }
                },
                Err(e) => {
                    warn!(line = index + 1, error = %e, "failed to read event line");
                    None
                }
            };
            future::ready(event)
        });

    // Ctrl+C must also stop a replay that is blocked waiting for input
    let mut binding = store.bind(events);
    let outcome = tokio::select! {
        result = binding.finished() => Some(result),
        _ = shutdown.notified() => None,
    };
    if !binding.is_finished() {
        binding.unbind();
    }

    match &outcome {
        Some(Ok(applied)) => info!(applied, "replay complete"),
        Some(Err(e)) => warn!(error = %e, "replay task did not complete"),
        None => info!(
            chats = store.chats().len(),
            "interrupted, writing partial snapshot"
        ),
    }

    if !store.save()? {
        println!("{}", store.to_json()?);
    }
    if outcome.is_none() {
        // A reader blocked on a pipe would otherwise hold runtime shutdown
        std::process::exit(130);
    }
    Ok(())
}
