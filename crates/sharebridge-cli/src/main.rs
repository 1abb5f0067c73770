use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures_util::stream::{BoxStream, StreamExt};
use sharebridge_core::memory::MemoryHost;
use sharebridge_core::BridgeError;
use sharebridge_models::media::SharedMediaFile;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod script;

use script::FeedKind;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sharebridge=info")),
        )
        .init();

    let args = cli::Args::parse();
    let config = config::Config::load(&args.config)?;
    let script = script::ReplayScript::load(&args.script)?;
    let timeout = Duration::from_millis(args.timeout_ms);

    let host = MemoryHost::new(&config.bridge.channels);
    script.install(&host);
    let bridge = host.bridge(&config.bridge);

    // ── Launch content ───────────────────────────────────────────────────────
    match bridge.get_initial_media().await {
        Ok(files) => print_media("initial media", &files),
        Err(e) => println!("initial media: {e}"),
    }
    match bridge.get_initial_text().await {
        Ok(Some(text)) => println!("initial text: {text:?}"),
        Ok(None) => println!("initial text: none"),
        Err(e) => println!("initial text: {e}"),
    }
    match bridge.get_initial_text_as_uri().await {
        Ok(Some(uri)) => println!("initial uri: {uri}"),
        Ok(None) => println!("initial uri: none"),
        Err(e) => println!("initial uri: {e}"),
    }

    // ── Shares arriving while running ────────────────────────────────────────
    let mut media = bridge.get_media_stream().subscribe();
    let mut text = bridge.get_text_stream().subscribe();
    let mut uris = bridge.get_text_stream_as_uri();

    for (index, event) in script.events.iter().enumerate() {
        let delivered = event.publish(&host);
        tracing::debug!(index, delivered, "replayed event");
        match event.feed {
            FeedKind::Media => match next_element(&mut media, timeout).await? {
                Ok(files) => print_media(&format!("event {index} media"), &files),
                Err(e) => println!("event {index} media: {e}"),
            },
            FeedKind::Text => {
                match next_element(&mut text, timeout).await? {
                    Ok(Some(value)) => println!("event {index} text: {value:?}"),
                    Ok(None) => println!("event {index} text: none"),
                    Err(e) => println!("event {index} text: {e}"),
                }
                match next_element(&mut uris, timeout).await? {
                    Ok(Some(uri)) => println!("event {index} uri: {uri}"),
                    Ok(None) => println!("event {index} uri: none"),
                    Err(e) => println!("event {index} uri: {e}"),
                }
            }
        }
    }

    bridge.reset().await;
    tracing::info!(events = script.events.len(), "replay finished");
    Ok(())
}

async fn next_element<T>(
    stream: &mut BoxStream<'static, Result<T, BridgeError>>,
    timeout: Duration,
) -> Result<Result<T, BridgeError>> {
    tokio::time::timeout(timeout, stream.next())
        .await
        .context("feed produced no element in time")?
        .context("feed ended")
}

fn print_media(label: &str, files: &[SharedMediaFile]) {
    if files.is_empty() {
        println!("{label}: none");
        return;
    }
    for file in files {
        let mut line = format!("{label}: {} {}", file.media_type, file.path);
        if let Some(thumbnail) = &file.thumbnail {
            line.push_str(&format!(" thumbnail={thumbnail}"));
        }
        if let Some(duration) = file.duration {
            line.push_str(&format!(" duration={duration}ms"));
        }
        println!("{line}");
    }
}
