//! Entry point for the document narrator.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Normalize the document into narratable sentences.
//! - Drive one narration session to completion or interruption.

mod audio;
mod batch;
mod config;
mod controller;
mod error;
mod estimator;
mod gateway;
mod governor;
mod normalizer;
mod pagination;

use crate::config::load_config;
use crate::controller::{Narrator, SessionCallbacks};
use crate::normalizer::TextNormalizer;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let text_path = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %text_path.display(),
        level = %config.log_level,
        voice = %config.voice_id,
        batch_size = config.batch_size,
        "Starting narration"
    );

    let raw = fs::read_to_string(&text_path)
        .with_context(|| format!("Failed to read {}", text_path.display()))?;
    let normalizer = TextNormalizer::load(Path::new("conf/normalizer.toml"));
    let pages = pagination::paginate(&raw, pagination::DEFAULT_CHARS_PER_PAGE);
    let sentences: Vec<String> = pages
        .iter()
        .flat_map(|page| normalizer.sentences_for_page(page))
        .collect();
    if sentences.is_empty() {
        return Err(anyhow!(
            "No narratable sentences in {}",
            text_path.display()
        ));
    }
    info!(
        pages = pages.len(),
        sentences = sentences.len(),
        "Prepared document"
    );

    let mut narrator = Narrator::from_config(&config)?;

    let (end_tx, end_rx) = mpsc::channel();
    let spoken = sentences.clone();
    let callbacks = SessionCallbacks {
        on_sentence_change: Box::new(move |idx| {
            if let Some(text) = spoken.get(idx) {
                info!(idx, %text, "Now speaking");
            }
        }),
        on_end: Box::new(move || {
            let _ = end_tx.send(());
        }),
    };
    narrator.start(sentences, 0, config.rate, config.volume, callbacks);

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Failed to install the interrupt handler")?;

    loop {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted; stopping narration");
            narrator.stop();
            return Ok(());
        }
        match end_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(()) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::trace!(level = narrator.current_level(), "Playback alive");
                continue;
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    if narrator.is_failed() {
        return Err(anyhow!("Narration ended after a provider failure"));
    }
    info!("Narration finished");
    Ok(())
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: lectern <path-to-text-file>"))?;

    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.as_path().display()));
    }
    Ok(path)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
