//! Headless host for the command engine.
//!
//! Reads one command per line from stdin, either plain text or JSON
//! `{"command": "...", "context": "..."}`, and writes one JSON result per
//! line to stdout. `:history [N]` prints recent records and `:quit` exits.
//!
//! All tracing output goes to stderr so that stdout stays a clean JSON
//! channel.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use wand::{
    Command, CommandCoordinator, LocalActions, SqliteHistoryStore, WandConfig, WandContext,
    WandError,
};

const DEFAULT_HISTORY_LINES: usize = 10;

#[derive(Debug, Deserialize)]
struct InputLine {
    command: String,
    #[serde(default)]
    context: Option<String>,
}

fn parse_line(line: &str) -> Result<Command, serde_json::Error> {
    if line.starts_with('{') {
        let input: InputLine = serde_json::from_str(line)?;
        let command = Command::new(input.command);
        Ok(match input.context {
            Some(context) => command.with_context(context),
            None => command,
        })
    } else {
        Ok(Command::new(line))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(WandConfig::default_config_path);
    let config = WandConfig::load_or_default(&config_path)?;
    tracing::info!(config = %config_path.display(), "wand-host starting");

    let mut ctx = WandContext::new(Arc::new(LocalActions::new()))
        .with_transform_prompt(config.model.transform_prompt.clone());
    match config.model.build_backend()? {
        Some(model) => ctx = ctx.with_model(model),
        None => tracing::info!("no model API key configured; using demo responses"),
    }
    let store = if config.history.enabled {
        let path = config.history.resolved_path();
        match SqliteHistoryStore::open(&path) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "history disabled");
                None
            }
        }
    } else {
        None
    };
    if let Some(store) = &store {
        ctx = ctx.with_history(store.clone());
    }

    let coordinator = CommandCoordinator::new(ctx, &config.dispatch)?;

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = BufWriter::new(tokio::io::stdout());
        while let Some(line) = out_rx.recv().await {
            let written = async {
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await
            };
            if let Err(e) = written.await {
                tracing::warn!(error = %e, "failed to write to stdout; stopping writer");
                break;
            }
        }
    });

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            tracing::info!("stdin closed (EOF)");
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == ":quit" {
            break;
        }
        if let Some(rest) = trimmed.strip_prefix(":history") {
            let limit = rest.trim().parse().unwrap_or(DEFAULT_HISTORY_LINES);
            let Some(store) = &store else {
                let _ = out_tx.send(json!({ "error": "history is disabled" }).to_string());
                continue;
            };
            match store.recent(limit) {
                Ok(records) => {
                    for record in records {
                        let _ = out_tx.send(serde_json::to_string(&record)?);
                    }
                }
                Err(e) => {
                    let _ = out_tx.send(json!({ "error": e.to_string() }).to_string());
                }
            }
            continue;
        }

        let command = match parse_line(trimmed) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(error = %e, raw_line = %trimmed, "failed to parse input line");
                let _ = out_tx.send(json!({ "error": format!("invalid input: {e}") }).to_string());
                continue;
            }
        };

        let tx = out_tx.clone();
        let submitted = coordinator.submit_with(command, move |outcome| {
            match serde_json::to_string(&outcome) {
                Ok(json) => {
                    let _ = tx.send(json);
                }
                Err(e) => tracing::error!(error = %e, "failed to serialize outcome"),
            }
        });
        match submitted {
            Ok(id) => tracing::debug!(command_id = %id, "queued"),
            Err(e) => {
                if !matches!(e, WandError::Validation(_)) {
                    tracing::error!(error = %e, "submit failed");
                }
                let _ = out_tx.send(json!({ "error": e.to_string() }).to_string());
            }
        }
    }

    coordinator.shutdown().await;
    drop(out_tx);
    let _ = writer.await;
    tracing::info!("wand-host shut down cleanly");
    Ok(())
}
