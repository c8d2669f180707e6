//! Executive CLI - binary entry point and the stdin command loop.
//!
//! ```text
//! main() -> load config -> App::new(client) -> run()
//!                                               |
//!                          read line -> App::handle_input -> draw screen
//!                                               |
//!                          (on resolve) wait_for_responses -> draw narratives
//! ```
//!
//! Stdout is the game display, so logs go to a file under
//! `~/.executive/logs/` and nowhere else.

mod render;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use executive_config::{CompletionSettings, ExecutiveConfig, executive_dir};
use executive_engine::{App, CompletionClient};
use executive_providers::retry::RetryConfig;
use executive_types::Phase;

use crate::render::Renderer;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    let (log_file, init_warnings) = open_executive_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: drop logs rather than interleave them with the game text.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_executive_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in executive_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn executive_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // ~/.executive/logs/executive.log
    if let Some(dir) = executive_dir() {
        candidates.push(dir.join("logs").join("executive.log"));
    }

    // ./.executive/logs/executive.log
    candidates.push(PathBuf::from(".executive").join("logs").join("executive.log"));

    candidates
}

/// Build the narrative client, or `None` when narratives are disabled.
fn completion_client(config: &ExecutiveConfig) -> Option<CompletionClient> {
    let settings = match config.completion_settings() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, "Invalid completion settings; using defaults");
            CompletionSettings::defaults().ok()?
        }
    };

    if !settings.enabled {
        tracing::info!("Narrative service disabled");
        return None;
    }

    tracing::info!(
        endpoint = %settings.endpoint,
        timeout_secs = settings.timeout.as_secs(),
        max_retries = settings.max_retries,
        "Narrative service configured"
    );
    Some(
        CompletionClient::new(settings.endpoint)
            .with_timeout(settings.timeout)
            .with_retry(RetryConfig::default().with_max_retries(settings.max_retries))
            .with_placeholder(settings.placeholder),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match ExecutiveConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(
                path = ?err.path(),
                error = %err,
                "Failed to load config; continuing with defaults"
            );
            eprintln!("Warning: {err}");
            ExecutiveConfig::default()
        }
    };

    let renderer = Renderer::new(config.ascii_only());
    let mut app = App::new(completion_client(&config));

    let result = run(&mut app, renderer).await;
    tracing::info!(phase = %app.phase(), "Session ended");
    result
}

async fn run(app: &mut App, renderer: Renderer) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = io::stdout();

    draw(&mut out, &renderer.screen(&app.snapshot()))?;

    loop {
        draw(&mut out, "> ")?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read input")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                None
            }
        };
        let Some(line) = line else {
            draw(&mut out, "\n")?;
            break;
        };

        let before = app.phase();
        app.handle_input(&line);
        if app.should_quit() {
            break;
        }

        draw(&mut out, "\n")?;
        draw(&mut out, &renderer.screen(&app.snapshot()))?;
        if let Some(status) = app.take_status() {
            draw(&mut out, &renderer.status(&status))?;
        }

        if before != Phase::Resolved && app.phase() == Phase::Resolved {
            show_narratives(&mut out, app, renderer).await?;
        }
    }

    Ok(())
}

/// Wait for the narrative request and print what came back.
async fn show_narratives(out: &mut impl Write, app: &mut App, renderer: Renderer) -> Result<()> {
    if app.narratives_pending() {
        draw(out, &renderer.notice("Awaiting core analysis..."))?;
    }

    let interrupted = tokio::select! {
        _ = app.wait_for_responses() => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    let narratives = if interrupted {
        tracing::info!("Narrative wait interrupted");
        app.cancel_narratives()
    } else {
        app.narratives()
    };
    if let Some(narratives) = narratives {
        draw(out, &renderer.narratives(narratives))?;
    }
    Ok(())
}

fn draw(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .context("failed to write to stdout")
}
