mod calc;
mod config;
mod facilitators;
mod grading;
mod ipc;
mod model;
mod stats;

use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,gradebookd=info".into()),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gradebookd started");

    let mut state = ipc::AppState::default();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed; shutting down");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to echo.
                tracing::warn!(error = %e, "undecodable request line");
                let resp = ipc::bad_json(e.to_string());
                writeln!(stdout, "{}", resp)?;
                stdout.flush()?;
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        if resp.get("ok").and_then(|v| v.as_bool()) == Some(false) {
            tracing::warn!(response = %resp, "request failed");
        }
        writeln!(stdout, "{}", resp)?;
        stdout.flush()?;
    }

    tracing::info!("stdin closed; gradebookd exiting");
    Ok(())
}
