//! packjob - submit a sticker pack job and follow it to completion.
//!
//! ```text
//! packjob create <request.json>
//! packjob edit <pack_name> <request.json>
//! ```
//!
//! Progress is written to stderr, the final result as JSON to stdout.
//! Configuration comes from `PACKJOB_*` environment variables.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use packjob::models::{CreatePackRequest, EditPackRequest};
use packjob::{ClientConfig, PackClient, ProgressSnapshot};

const USAGE: &str = "usage:\n  packjob create <request.json>\n  packjob edit <pack_name> <request.json>";

/// Width of the progress bar in characters.
const BAR_WIDTH: usize = 30;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "packjob=info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    tracing::info!("Using API at {}", config.base_url);
    let client = PackClient::new(config)?;

    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["create", path] => {
            let request: CreatePackRequest = read_json(Path::new(path))?;
            let response = client.create_pack(&request, print_progress).await?;
            serde_json::to_value(response)?
        }
        ["edit", name, path] => {
            let request: EditPackRequest = read_json(Path::new(path))?;
            let response = client.edit_pack(name, &request, print_progress).await?;
            serde_json::to_value(response)?
        }
        _ => bail!("{}", USAGE),
    };

    eprintln!();
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid request JSON in {}", path.display()))
}

fn print_progress(progress: &ProgressSnapshot) {
    let filled = (progress.fraction() * BAR_WIDTH as f64).round() as usize;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));
    let message = progress.message.as_deref().unwrap_or("");

    let mut stderr = io::stderr().lock();
    // Best effort: a closed stderr must not fail the job
    let _ = write!(
        stderr,
        "\r[{}] {}/{} {}",
        bar, progress.done, progress.total, message
    );
    let _ = stderr.flush();
}
