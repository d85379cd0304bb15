use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Send the detail log to `log_path`, and also to stderr if asked.
/// `RUST_LOG` overrides the default `info` level.
pub fn init(log_path: &Path, also_stderr: bool, no_color: bool) -> Result<()> {
    let file = File::create(log_path)
        .with_context(|| format!("cannot create log file {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .without_time();

    let stderr_layer = also_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(!no_color)
            .with_target(false)
            .without_time()
            .boxed()
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("logging was already initialized")
}
