use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Where log lines go while a command runs.
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    /// The terminal wizard owns the screen; without a log file nothing is
    /// written.
    Discard,
}

/// `RUST_LOG` wins over `-v`.
pub fn init(target: LogTarget<'_>, verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("onboardflow={default_level},{default_level}")));

    let registry = tracing_subscriber::registry().with(filter);
    match target {
        LogTarget::Stderr => registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
            registry
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
        }
        LogTarget::Discard => registry
            .with(fmt::layer().with_writer(io::sink))
            .try_init(),
    }
    .wrap_err("failed to install the log subscriber")
}
