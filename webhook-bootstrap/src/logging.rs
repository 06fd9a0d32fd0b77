use std::env;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "webhook-receiver.log";

/// Installs the global subscriber. `RUST_LOG` filters (default `info`),
/// `LOG_FORMAT=json` switches stdout to JSON lines, and `LOG_DIR` adds a
/// daily rolling file. Keep the returned guard alive until exit so the file
/// writer flushes.
pub fn init_tracing() -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|value| value.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let (file_layer, guard) = match env::var("LOG_DIR").ok().filter(|dir| !dir.trim().is_empty()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir.trim(), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
