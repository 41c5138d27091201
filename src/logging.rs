use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use color_eyre::eyre::{Result, eyre};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

/// Parses a level name such as `warn` or `debug`.
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(name.trim()).map_err(|e| eyre!("invalid log level `{name}`: {e}"))
}

/// Human-readable events on stderr at `level`; with `json_file`, every
/// debug event and span close is also written there as JSON lines.
pub fn init(level: LevelFilter, json_file: Option<&Path>) -> Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(level);

    let json_layer = match json_file {
        Some(path) => {
            ensure_parent_dir(path)?;
            let file = File::create(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
