use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::Level;

use crate::config::LoggingSettings;

/// Install the global subscriber when a log file is configured.
///
/// The TUI owns stdout/stderr, so without a file nothing is logged.
pub fn init(settings: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = settings.file.as_deref() else {
        return Ok(());
    };
    let level: Level = settings.level.parse()?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    tracing::info!(path = %path.display(), %level, "logging started");
    Ok(())
}
