//! Utilities for creating `rodio` sinks from media paths.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::widget::WidgetError;

fn media_error(path: &Path, reason: impl ToString) -> WidgetError {
    WidgetError::Media {
        media: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Returns the sink and the total duration the decoder reports, if any.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), WidgetError> {
    let file = File::open(path).map_err(|e| media_error(path, e))?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| media_error(path, e))?;
    let total = decoder.total_duration();

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}

/// Read the duration from the file's tags/properties without decoding.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
