use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::model::Track;

/// One exported playlist entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEntry {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub media: String,
}

impl From<&Track> for ExportEntry {
    fn from(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            genre: track.genre.clone(),
            media: track.media.clone(),
        }
    }
}

/// `playlist-<category lowercased>.json`
pub fn export_file_name(category: &str) -> String {
    format!("playlist-{}.json", category.to_lowercase())
}

/// A serialized playlist ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistExport {
    pub file_name: String,
    pub json: String,
}

impl PlaylistExport {
    /// Serialize `tracks` as a pretty-printed JSON array.
    pub fn build<'a>(
        category: &str,
        tracks: impl IntoIterator<Item = &'a Track>,
    ) -> Result<Self, serde_json::Error> {
        let entries: Vec<ExportEntry> = tracks.into_iter().map(ExportEntry::from).collect();
        Ok(Self {
            file_name: export_file_name(category),
            json: serde_json::to_string_pretty(&entries)?,
        })
    }

    /// Write into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.json)?;
        Ok(path)
    }
}
