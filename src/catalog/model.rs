use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the pseudo-category that selects every track.
pub const ALL_CATEGORIES: &str = "All";

/// A lyric line and the time (seconds) it becomes active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricCue {
    pub time: f64,
    pub text: String,
}

impl LyricCue {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    pub id: u32,
    pub title: String,
    pub artist: String,
    pub category: String,
    /// Display genre; falls back to `category` when empty.
    #[serde(default)]
    pub genre: String,
    /// Reference the widget resolves to media (a file path for the local backend).
    pub media: String,
    /// Nominal duration in seconds, shown until the widget reports a real one.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub synced_lyrics: Option<Vec<LyricCue>>,
    #[serde(default)]
    pub lyrics: Option<String>,
}

impl Track {
    /// Time-coded lyric cues, empty when the track has none.
    pub fn cues(&self) -> &[LyricCue] {
        self.synced_lyrics.as_deref().unwrap_or(&[])
    }

    pub fn has_synced_lyrics(&self) -> bool {
        !self.cues().is_empty()
    }

    fn normalize(&mut self) -> Result<(), CatalogError> {
        if self.media.trim().is_empty() {
            return Err(CatalogError::MissingMedia(self.id));
        }
        if self.genre.trim().is_empty() {
            self.genre = self.category.clone();
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            self.duration = 0.0;
        }

        if let Some(cues) = self.synced_lyrics.as_mut() {
            if let Some(bad) = cues.iter().find(|c| !c.time.is_finite() || c.time < 0.0) {
                return Err(CatalogError::InvalidCue {
                    id: self.id,
                    time: bad.time,
                });
            }
            // Stable, so equal timestamps keep their authored order.
            cues.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
        if self.synced_lyrics.as_ref().is_some_and(Vec::is_empty) {
            self.synced_lyrics = None;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate track id {0}")]
    DuplicateId(u32),
    #[error("track {0} has no media reference")]
    MissingMedia(u32),
    #[error("track {id} has an invalid lyric cue time {time}")]
    InvalidCue { id: u32, time: f64 },
}

/// The base list of tracks, validated on construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog, enforcing unique ids and sorted, non-empty cue lists.
    pub fn new(mut tracks: Vec<Track>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for track in &mut tracks {
            if !seen.insert(track.id) {
                return Err(CatalogError::DuplicateId(track.id));
            }
            track.normalize()?;
        }
        Ok(Self { tracks })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// `"All"` followed by every distinct category in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut out = vec![ALL_CATEGORIES.to_string()];
        for track in &self.tracks {
            if !out.iter().any(|c| c == &track.category) {
                out.push(track.category.clone());
            }
        }
        out
    }

    /// Select the tracks of `category` (everything for `"All"`).
    pub fn filter(&self, category: &str) -> CatalogView {
        let indices = if category == ALL_CATEGORIES {
            (0..self.tracks.len()).collect()
        } else {
            self.tracks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.category == category)
                .map(|(i, _)| i)
                .collect()
        };
        CatalogView {
            category: category.to_string(),
            indices,
        }
    }
}

/// A category-filtered window onto a `Catalog`, by base index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogView {
    category: String,
    indices: Vec<usize>,
}

impl CatalogView {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Base catalog index of the view's `pos`-th entry.
    pub fn base_index(&self, pos: usize) -> Option<usize> {
        self.indices.get(pos).copied()
    }

    #[cfg(test)]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Resolve the view's `pos`-th track.
    pub fn track<'a>(&self, catalog: &'a Catalog, pos: usize) -> Option<&'a Track> {
        self.base_index(pos).and_then(|i| catalog.get(i))
    }

    pub fn tracks<'a>(&'a self, catalog: &'a Catalog) -> impl Iterator<Item = &'a Track> + 'a {
        self.indices.iter().filter_map(move |&i| catalog.get(i))
    }
}
