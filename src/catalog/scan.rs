use std::fs;
use std::path::Path;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::CatalogSettings;

use super::lrc::parse_lrc;
use super::model::{Catalog, CatalogError, Track};

/// Category for files with neither a genre tag nor a parent folder.
pub(crate) const UNCATEGORIZED: &str = "Uncategorized";

fn is_audio_file(path: &Path, settings: &CatalogSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_empty(value: Option<impl AsRef<str>>) -> Option<String> {
    value
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read `<stem>.lrc` / `<stem>.txt` next to the audio file.
fn sidecar_lyrics(path: &Path, track: &mut Track) {
    if let Ok(src) = fs::read_to_string(path.with_extension("lrc")) {
        let cues = parse_lrc(&src);
        if !cues.is_empty() {
            track.synced_lyrics = Some(cues);
        }
    }
    if let Ok(src) = fs::read_to_string(path.with_extension("txt")) {
        track.lyrics = non_empty(Some(src));
    }
}

fn read_track(path: &Path, root: &Path) -> Track {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist = None;
    let mut genre = None;
    let mut duration = 0.0;

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration = tagged.properties().duration().as_secs_f64();

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = non_empty(tag.title()) {
                title = v;
            }
            artist = non_empty(tag.artist());
            genre = non_empty(tag.genre());
        }
    }

    let folder = path
        .parent()
        .filter(|p| *p != root)
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str())
        .map(str::to_string);
    let category = genre
        .clone()
        .or(folder)
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    let mut track = Track {
        id: 0,
        title,
        artist: artist.unwrap_or_default(),
        genre: genre.unwrap_or_default(),
        category,
        media: path.display().to_string(),
        duration,
        synced_lyrics: None,
        lyrics: None,
    };
    sidecar_lyrics(path, &mut track);
    track
}

/// Build a catalog from the audio files under `dir`.
///
/// Categories come from the genre tag, then the parent folder name. Ids are
/// assigned from 1 in artist/title order.
pub fn scan(dir: &Path, settings: &CatalogSettings) -> Result<Catalog, CatalogError> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, settings) {
            tracks.push(read_track(path, dir));
        }
    }

    tracks.sort_by_cached_key(|t| {
        (
            t.artist.to_lowercase(),
            t.title.to_lowercase(),
            t.media.clone(),
        )
    });
    for (i, track) in tracks.iter_mut().enumerate() {
        track.id = u32::try_from(i + 1).unwrap_or(u32::MAX);
    }
    tracing::debug!(dir = %dir.display(), count = tracks.len(), "scanned catalog");

    Catalog::new(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn titles(catalog: &Catalog) -> Vec<String> {
        catalog.tracks().iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = CatalogSettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.lrc"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_assigns_ids_and_categories_from_folders() {
        let dir = tempdir().unwrap();
        let rock = dir.path().join("Rock");
        fs::create_dir_all(&rock).unwrap();
        fs::write(rock.join("b.mp3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let catalog = scan(dir.path(), &CatalogSettings::default()).unwrap();
        assert_eq!(titles(&catalog), vec!["A", "b"]);
        assert_eq!(catalog.tracks()[0].id, 1);
        assert_eq!(catalog.tracks()[1].id, 2);
        assert_eq!(catalog.tracks()[0].category, UNCATEGORIZED);
        assert_eq!(catalog.tracks()[1].category, "Rock");
        assert_eq!(catalog.tracks()[1].genre, "Rock");
        assert_eq!(catalog.categories(), vec!["All", UNCATEGORIZED, "Rock"]);
    }

    #[test]
    fn scan_attaches_sidecar_lyrics() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("song.mp3"), b"not real").unwrap();
        fs::write(
            dir.path().join("song.lrc"),
            "[00:02.00]second\n[00:01.00]first\n",
        )
        .unwrap();
        fs::write(dir.path().join("song.txt"), "plain words\n").unwrap();

        let catalog = scan(dir.path(), &CatalogSettings::default()).unwrap();
        let track = &catalog.tracks()[0];
        let texts: Vec<&str> = track.cues().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(track.lyrics.as_deref(), Some("plain words"));
    }

    #[test]
    fn scan_skips_hidden_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let catalog = scan(dir.path(), &CatalogSettings::default()).unwrap();
        assert_eq!(titles(&catalog), vec!["visible"]);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = CatalogSettings {
            recursive: false,
            ..CatalogSettings::default()
        };
        let catalog = scan(dir.path(), &settings).unwrap();
        assert_eq!(titles(&catalog), vec!["root"]);
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth counts root as 0, children as 1, grandchildren as 2.
        let settings = CatalogSettings {
            max_depth: Some(2),
            ..CatalogSettings::default()
        };
        let names = titles(&scan(dir.path(), &settings).unwrap());
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }
}
