use std::path::Path;

use crate::catalog::{self, Catalog, CatalogError};
use crate::config::CatalogSettings;

/// Build the catalog from a TOML catalog file or by scanning a directory.
pub fn load_catalog(source: &Path, settings: &CatalogSettings) -> Result<Catalog, CatalogError> {
    let is_catalog_file = source.is_file()
        && source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let catalog = if is_catalog_file {
        Catalog::load_file(source)?
    } else {
        catalog::scan(source, settings)?
    };
    tracing::info!(
        source = %source.display(),
        tracks = catalog.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn toml_file_is_loaded_as_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
[[tracks]]
id = 7
title = "Seven"
artist = "Band"
category = "Rock"
media = "seven.mp3"
"#,
        )
        .unwrap();

        let catalog = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.tracks()[0].id, 7);
    }

    #[test]
    fn directory_is_scanned() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("notes.toml"), b"not a catalog").unwrap();

        let catalog = load_catalog(dir.path(), &CatalogSettings::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.tracks()[0].title, "a");
    }

    #[test]
    fn broken_catalog_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(&path, "[[tracks]]\nid = \"one\"\n").unwrap();
        assert!(matches!(
            load_catalog(&path, &CatalogSettings::default()),
            Err(CatalogError::Parse(_))
        ));
    }
}
