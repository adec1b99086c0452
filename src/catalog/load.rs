use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::model::{Catalog, CatalogError, Track};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tracks: Vec<Track>,
}

impl Catalog {
    /// Parse a catalog from TOML holding a `[[tracks]]` array.
    pub fn from_toml_str(src: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(src)?;
        Catalog::new(file.tracks)
    }

    /// Read and parse a TOML catalog file.
    pub fn load_file(path: &Path) -> Result<Self, CatalogError> {
        let src = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }
}
