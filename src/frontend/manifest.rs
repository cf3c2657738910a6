//! Front-end build manifest
//!
//! The bundler writes `manifest.json` mapping each source entry to its hashed
//! output file and the stylesheets it pulls in:
//!
//! ```json
//! { "src/main.ts": { "file": "assets/main-4f2a.js", "css": ["assets/main-91c0.css"] } }
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Settings;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest has no entry named '{0}'")]
    MissingEntry(String),
}

/// Output files produced for one manifest entry
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestChunk {
    pub file: String,
    #[serde(default)]
    pub css: Vec<String>,
}

/// Parsed build manifest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: HashMap<String, ManifestChunk>,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn entry(&self, name: &str) -> Option<&ManifestChunk> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the index page needs to reference the bundle
#[derive(Debug, Clone, Default)]
pub struct FrontendAssets {
    pub asset_url: String,
    pub debug: bool,
    pub js_file: String,
    pub css_file: String,
}

impl FrontendAssets {
    /// Resolve assets once at startup
    ///
    /// In debug mode the dev server serves sources directly and no manifest
    /// is read. Otherwise a missing manifest or entry is fatal.
    pub fn from_settings(settings: &Settings) -> Result<Self, ManifestError> {
        let asset_url = settings.frontend.asset_url.trim_end_matches('/').to_string();

        if settings.debug {
            tracing::debug!(asset_url = %asset_url, "Debug mode, skipping build manifest");
            return Ok(Self {
                asset_url,
                debug: true,
                js_file: String::new(),
                css_file: String::new(),
            });
        }

        let manifest = Manifest::load(&settings.frontend.manifest_path)?;
        let entry_name = &settings.frontend.manifest_entry;
        let entry = manifest
            .entry(entry_name)
            .ok_or_else(|| ManifestError::MissingEntry(entry_name.clone()))?;

        let assets = Self {
            asset_url,
            debug: false,
            js_file: entry.file.clone(),
            css_file: entry.css.first().cloned().unwrap_or_default(),
        };

        tracing::info!(
            manifest = %settings.frontend.manifest_path.display(),
            entries = manifest.len(),
            js_file = %assets.js_file,
            css_file = %assets.css_file,
            "Loaded front-end build manifest"
        );

        Ok(assets)
    }
}
