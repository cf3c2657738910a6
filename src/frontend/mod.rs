//! Front-end bundle integration
//!
//! Resolves the built script and stylesheet names the index page links to.

pub mod manifest;

pub use manifest::{FrontendAssets, Manifest, ManifestChunk, ManifestError};
