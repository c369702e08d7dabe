//! Loading topic catalogs from disk.

use anyhow::{Context, Result};
use conductor_core::{Topic, TopicCatalog};
use serde::Deserialize;
use std::path::Path;

/// Accepts either a bare list of topics or an object with a `topics` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<Topic>),
    Wrapped { topics: Vec<Topic> },
}

pub fn load_catalog(path: &Path) -> Result<TopicCatalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&raw)
        .with_context(|| format!("Catalog {} is not a valid topic list", path.display()))?;
    let topics = match file {
        CatalogFile::Bare(topics) | CatalogFile::Wrapped { topics } => topics,
    };
    Ok(TopicCatalog::new(topics)?)
}
