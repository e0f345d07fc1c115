use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::wikidata::client::{DEFAULT_LANGUAGE, DEFAULT_WIKIDATA_URL};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default except the speaker attributes path, which only
/// `enrich` and `speaker` need.
pub struct Config {
    /// Directory holding the raw `quotes-<year>.json.bz2` dumps
    pub input_dir: PathBuf,
    /// Directory for filtered and enriched files
    pub output_dir: PathBuf,
    /// Speaker attributes table (parquet or JSON lines)
    pub attributes_path: Option<PathBuf>,
    /// Wikidata instance used for label lookups
    pub wikidata_url: String,
    /// Preferred label language
    pub wikidata_language: String,
}

/// Returns the default directory for pipeline outputs.
/// Uses the platform data directory: ~/.local/share/quotescope/ on Linux.
pub fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotescope")
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            input_dir: env::var("QUOTEBANK_INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./Quotebank")),
            output_dir: env::var("QUOTEBANK_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_output_dir()),
            attributes_path: env::var("SPEAKER_ATTRIBUTES_PATH").ok().map(PathBuf::from),
            wikidata_url: env::var("WIKIDATA_URL")
                .unwrap_or_else(|_| DEFAULT_WIKIDATA_URL.to_string()),
            wikidata_language: env::var("WIKIDATA_LANGUAGE")
                .unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),
        })
    }

    /// Check that the speaker attributes table is configured and present.
    /// Call this before any operation that reads speaker attributes.
    pub fn require_attributes(&self) -> Result<&Path> {
        let Some(path) = &self.attributes_path else {
            anyhow::bail!(
                "SPEAKER_ATTRIBUTES_PATH not set. Add it to your .env file.\n\
                 It should point at speaker_attributes.parquet."
            );
        };
        if !path.exists() {
            anyhow::bail!(
                "Speaker attributes table not found at {}",
                path.display()
            );
        }
        Ok(path)
    }
}
