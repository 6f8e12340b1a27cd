//! Command implementations.

pub mod deps;
pub mod manifest;
pub mod pin;
pub mod sets;
pub mod summary;

use anyhow::{Context, Result};
use serde::Serialize;
use url::Url;

use workloads::core::FeatureBand;
use workloads::feed::{ExtractionCache, HttpPackageFeed};

/// Build the feed client, with the extraction cache in the per-user
/// cache directory.
pub fn build_feed(base_url: &Url) -> HttpPackageFeed {
    let cache_dir = directories::ProjectDirs::from("", "", "workloads")
        .map(|dirs| dirs.cache_dir().join("packages"))
        .unwrap_or_else(|| std::env::temp_dir().join("workloads-packages"));

    HttpPackageFeed::new(base_url.clone(), ExtractionCache::new(cache_dir))
}

pub fn parse_band(text: &str) -> Result<FeatureBand> {
    text.parse()
        .with_context(|| format!("invalid feature band `{text}`"))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
