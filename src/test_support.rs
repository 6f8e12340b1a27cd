//! Test doubles for unit tests.
//!
//! `FakeFeed` is an in-memory [`PackageFeed`] so catalog logic can be
//! exercised without network access or real archives.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::core::version::SdkVersion;
use crate::feed::{match_entry, normalize_versions, ExtractionCache, FeedResult, PackageFeed};

/// In-memory package feed.
///
/// Version lists are returned in insertion order and normalized by the
/// trait implementation, so tests can feed them unsorted. `download`
/// requires an [`ExtractionCache`] attached via [`FakeFeed::with_cache`];
/// with one attached, `get_file_content` also routes through it, and
/// the feed counts how many times it actually fetched (cache misses).
#[derive(Default)]
pub struct FakeFeed {
    versions: HashMap<String, Vec<String>>,
    files: HashMap<(String, String), Vec<(String, String)>>,
    cache: Option<ExtractionCache>,
    downloads: AtomicUsize,
}

impl FakeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, cache: ExtractionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn add_versions(&mut self, package: &str, versions: &[&str]) {
        let list = self.versions.entry(package.to_string()).or_default();
        list.extend(versions.iter().map(|v| v.to_string()));
    }

    pub fn add_file(&mut self, package: &str, version: &str, path: &str, content: &str) {
        self.files
            .entry((package.to_string(), version.to_string()))
            .or_default()
            .push((path.to_string(), content.to_string()));
    }

    /// How many downloads went past the cache.
    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn zip_bytes(files: &[(String, String)]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut buffer);
            for (name, content) in files {
                writer
                    .start_file(name.as_str(), SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }
}

impl PackageFeed for FakeFeed {
    fn list_versions(&self, package: &str, include_prerelease: bool) -> FeedResult<Vec<SdkVersion>> {
        let raw = self.versions.get(package).cloned().unwrap_or_default();
        Ok(normalize_versions(raw, include_prerelease))
    }

    fn get_file_content(
        &self,
        package: &str,
        version: &SdkVersion,
        path: &str,
    ) -> FeedResult<Option<String>> {
        // With a cache attached, behave like the HTTP feed: one counted
        // fetch extracts the package, later probes answer from disk.
        if let Some(cache) = &self.cache {
            if let Some(content) = cache.file_content(package, version, path) {
                return Ok(Some(content));
            }
            if cache.lookup(package, version).is_some() {
                return Ok(None);
            }
            let Some(files) = self.files.get(&(package.to_string(), version.to_string())) else {
                return Ok(None);
            };
            self.downloads.fetch_add(1, Ordering::SeqCst);
            cache.store(package, version, &Self::zip_bytes(files))?;
            return Ok(cache.file_content(package, version, path));
        }

        let Some(files) = self.files.get(&(package.to_string(), version.to_string())) else {
            return Ok(None);
        };
        let matched = match_entry(files.iter().map(|(name, _)| name.as_str()), path);
        Ok(matched.and_then(|name| {
            files
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, content)| content.clone())
        }))
    }

    fn download(&self, package: &str, version: &SdkVersion) -> FeedResult<Option<PathBuf>> {
        let cache = self
            .cache
            .as_ref()
            .expect("FakeFeed::with_cache is required before download");

        if let Some(cached) = cache.lookup(package, version) {
            return Ok(Some(cached));
        }

        let Some(files) = self.files.get(&(package.to_string(), version.to_string())) else {
            return Ok(None);
        };

        self.downloads.fetch_add(1, Ordering::SeqCst);
        cache.store(package, version, &Self::zip_bytes(files)).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fake_feed_list_versions_normalized() {
        let mut feed = FakeFeed::new();
        feed.add_versions("p", &["1.0.0", "2.0.0", "1.0.0"]);

        let versions = feed.list_versions("p", true).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].to_string(), "2.0.0");
    }

    #[test]
    fn test_fake_feed_unknown_package_is_empty() {
        let feed = FakeFeed::new();
        assert!(feed.list_versions("nope", true).unwrap().is_empty());
    }

    #[test]
    fn test_download_extracts_once_for_identical_key() {
        let tmp = TempDir::new().unwrap();
        let mut feed = FakeFeed::new();
        feed.add_file("p", "1.0.0", "data/WorkloadManifest.json", "{}");
        let feed = feed.with_cache(ExtractionCache::new(tmp.path()));

        let version: SdkVersion = "1.0.0".parse().unwrap();
        let first = feed.download("p", &version).unwrap().unwrap();
        let second = feed.download("p", &version).unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(feed.download_count(), 1);
        assert!(first.join("data/WorkloadManifest.json").exists());
    }
}
