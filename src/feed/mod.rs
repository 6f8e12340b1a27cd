//! Remote package feed abstraction.
//!
//! A feed lists versions of a named package, reads a single file out of
//! a package without full extraction, and downloads/extracts whole
//! packages into a content-addressed cache. Any NuGet-V3-compatible
//! index can back the [`PackageFeed`] trait; [`HttpPackageFeed`] speaks
//! the flat-container layout.

pub mod cache;
pub mod http;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::core::version::SdkVersion;

pub use cache::ExtractionCache;
pub use http::HttpPackageFeed;

/// Feed operation failure.
///
/// "Not found" is deliberately not a variant: an absent package,
/// version, or in-package file is a normal condition reported as
/// `Ok(None)` or an empty list. These errors are the cases retry logic
/// upstream needs to tell apart from absence.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or filesystem failure; the caller could not check.
    #[error("transient I/O failure ({context}): {message}")]
    Transient { context: String, message: String },

    /// One specific artifact failed to parse.
    #[error("malformed {artifact}: {message}")]
    Malformed { artifact: String, message: String },

    /// Cooperative cancellation was observed.
    #[error("operation cancelled")]
    Cancelled,
}

impl FeedError {
    pub fn transient(context: impl Into<String>, error: impl std::fmt::Display) -> Self {
        FeedError::Transient {
            context: context.into(),
            message: error.to_string(),
        }
    }

    pub fn malformed(artifact: impl Into<String>, error: impl std::fmt::Display) -> Self {
        FeedError::Malformed {
            artifact: artifact.into(),
            message: error.to_string(),
        }
    }
}

pub type FeedResult<T> = Result<T, FeedError>;

/// Cooperative cancellation handle.
///
/// Cloned freely; checked before every network call. Filesystem-only
/// operations never consult it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Error out if cancellation has been requested.
    pub fn check(&self) -> FeedResult<()> {
        if self.is_cancelled() {
            Err(FeedError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A remote package feed.
pub trait PackageFeed: Send + Sync {
    /// List versions of a package, descending, deduplicated.
    ///
    /// An unknown package yields an empty list, not an error.
    fn list_versions(&self, package: &str, include_prerelease: bool) -> FeedResult<Vec<SdkVersion>>;

    /// Fetch one named file from inside a package.
    ///
    /// Tries the exact path, then the path with `/` and `\` swapped,
    /// then a case-insensitive scan of all entries. Returns `Ok(None)`
    /// if nothing matches; missing optional files are expected given
    /// the historical file-layout conventions.
    fn get_file_content(
        &self,
        package: &str,
        version: &SdkVersion,
        path: &str,
    ) -> FeedResult<Option<String>>;

    /// Download and extract a package, returning the local directory,
    /// or `Ok(None)` when the feed has no such package version.
    ///
    /// Idempotent: the extraction cache is checked before any network
    /// call. Concurrent first-time downloads of the same key may race
    /// but converge, since archive contents are immutable once
    /// published.
    fn download(&self, package: &str, version: &SdkVersion) -> FeedResult<Option<PathBuf>>;
}

/// Sort raw feed versions descending, drop duplicates, and apply the
/// prerelease filter. Unparsable version strings are skipped.
pub fn normalize_versions<I, S>(raw: I, include_prerelease: bool) -> Vec<SdkVersion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut versions: Vec<SdkVersion> = raw
        .into_iter()
        .filter_map(|s| s.as_ref().parse().ok())
        .filter(|v: &SdkVersion| include_prerelease || !v.is_prerelease())
        .collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions.dedup();
    versions
}

/// Match a requested in-package path against a set of entry names:
/// exact, then separator-swapped, then case-insensitive with
/// normalized separators.
pub fn match_entry<'a, I>(entries: I, want: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let entries: Vec<&str> = entries.into_iter().collect();

    if let Some(found) = entries.iter().find(|&&e| e == want) {
        return Some(*found);
    }

    let swapped: String = want
        .chars()
        .map(|c| match c {
            '/' => '\\',
            '\\' => '/',
            c => c,
        })
        .collect();
    if let Some(found) = entries.iter().find(|&&e| e == swapped) {
        return Some(*found);
    }

    let normalize = |s: &str| s.replace('\\', "/").to_ascii_lowercase();
    let want_normalized = normalize(want);
    entries
        .iter()
        .find(|e| normalize(e) == want_normalized)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_versions_descending_no_duplicates() {
        let versions = normalize_versions(
            ["9.0.100", "9.0.105", "9.0.100", "8.0.300", "junk"],
            true,
        );
        let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["9.0.105", "9.0.100", "8.0.300"]);
    }

    #[test]
    fn test_normalize_versions_prerelease_filter() {
        let versions = normalize_versions(["9.0.100", "9.0.200-preview.1"], false);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].to_string(), "9.0.100");

        let versions = normalize_versions(["9.0.100", "9.0.200-preview.1"], true);
        assert_eq!(versions[0].to_string(), "9.0.200-preview.1");
    }

    #[test]
    fn test_match_entry_exact_first() {
        let entries = ["data/WorkloadManifest.json", "DATA/workloadmanifest.JSON"];
        assert_eq!(
            match_entry(entries, "data/WorkloadManifest.json"),
            Some("data/WorkloadManifest.json")
        );
    }

    #[test]
    fn test_match_entry_swapped_separators() {
        let entries = ["data\\WorkloadManifest.json"];
        assert_eq!(
            match_entry(entries, "data/WorkloadManifest.json"),
            Some("data\\WorkloadManifest.json")
        );
    }

    #[test]
    fn test_match_entry_case_insensitive_fallback() {
        let entries = ["Data\\WORKLOADMANIFEST.json"];
        assert_eq!(
            match_entry(entries, "data/workloadmanifest.json"),
            Some("Data\\WORKLOADMANIFEST.json")
        );
    }

    #[test]
    fn test_match_entry_absent() {
        assert_eq!(match_entry(["a.json"], "b.json"), None);
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(token.check().is_ok());

        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(FeedError::Cancelled)));
    }
}
