//! HTTP package feed speaking the NuGet V3 flat-container layout.
//!
//! Version listing reads `{base}/{id}/index.json`; packages come from
//! `{base}/{id}/{version}/{id}.{version}.nupkg` (all lowercased, as the
//! flat container requires). A `.nupkg` is a zip archive.

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::core::version::SdkVersion;
use crate::feed::{
    normalize_versions, CancelToken, ExtractionCache, FeedError, FeedResult, PackageFeed,
};

/// Feed client backed by an HTTP flat-container index.
pub struct HttpPackageFeed {
    base_url: Url,
    client: reqwest::blocking::Client,
    cache: ExtractionCache,
    cancel: CancelToken,
}

/// Shape of `{id}/index.json`.
#[derive(Deserialize)]
struct VersionIndex {
    versions: Vec<String>,
}

impl HttpPackageFeed {
    /// Create a feed client over a flat-container base URL.
    ///
    /// The extraction cache is supplied by the caller so tests and
    /// embedders control where extracted packages land.
    pub fn new(base_url: Url, cache: ExtractionCache) -> Self {
        HttpPackageFeed {
            base_url,
            client: reqwest::blocking::Client::new(),
            cache,
            cancel: CancelToken::new(),
        }
    }

    /// Attach a cancellation token checked before each network call.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cache(&self) -> &ExtractionCache {
        &self.cache
    }

    fn index_url(&self, package: &str) -> String {
        format!(
            "{}/{}/index.json",
            self.base_url.as_str().trim_end_matches('/'),
            package.to_ascii_lowercase()
        )
    }

    fn nupkg_url(&self, package: &str, version: &SdkVersion) -> String {
        let id = package.to_ascii_lowercase();
        let version = version.to_string().to_ascii_lowercase();
        format!(
            "{}/{}/{}/{}.{}.nupkg",
            self.base_url.as_str().trim_end_matches('/'),
            id,
            version,
            id,
            version
        )
    }

    /// GET a URL; `Ok(None)` on 404, transient error otherwise.
    fn fetch(&self, url: &str) -> FeedResult<Option<Vec<u8>>> {
        self.cancel.check()?;

        tracing::debug!("fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FeedError::transient(url, e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FeedError::transient(
                url,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| FeedError::transient(url, e))?;
        Ok(Some(bytes.to_vec()))
    }

    fn fetch_nupkg(&self, package: &str, version: &SdkVersion) -> FeedResult<Option<Vec<u8>>> {
        self.fetch(&self.nupkg_url(package, version))
    }
}

impl PackageFeed for HttpPackageFeed {
    fn list_versions(&self, package: &str, include_prerelease: bool) -> FeedResult<Vec<SdkVersion>> {
        let url = self.index_url(package);
        let Some(body) = self.fetch(&url)? else {
            // Unknown package is a normal condition.
            return Ok(Vec::new());
        };

        let index: VersionIndex = serde_json::from_slice(&body)
            .map_err(|e| FeedError::malformed(url, e))?;

        Ok(normalize_versions(index.versions, include_prerelease))
    }

    fn get_file_content(
        &self,
        package: &str,
        version: &SdkVersion,
        path: &str,
    ) -> FeedResult<Option<String>> {
        // An already-extracted package answers without the network;
        // that covers the miss case too, so a run of candidate-path
        // probes costs at most one fetch.
        if let Some(content) = self.cache.file_content(package, version, path) {
            return Ok(Some(content));
        }
        if self.cache.lookup(package, version).is_some() {
            return Ok(None);
        }

        let Some(bytes) = self.fetch_nupkg(package, version)? else {
            return Ok(None);
        };
        self.cache.store(package, version, &bytes)?;

        Ok(self.cache.file_content(package, version, path))
    }

    fn download(&self, package: &str, version: &SdkVersion) -> FeedResult<Option<PathBuf>> {
        if let Some(cached) = self.cache.lookup(package, version) {
            tracing::debug!("cache hit for {} {}", package, version);
            return Ok(Some(cached));
        }

        let Some(bytes) = self.fetch_nupkg(package, version)? else {
            return Ok(None);
        };

        self.cache.store(package, version, &bytes).map(Some)
    }
}
