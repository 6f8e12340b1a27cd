//! Workload manifest catalog.
//!
//! Manifests are published per feature band as feed packages named
//! `{manifestId}.Manifest-{band}`. The manifest document has moved
//! around inside the package over time, so several candidate paths are
//! tried in order.

use serde::Serialize;

use crate::core::dependencies::WorkloadDependencies;
use crate::core::manifest::WorkloadManifest;
use crate::core::version::{FeatureBand, SdkVersion};
use crate::core::workload_set::WorkloadSet;
use crate::feed::{CancelToken, FeedResult, PackageFeed};

/// Candidate in-package paths for the manifest document, tried in order.
const MANIFEST_PATHS: &[&str] = &[
    "data/WorkloadManifest.json",
    "data/workloadmanifest.json",
    "WorkloadManifest.json",
    "workloadmanifest.json",
];

/// Candidate in-package paths for the dependency document.
const DEPENDENCY_PATHS: &[&str] = &[
    "data/WorkloadDependencies.json",
    "data/workloaddependencies.json",
    "WorkloadDependencies.json",
    "workloaddependencies.json",
];

/// Synthesize the feed package name for a manifest at a feature band.
pub fn manifest_package_name(manifest_id: &str, band: &FeatureBand) -> String {
    format!("{manifest_id}.Manifest-{band}")
}

/// Resolves manifest ids and feature bands to published manifests.
pub struct ManifestCatalog<'a> {
    feed: &'a dyn PackageFeed,
}

impl<'a> ManifestCatalog<'a> {
    pub fn new(feed: &'a dyn PackageFeed) -> Self {
        ManifestCatalog { feed }
    }

    /// List published versions of a manifest, descending.
    pub fn list_manifest_versions(
        &self,
        manifest_id: &str,
        band: &FeatureBand,
        include_prerelease: bool,
    ) -> FeedResult<Vec<SdkVersion>> {
        self.feed
            .list_versions(&manifest_package_name(manifest_id, band), include_prerelease)
    }

    /// Fetch and parse one manifest version.
    ///
    /// Absent package, absent document, and parse failure all yield
    /// `Ok(None)`; the parse failure is logged so a batch caller keeps
    /// going.
    pub fn get_manifest(
        &self,
        manifest_id: &str,
        band: &FeatureBand,
        version: &SdkVersion,
    ) -> FeedResult<Option<WorkloadManifest>> {
        let package = manifest_package_name(manifest_id, band);
        let Some(text) = self.first_candidate(&package, version, MANIFEST_PATHS)? else {
            return Ok(None);
        };

        match WorkloadManifest::parse(&text) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(e) => {
                tracing::warn!("failed to parse manifest {} {}: {}", package, version, e);
                Ok(None)
            }
        }
    }

    /// Fetch the highest published manifest version.
    pub fn get_latest_manifest(
        &self,
        manifest_id: &str,
        band: &FeatureBand,
        include_prerelease: bool,
    ) -> FeedResult<Option<(SdkVersion, WorkloadManifest)>> {
        let versions = self.list_manifest_versions(manifest_id, band, include_prerelease)?;
        let Some(latest) = versions.into_iter().next() else {
            return Ok(None);
        };
        Ok(self
            .get_manifest(manifest_id, band, &latest)?
            .map(|manifest| (latest, manifest)))
    }

    /// Fetch and parse the external dependency document for a manifest.
    pub fn get_dependencies(
        &self,
        manifest_id: &str,
        band: &FeatureBand,
        version: &SdkVersion,
    ) -> FeedResult<Option<WorkloadDependencies>> {
        let package = manifest_package_name(manifest_id, band);
        let Some(text) = self.first_candidate(&package, version, DEPENDENCY_PATHS)? else {
            return Ok(None);
        };

        match WorkloadDependencies::parse(&text) {
            Ok(dependencies) => Ok(Some(dependencies)),
            Err(e) => {
                tracing::warn!("failed to parse dependencies {} {}: {}", package, version, e);
                Ok(None)
            }
        }
    }

    /// Resolve every manifest a workload set pins.
    ///
    /// One feed call per manifest; a bad entry becomes a per-item error
    /// marker instead of aborting the batch. Once cancellation is
    /// observed no further calls are issued, and results already
    /// obtained are kept.
    pub fn manifests_for_set(
        &self,
        set: &WorkloadSet,
        cancel: &CancelToken,
    ) -> SetResolution {
        let mut manifests = Vec::new();
        let mut cancelled = false;

        for entry in set.workloads.values() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let band = entry
                .manifest_feature_band
                .as_deref()
                .and_then(|b| b.parse().ok())
                .unwrap_or(set.feature_band);

            let resolved = match entry.manifest_version.parse::<SdkVersion>() {
                Ok(version) => match self.get_manifest(&entry.manifest_id, &band, &version) {
                    Ok(manifest) => ResolvedManifest {
                        id: entry.manifest_id.clone(),
                        version: entry.manifest_version.clone(),
                        manifest,
                        error: None,
                    },
                    Err(e) => ResolvedManifest {
                        id: entry.manifest_id.clone(),
                        version: entry.manifest_version.clone(),
                        manifest: None,
                        error: Some(e.to_string()),
                    },
                },
                Err(e) => ResolvedManifest {
                    id: entry.manifest_id.clone(),
                    version: entry.manifest_version.clone(),
                    manifest: None,
                    error: Some(e.to_string()),
                },
            };
            manifests.push(resolved);
        }

        SetResolution {
            manifests,
            cancelled,
        }
    }

    fn first_candidate(
        &self,
        package: &str,
        version: &SdkVersion,
        paths: &[&str],
    ) -> FeedResult<Option<String>> {
        for path in paths {
            if let Some(content) = self.feed.get_file_content(package, version, path)? {
                return Ok(Some(content));
            }
        }
        Ok(None)
    }
}

/// One manifest resolved (or not) from a workload set entry.
#[derive(Debug, Serialize)]
pub struct ResolvedManifest {
    pub id: String,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<WorkloadManifest>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of resolving a whole workload set's manifests.
#[derive(Debug, Serialize)]
pub struct SetResolution {
    pub manifests: Vec<ResolvedManifest>,

    /// True when cancellation cut the batch short; `manifests` holds
    /// what was resolved before that.
    pub cancelled: bool,
}
