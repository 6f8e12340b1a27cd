//! Aggregated view of everything installed, grouped by major version.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::manifest::{PackDefinition, WorkloadDefinition};
use crate::core::version::SdkVersion;
use crate::util::fs::dir_names;

use super::LocalInventory;

/// Snapshot of the local install state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub dotnet_path: String,

    pub timestamp: DateTime<Utc>,

    pub total_installed_sdks: usize,

    /// Every installed SDK version, descending.
    pub all_installed_versions: Vec<SdkVersion>,

    /// One entry per major version, descending, each describing the
    /// highest installed SDK of that major.
    pub sdks_by_major_version: Vec<MajorVersionSummary>,
}

/// Install state for one major version line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorVersionSummary {
    pub major_version: u32,

    pub feature_band: String,

    pub latest_installed_version: SdkVersion,

    /// Highest installed Microsoft.NETCore.App runtime of the same
    /// major, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,

    pub is_preview: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_set: Option<WorkloadSetSummary>,

    pub manifests: Vec<ManifestSummary>,
}

/// The workload set installed for a band.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSetSummary {
    pub version: String,
    pub manifest_count: usize,
}

/// One installed manifest, or a marker for one that failed to load.
///
/// A manifest that exists but does not parse still appears in the
/// summary, with `error` set and every other field absent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pack_count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub concrete_workloads: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workloads: Option<Vec<WorkloadDefinition>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub packs: Option<Vec<PackDefinition>>,
}

impl LocalInventory {
    /// Build the install summary.
    ///
    /// With `include_details` set, each manifest entry carries its full
    /// workload and pack definitions; otherwise only counts and the
    /// concrete workload ids.
    pub fn build_summary(&self, include_details: bool) -> InventorySummary {
        let all_versions = self.installed_versions();

        // installed_versions is descending, so the first of each major
        // is that line's latest.
        let mut majors: Vec<MajorVersionSummary> = Vec::new();
        for version in &all_versions {
            if majors.iter().any(|m| m.major_version == version.major) {
                continue;
            }
            majors.push(self.summarize_major(version, include_details));
        }

        InventorySummary {
            dotnet_path: self.root().display().to_string(),
            timestamp: Utc::now(),
            total_installed_sdks: all_versions.len(),
            all_installed_versions: all_versions,
            sdks_by_major_version: majors,
        }
    }

    fn summarize_major(&self, latest: &SdkVersion, include_details: bool) -> MajorVersionSummary {
        let band = latest.feature_band();

        let manifests = self
            .installed_manifest_ids(&band)
            .into_iter()
            .map(|id| match self.installed_manifest(&band, &id) {
                Ok(Some(manifest)) => {
                    let concrete: Vec<String> = manifest
                        .concrete_workload_ids()
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    ManifestSummary {
                        id,
                        error: None,
                        version: Some(manifest.version.clone()),
                        workload_count: Some(manifest.workloads.len()),
                        pack_count: Some(manifest.packs.len()),
                        concrete_workloads: Some(concrete),
                        workloads: include_details
                            .then(|| manifest.workloads.values().cloned().collect()),
                        packs: include_details
                            .then(|| manifest.packs.values().cloned().collect()),
                    }
                }
                Ok(None) => ManifestSummary::error(id, "no manifest document found".to_string()),
                Err(e) => ManifestSummary::error(id, format!("{e:#}")),
            })
            .collect();

        let workload_set = self
            .installed_workload_set(&band)
            .map(|set| WorkloadSetSummary {
                version: set.version,
                manifest_count: set.workloads.len(),
            });

        MajorVersionSummary {
            major_version: latest.major,
            feature_band: band.to_string(),
            latest_installed_version: latest.clone(),
            runtime_version: self.runtime_version_for_major(latest.major),
            is_preview: latest.preview.is_some(),
            workload_set,
            manifests,
        }
    }

    /// Highest installed shared runtime version with the given major.
    fn runtime_version_for_major(&self, major: u32) -> Option<String> {
        let runtimes_dir = self.root().join("shared").join("Microsoft.NETCore.App");
        dir_names(&runtimes_dir)
            .iter()
            .filter_map(|name| name.parse::<SdkVersion>().ok())
            .filter(|v| v.major == major)
            .max()
            .map(|v| v.to_string())
    }
}

impl ManifestSummary {
    fn error(id: String, message: String) -> Self {
        ManifestSummary {
            id,
            error: Some(message),
            version: None,
            workload_count: None,
            pack_count: None,
            concrete_workloads: None,
            workloads: None,
            packs: None,
        }
    }
}
