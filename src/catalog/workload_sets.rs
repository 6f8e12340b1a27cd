//! Workload set catalog.
//!
//! Workload sets are published per feature band as feed packages named
//! `Microsoft.NET.Workloads.{band}`.

use crate::core::version::{FeatureBand, SdkVersion};
use crate::core::workload_set::WorkloadSet;
use crate::feed::{FeedResult, PackageFeed};

/// Candidate in-package paths for the set document, tried in order.
const WORKLOAD_SET_PATHS: &[&str] = &[
    "data/microsoft.net.workloads.workloadset.json",
    "data/WorkloadSet.json",
    "data/workloadset.json",
    "WorkloadSet.json",
    "workloadset.json",
];

/// Synthesize the feed package name for a band's workload sets.
pub fn workload_set_package_name(band: &FeatureBand) -> String {
    format!("Microsoft.NET.Workloads.{band}")
}

/// Resolves feature bands to published workload sets.
pub struct WorkloadSetCatalog<'a> {
    feed: &'a dyn PackageFeed,
}

impl<'a> WorkloadSetCatalog<'a> {
    pub fn new(feed: &'a dyn PackageFeed) -> Self {
        WorkloadSetCatalog { feed }
    }

    /// List published workload set versions for a band, descending.
    pub fn list_set_versions(
        &self,
        band: &FeatureBand,
        include_prerelease: bool,
    ) -> FeedResult<Vec<SdkVersion>> {
        self.feed
            .list_versions(&workload_set_package_name(band), include_prerelease)
    }

    /// Fetch and parse one workload set version.
    ///
    /// Absent package, absent document, and parse failure all yield
    /// `Ok(None)`.
    pub fn get_workload_set(
        &self,
        band: &FeatureBand,
        version: &SdkVersion,
    ) -> FeedResult<Option<WorkloadSet>> {
        let package = workload_set_package_name(band);

        for path in WORKLOAD_SET_PATHS {
            let Some(text) = self.feed.get_file_content(&package, version, path)? else {
                continue;
            };
            return match WorkloadSet::parse(&version.to_string(), *band, &text) {
                Ok(set) => Ok(Some(set)),
                Err(e) => {
                    tracing::warn!("failed to parse workload set {} {}: {}", package, version, e);
                    Ok(None)
                }
            };
        }

        Ok(None)
    }

    /// Fetch the highest published workload set for a band.
    pub fn get_latest_workload_set(
        &self,
        band: &FeatureBand,
        include_prerelease: bool,
    ) -> FeedResult<Option<WorkloadSet>> {
        let versions = self.list_set_versions(band, include_prerelease)?;
        let Some(latest) = versions.into_iter().next() else {
            return Ok(None);
        };
        self.get_workload_set(band, &latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeFeed;

    fn band() -> FeatureBand {
        "9.0.100".parse().unwrap()
    }

    #[test]
    fn test_workload_set_package_name() {
        assert_eq!(
            workload_set_package_name(&band()),
            "Microsoft.NET.Workloads.9.0.100"
        );
    }

    #[test]
    fn test_get_workload_set_splits_pins() {
        let mut feed = FakeFeed::new();
        feed.add_file(
            "Microsoft.NET.Workloads.9.0.100",
            "9.0.100.1",
            "data/microsoft.net.workloads.workloadset.json",
            r#"{"microsoft.net.sdk.android":"35.0.0/9.0.100"}"#,
        );

        let catalog = WorkloadSetCatalog::new(&feed);
        let set = catalog
            .get_workload_set(&band(), &"9.0.100.1".parse().unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(set.version, "9.0.100.1");
        let entry = &set.workloads["microsoft.net.sdk.android"];
        assert_eq!(entry.manifest_version, "35.0.0");
        assert_eq!(entry.manifest_feature_band.as_deref(), Some("9.0.100"));
    }

    #[test]
    fn test_get_workload_set_tries_later_candidates() {
        let mut feed = FakeFeed::new();
        feed.add_file(
            "Microsoft.NET.Workloads.9.0.100",
            "9.0.100.1",
            "workloadset.json",
            r#"{"x":"1.2.3"}"#,
        );

        let catalog = WorkloadSetCatalog::new(&feed);
        let set = catalog
            .get_workload_set(&band(), &"9.0.100.1".parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(set.workloads["x"].manifest_feature_band, None);
    }

    #[test]
    fn test_get_workload_set_absent() {
        let feed = FakeFeed::new();
        let catalog = WorkloadSetCatalog::new(&feed);
        assert!(catalog
            .get_workload_set(&band(), &"9.0.100.1".parse().unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_get_latest_workload_set() {
        let mut feed = FakeFeed::new();
        feed.add_versions("Microsoft.NET.Workloads.9.0.100", &["9.0.100.1", "9.0.100.2"]);
        feed.add_file(
            "Microsoft.NET.Workloads.9.0.100",
            "9.0.100.2",
            "WorkloadSet.json",
            r#"{"m":"2.0.0"}"#,
        );

        let catalog = WorkloadSetCatalog::new(&feed);
        let set = catalog.get_latest_workload_set(&band(), true).unwrap().unwrap();
        assert_eq!(set.version, "9.0.100.2");
    }

    #[test]
    fn test_get_latest_workload_set_empty_band() {
        let feed = FakeFeed::new();
        let catalog = WorkloadSetCatalog::new(&feed);
        assert!(catalog.get_latest_workload_set(&band(), false).unwrap().is_none());
    }
}
