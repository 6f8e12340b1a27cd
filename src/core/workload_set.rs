//! Workload set parsing.
//!
//! A workload set pins the exact manifest version for every manifest in
//! a feature band, guaranteeing a mutually-compatible combination. The
//! document is a flat map `{ manifestOrWorkloadId: "version[/band]" }`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::manifest::ManifestError;
use crate::core::version::FeatureBand;
use crate::util::json::parse_lenient;

/// A parsed workload set document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSet {
    /// Workload set version (`9.0.100.1`).
    pub version: String,

    /// The feature band this set was published for.
    pub feature_band: FeatureBand,

    /// Pinned manifests keyed by manifest/workload id.
    pub workloads: BTreeMap<String, WorkloadSetEntry>,
}

/// One pinned manifest within a workload set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSetEntry {
    pub manifest_id: String,

    pub manifest_version: String,

    /// Present only when the manifest's own feature band differs from
    /// the set's (e.g. a manifest shared across bands).
    pub manifest_feature_band: Option<String>,
}

impl WorkloadSet {
    /// Parse a workload set document.
    ///
    /// `version` and `band` come from the surrounding context (package
    /// version and feed band, or directory names locally); the document
    /// itself carries neither. Entries with an empty value are skipped
    /// as malformed rather than failing the whole set.
    pub fn parse(version: &str, band: FeatureBand, text: &str) -> Result<Self, ManifestError> {
        let value = parse_lenient(text)?;
        let root = value
            .as_object()
            .ok_or_else(|| ManifestError::Schema("workload set root is not an object".into()))?;

        let mut workloads = BTreeMap::new();
        for (id, pin) in root {
            let Some(pin) = pin.as_str() else {
                tracing::warn!("workload set entry `{}` is not a string, skipping", id);
                continue;
            };

            let mut segments = pin.split('/').filter(|s| !s.is_empty());
            let Some(manifest_version) = segments.next() else {
                tracing::warn!("workload set entry `{}` has an empty pin, skipping", id);
                continue;
            };

            workloads.insert(
                id.clone(),
                WorkloadSetEntry {
                    manifest_id: id.clone(),
                    manifest_version: manifest_version.to_string(),
                    manifest_feature_band: segments.next().map(str::to_string),
                },
            );
        }

        Ok(WorkloadSet {
            version: version.to_string(),
            feature_band: band,
            workloads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band() -> FeatureBand {
        "9.0.100".parse().unwrap()
    }

    #[test]
    fn test_parse_entry_with_band() {
        let set = WorkloadSet::parse(
            "9.0.100.1",
            band(),
            r#"{"microsoft.net.sdk.android":"35.0.0/9.0.100"}"#,
        )
        .unwrap();

        assert_eq!(set.workloads.len(), 1);
        let entry = &set.workloads["microsoft.net.sdk.android"];
        assert_eq!(entry.manifest_version, "35.0.0");
        assert_eq!(entry.manifest_feature_band.as_deref(), Some("9.0.100"));
    }

    #[test]
    fn test_parse_entry_without_band() {
        let set = WorkloadSet::parse("9.0.100.1", band(), r#"{"x":"1.2.3"}"#).unwrap();
        let entry = &set.workloads["x"];
        assert_eq!(entry.manifest_version, "1.2.3");
        assert_eq!(entry.manifest_feature_band, None);
    }

    #[test]
    fn test_empty_pins_are_skipped() {
        let set = WorkloadSet::parse(
            "9.0.100.1",
            band(),
            r#"{"good":"1.0.0", "empty":"", "slashes":"//"}"#,
        )
        .unwrap();
        assert_eq!(set.workloads.len(), 1);
        assert!(set.workloads.contains_key("good"));
    }

    #[test]
    fn test_non_string_pins_are_skipped() {
        let set = WorkloadSet::parse("9.0.100.1", band(), r#"{"a": 42, "b": "1.0.0"}"#).unwrap();
        assert_eq!(set.workloads.len(), 1);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(WorkloadSet::parse("1", band(), "nope").is_err());
        assert!(WorkloadSet::parse("1", band(), "[]").is_err());
    }

    #[test]
    fn test_tolerates_comments() {
        let set = WorkloadSet::parse(
            "9.0.100.1",
            band(),
            "{\n  // pinned by release\n  \"maui\": \"9.0.100.1/9.0.100\",\n}",
        )
        .unwrap();
        assert_eq!(set.workloads["maui"].manifest_version, "9.0.100.1");
    }
}
