//! Domain model: versions, manifests, workload sets, dependencies.

pub mod dependencies;
pub mod manifest;
pub mod version;
pub mod workload_set;

pub use dependencies::WorkloadDependencies;
pub use manifest::{ManifestError, WorkloadManifest};
pub use version::{FeatureBand, SdkVersion, VersionParseError};
pub use workload_set::{WorkloadSet, WorkloadSetEntry};
