//! Remote catalogs over the package feed.
//!
//! Catalogs translate domain queries (manifest id + feature band,
//! workload set band) into feed package names and in-package file
//! paths, and parse what comes back. A parse failure in one artifact
//! is logged and reported as absent so batch operations stay resilient.

pub mod manifests;
pub mod workload_sets;

pub use manifests::{manifest_package_name, ManifestCatalog, ResolvedManifest, SetResolution};
pub use workload_sets::{workload_set_package_name, WorkloadSetCatalog};
