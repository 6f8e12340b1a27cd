//! Workload manifest and version resolution engine for .NET SDK
//! workloads.
//!
//! The crate answers questions like "which workload manifests exist for
//! SDK feature band 9.0.100", "what does workload set 9.0.100.1 pin
//! them to", and "what is installed under this dotnet root". Remote
//! state comes from a NuGet V3 flat-container feed via [`feed`], local
//! state from the filesystem via [`inventory`]; the [`catalog`] layer
//! ties feed packages back to domain objects.

pub mod catalog;
pub mod core;
pub mod feed;
pub mod inventory;
pub mod pinning;
pub mod util;

#[cfg(test)]
pub mod test_support;

pub use catalog::{ManifestCatalog, WorkloadSetCatalog};
pub use crate::core::{FeatureBand, SdkVersion, WorkloadManifest, WorkloadSet};
pub use feed::{CancelToken, ExtractionCache, FeedError, HttpPackageFeed, PackageFeed};
pub use inventory::LocalInventory;
pub use pinning::GlobalJsonInfo;
