//! Installed-state discovery from the local filesystem.
//!
//! Everything here is offline: SDK installs, manifests, and workload
//! sets are read from the `dotnet` root directory tree, never from the
//! network. Discovery probes candidates in a fixed order so that
//! environment-variable overrides always outrank system-wide installs.

pub mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::WorkloadManifest;
use crate::core::version::{FeatureBand, SdkVersion};
use crate::core::workload_set::WorkloadSet;
use crate::util::fs::dir_names;

pub use summary::{InventorySummary, MajorVersionSummary, ManifestSummary, WorkloadSetSummary};

/// Local workload set filenames, in priority order.
///
/// Note this differs from the remote in-package candidate order.
const LOCAL_WORKLOAD_SET_FILES: &[&str] = &[
    "WorkloadSet.json",
    "workloadset.json",
    "microsoft.net.workloads.workloadset.json",
];

/// A view over one installed dotnet root.
#[derive(Debug, Clone)]
pub struct LocalInventory {
    root: PathBuf,
}

impl LocalInventory {
    /// Discover the dotnet root and open an inventory over it.
    pub fn discover() -> Option<Self> {
        sdk_root().map(|root| LocalInventory { root })
    }

    /// Open an inventory over an explicit root (no discovery).
    pub fn at_root(root: impl Into<PathBuf>) -> Self {
        LocalInventory { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Installed SDK versions, descending. Directory names under
    /// `{root}/sdk` that do not parse as versions are skipped.
    pub fn installed_versions(&self) -> Vec<SdkVersion> {
        let mut versions: Vec<SdkVersion> = dir_names(&self.root.join("sdk"))
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        versions.sort_by(|a, b| b.cmp(a));
        versions
    }

    /// Manifest ids installed for a feature band.
    pub fn installed_manifest_ids(&self, band: &FeatureBand) -> Vec<String> {
        let mut ids: Vec<String> = dir_names(&self.manifests_dir(band))
            .into_iter()
            .filter(|name| !name.eq_ignore_ascii_case("workloadsets"))
            .collect();
        ids.sort();
        ids
    }

    /// Load one installed manifest.
    ///
    /// The document may sit directly in the manifest id directory or in
    /// a version-named subdirectory (highest version first). `Ok(None)`
    /// means no document was found; a parse failure is an error the
    /// caller turns into a per-item marker.
    pub fn installed_manifest(
        &self,
        band: &FeatureBand,
        manifest_id: &str,
    ) -> Result<Option<WorkloadManifest>> {
        let base = self.manifests_dir(band).join(manifest_id);

        let mut candidates = vec![base.join("WorkloadManifest.json")];

        let mut versioned: Vec<SdkVersion> = dir_names(&base)
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        versioned.sort_by(|a, b| b.cmp(a));
        candidates.extend(
            versioned
                .iter()
                .map(|v| base.join(v.to_string()).join("WorkloadManifest.json")),
        );

        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&candidate)
                .with_context(|| format!("failed to read {}", candidate.display()))?;
            let manifest = WorkloadManifest::parse(&text)
                .with_context(|| format!("failed to parse {}", candidate.display()))?;
            return Ok(Some(manifest));
        }

        Ok(None)
    }

    /// Load the installed workload set for a band, if any.
    ///
    /// Picks the highest version-named directory under `workloadsets/`;
    /// siblings with non-version names are ignored. A set that fails to
    /// parse is logged and reported as absent.
    pub fn installed_workload_set(&self, band: &FeatureBand) -> Option<WorkloadSet> {
        let sets_dir = self.manifests_dir(band).join("workloadsets");

        let mut versions: Vec<SdkVersion> = dir_names(&sets_dir)
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        versions.sort_by(|a, b| b.cmp(a));
        let version = versions.into_iter().next()?;

        let set_dir = sets_dir.join(version.to_string());
        for filename in LOCAL_WORKLOAD_SET_FILES {
            let path = set_dir.join(filename);
            if !path.is_file() {
                continue;
            }
            let Ok(text) = std::fs::read_to_string(&path) else {
                tracing::warn!("failed to read {}", path.display());
                return None;
            };
            return match WorkloadSet::parse(&version.to_string(), *band, &text) {
                Ok(set) => Some(set),
                Err(e) => {
                    tracing::warn!("failed to parse {}: {}", path.display(), e);
                    None
                }
            };
        }

        None
    }

    fn manifests_dir(&self, band: &FeatureBand) -> PathBuf {
        self.root.join("sdk-manifests").join(band.to_string())
    }
}

/// Locate the dotnet root directory.
///
/// Probes, in order: the architecture-specific root override, the
/// Windows-x86 parenthesized variant, the generic root override,
/// `{cwd}/.dotnet`, `{home}/.dotnet`, OS well-known install
/// directories, and finally the directory containing the `dotnet`
/// executable on PATH. The first candidate with an `sdk` subdirectory
/// wins, so per-project overrides take precedence deterministically.
pub fn sdk_root() -> Option<PathBuf> {
    select_root(candidate_roots())
}

/// First candidate that actually contains an `sdk` subdirectory.
fn select_root(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|c| c.join("sdk").is_dir())
}

fn candidate_roots() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(root) = std::env::var_os(arch_root_env_var()) {
        candidates.push(PathBuf::from(root));
    }

    // 32-bit processes on 64-bit Windows get their own override.
    if cfg!(all(windows, target_arch = "x86")) {
        if let Some(root) = std::env::var_os("DOTNET_ROOT(x86)") {
            candidates.push(PathBuf::from(root));
        }
    }

    if let Some(root) = std::env::var_os("DOTNET_ROOT") {
        candidates.push(PathBuf::from(root));
    }

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(".dotnet"));
    }

    if let Some(base) = directories::BaseDirs::new() {
        candidates.push(base.home_dir().join(".dotnet"));
    }

    candidates.extend(well_known_roots());

    if let Ok(dotnet) = which::which("dotnet") {
        // Resolve symlinks so /usr/bin/dotnet points at the real root.
        let resolved = dotnet.canonicalize().unwrap_or(dotnet);
        if let Some(parent) = resolved.parent() {
            candidates.push(parent.to_path_buf());
        }
    }

    candidates
}

fn arch_root_env_var() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "DOTNET_ROOT_X64",
        "aarch64" => "DOTNET_ROOT_ARM64",
        "x86" => "DOTNET_ROOT_X86",
        "arm" => "DOTNET_ROOT_ARM",
        _ => "DOTNET_ROOT",
    }
}

fn well_known_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![PathBuf::from("C:\\Program Files\\dotnet")]
    } else if cfg!(target_os = "macos") {
        vec![PathBuf::from("/usr/local/share/dotnet")]
    } else {
        vec![
            PathBuf::from("/usr/share/dotnet"),
            PathBuf::from("/usr/lib/dotnet"),
        ]
    }
}
