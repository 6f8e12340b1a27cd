//! global.json discovery and pin inspection.
//!
//! A global.json anywhere above the working directory can pin the SDK
//! version and the workload set version for everything beneath it. The
//! nearest file wins; there is no merging across levels.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::util::json::{get_ci, get_str_ci, parse_lenient};

/// Pins read from one global.json file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalJsonInfo {
    /// Where the file was found.
    pub path: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_forward: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_set_version: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub msbuild_sdks: BTreeMap<String, String>,
}

impl GlobalJsonInfo {
    /// Whether the file pins a specific SDK version.
    pub fn is_sdk_pinned(&self) -> bool {
        self.sdk_version.is_some()
    }

    /// Whether the file pins a workload set version.
    pub fn is_workload_set_pinned(&self) -> bool {
        self.workload_set_version.is_some()
    }

    /// Parse a global.json file.
    ///
    /// An unreadable or malformed file is logged and treated as absent;
    /// a broken global.json must not make the surrounding tooling fail.
    pub fn parse(path: &Path) -> Option<GlobalJsonInfo> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        let value = match parse_lenient(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("failed to parse {}: {}", path.display(), e);
                return None;
            }
        };
        let root = value.as_object()?;

        let sdk = get_ci(root, "sdk").and_then(Value::as_object);

        let mut msbuild_sdks = BTreeMap::new();
        if let Some(entries) = get_ci(root, "msbuild-sdks").and_then(Value::as_object) {
            for (id, version) in entries {
                if let Some(version) = version.as_str() {
                    msbuild_sdks.insert(id.clone(), version.to_string());
                }
            }
        }

        let workload_set = get_ci(root, "workloadSet").and_then(Value::as_object);

        Some(GlobalJsonInfo {
            path: path.to_path_buf(),
            sdk_version: sdk.and_then(|s| get_str_ci(s, "version")),
            roll_forward: sdk.and_then(|s| get_str_ci(s, "rollForward")),
            workload_set_version: workload_set.and_then(|w| get_str_ci(w, "version")),
            msbuild_sdks,
        })
    }

    /// Find and parse the nearest global.json at or above `start`.
    pub fn load_nearest(start: &Path) -> Option<GlobalJsonInfo> {
        find_nearest(start).and_then(|path| Self::parse(&path))
    }
}

/// Walk upward from `start` (inclusive) looking for a global.json.
pub fn find_nearest(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join("global.json");
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}
