//! WorkloadDependencies.json parsing.
//!
//! The dependency document describes external tools a workload needs
//! but does not distribute as packs (JDK, Android SDK components,
//! Xcode, Windows SDK, WebView2, Appium). The schema is loosely typed
//! and has drifted over time, so every entry keeps its raw JSON value
//! alongside the typed view; unmodeled fields are never lost.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::core::manifest::ManifestError;
use crate::util::json::{as_bool_lenient, as_string_list, get_ci, get_str_ci, parse_lenient};

/// The parsed WorkloadDependencies.json document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadDependencies {
    /// Entries keyed by workload id.
    pub workloads: BTreeMap<String, WorkloadDependencyEntry>,
}

/// External dependencies for one workload.
///
/// All typed fields are optional; `raw` always holds the original JSON
/// element for the entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadDependencyEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<WorkloadInfo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xcode: Option<VersionDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<VersionDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jdk: Option<VersionDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_app_sdk: Option<VersionDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_sdk_build_tools: Option<VersionDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub win2d: Option<VersionDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub webview2: Option<VersionDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_sdk: Option<AndroidSdkDependency>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub appium: Option<AppiumDependency>,

    /// The unmodified JSON element for this entry.
    pub raw: Value,
}

/// Workload metadata within a dependency entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadInfo {
    pub aliases: Vec<String>,
    pub version: Option<String>,
}

/// A versioned external tool requirement.
///
/// `version` is an advisory acceptable-range expression used to
/// validate an existing install; `recommended_version` is the single
/// concrete value to install fresh. They serve different purposes and
/// are never conflated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDependency {
    pub version: Option<String>,
    pub recommended_version: Option<String>,
}

/// Android SDK component requirements.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidSdkDependency {
    pub packages: Vec<AndroidSdkPackage>,
}

/// One Android SDK package.
///
/// Exactly one of `id` / `platform_ids` is populated: the `id` field in
/// the document is either a single string or a per-RID object. Callers
/// pick the id for their RID; an entry with neither is not resolvable
/// on this platform.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AndroidSdkPackage {
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub platform_ids: BTreeMap<String, String>,

    pub recommended_version: Option<String>,

    pub is_optional: bool,
}

impl AndroidSdkPackage {
    /// The package id for a platform RID, if resolvable.
    pub fn id_for_rid(&self, rid: &str) -> Option<&str> {
        self.id
            .as_deref()
            .or_else(|| self.platform_ids.get(rid).map(String::as_str))
    }
}

/// Appium requirements: the server version plus named drivers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppiumDependency {
    pub version: Option<String>,
    pub recommended_version: Option<String>,
    pub drivers: Vec<AppiumDriver>,
}

/// One named Appium driver.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppiumDriver {
    pub name: String,
    pub version: Option<String>,
    pub recommended_version: Option<String>,
}

impl WorkloadDependencies {
    /// Parse a WorkloadDependencies.json document.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let value = parse_lenient(text)?;
        let root = value
            .as_object()
            .ok_or_else(|| ManifestError::Schema("dependencies root is not an object".into()))?;

        let mut workloads = BTreeMap::new();
        for (id, body) in root {
            workloads.insert(id.clone(), parse_entry(body));
        }

        Ok(WorkloadDependencies { workloads })
    }

    /// Look up an entry by workload id, case-insensitively.
    pub fn entry(&self, id: &str) -> Option<&WorkloadDependencyEntry> {
        self.workloads.get(id).or_else(|| {
            self.workloads
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(id))
                .map(|(_, e)| e)
        })
    }
}

fn parse_entry(body: &Value) -> WorkloadDependencyEntry {
    let empty = serde_json::Map::new();
    let object = body.as_object().unwrap_or(&empty);

    WorkloadDependencyEntry {
        workload: get_ci(object, "workload").map(parse_workload_info),
        xcode: get_ci(object, "xcode").map(parse_version_dependency),
        sdk: get_ci(object, "sdk").map(parse_version_dependency),
        jdk: get_ci(object, "jdk").map(parse_version_dependency),
        windows_app_sdk: get_ci(object, "windowsappsdk").map(parse_version_dependency),
        windows_sdk_build_tools: get_ci(object, "windowssdkbuildtools").map(parse_version_dependency),
        win2d: get_ci(object, "win2d").map(parse_version_dependency),
        webview2: get_ci(object, "webview2").map(parse_version_dependency),
        android_sdk: get_ci(object, "androidsdk").map(parse_android_sdk),
        appium: get_ci(object, "appium").map(parse_appium),
        raw: body.clone(),
    }
}

fn parse_workload_info(value: &Value) -> WorkloadInfo {
    let empty = serde_json::Map::new();
    let object = value.as_object().unwrap_or(&empty);

    WorkloadInfo {
        aliases: get_ci(object, "alias").map(as_string_list).unwrap_or_default(),
        version: get_str_ci(object, "version"),
    }
}

fn parse_version_dependency(value: &Value) -> VersionDependency {
    let empty = serde_json::Map::new();
    let object = value.as_object().unwrap_or(&empty);

    VersionDependency {
        version: get_str_ci(object, "version"),
        recommended_version: get_str_ci(object, "recommendedVersion"),
    }
}

fn parse_android_sdk(value: &Value) -> AndroidSdkDependency {
    let empty = serde_json::Map::new();
    let object = value.as_object().unwrap_or(&empty);

    let packages = get_ci(object, "packages")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(parse_android_package).collect())
        .unwrap_or_default();

    AndroidSdkDependency { packages }
}

fn parse_android_package(value: &Value) -> AndroidSdkPackage {
    let empty = serde_json::Map::new();
    let object = value.as_object().unwrap_or(&empty);

    let mut id = None;
    let mut platform_ids = BTreeMap::new();
    match get_ci(object, "id") {
        Some(Value::String(single)) => id = Some(single.clone()),
        Some(Value::Object(per_rid)) => {
            for (rid, package) in per_rid {
                if let Some(package) = package.as_str() {
                    platform_ids.insert(rid.clone(), package.to_string());
                }
            }
        }
        _ => {}
    }

    AndroidSdkPackage {
        description: get_str_ci(object, "description"),
        id,
        platform_ids,
        recommended_version: get_str_ci(object, "recommendedVersion"),
        is_optional: get_ci(object, "optional")
            .and_then(as_bool_lenient)
            .unwrap_or(false),
    }
}

fn parse_appium(value: &Value) -> AppiumDependency {
    let empty = serde_json::Map::new();
    let object = value.as_object().unwrap_or(&empty);

    let drivers = get_ci(object, "drivers")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let driver = item.as_object()?;
                    Some(AppiumDriver {
                        name: get_str_ci(driver, "name")?,
                        version: get_str_ci(driver, "version"),
                        recommended_version: get_str_ci(driver, "recommendedVersion"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    AppiumDependency {
        version: get_str_ci(object, "version"),
        recommended_version: get_str_ci(object, "recommendedVersion"),
        drivers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"
    {
        "microsoft.net.sdk.android": {
            "workload": { "alias": ["android"], "version": "35.0.0" },
            "jdk": { "version": "[17.0,18.0)", "recommendedVersion": "17.0.12" },
            "androidsdk": {
                "packages": [
                    {
                        "description": "Android SDK Platform 35",
                        "id": "platforms;android-35",
                        "recommendedVersion": "2",
                        "optional": "true"
                    },
                    {
                        "description": "Emulator",
                        "id": { "win-x64": "emulator-win", "osx-arm64": "emulator-osx" },
                        "optional": false
                    }
                ]
            },
            "vendorExtra": { "undocumented": true }
        },
        "microsoft.net.sdk.ios": {
            "Xcode": { "version": "[16.0,)", "recommendedVersion": "16.2" },
            "appium": {
                "version": "2.0",
                "drivers": [
                    { "name": "xcuitest", "recommendedVersion": "5.0.0" }
                ]
            }
        }
    }
    "#;

    #[test]
    fn test_parse_typed_fields() {
        let deps = WorkloadDependencies::parse(DOCUMENT).unwrap();
        let android = &deps.workloads["microsoft.net.sdk.android"];

        let jdk = android.jdk.as_ref().unwrap();
        assert_eq!(jdk.version.as_deref(), Some("[17.0,18.0)"));
        assert_eq!(jdk.recommended_version.as_deref(), Some("17.0.12"));

        let info = android.workload.as_ref().unwrap();
        assert_eq!(info.aliases, vec!["android"]);
        assert_eq!(info.version.as_deref(), Some("35.0.0"));
    }

    #[test]
    fn test_sub_keys_match_case_insensitively() {
        let deps = WorkloadDependencies::parse(DOCUMENT).unwrap();
        let ios = &deps.workloads["microsoft.net.sdk.ios"];
        // Published as "Xcode", matched as xcode.
        assert!(ios.xcode.is_some());
    }

    #[test]
    fn test_android_package_single_id() {
        let deps = WorkloadDependencies::parse(DOCUMENT).unwrap();
        let packages = &deps.workloads["microsoft.net.sdk.android"]
            .android_sdk
            .as_ref()
            .unwrap()
            .packages;

        let platform = &packages[0];
        assert_eq!(platform.id.as_deref(), Some("platforms;android-35"));
        assert!(platform.platform_ids.is_empty());
        // "optional" given as the string "true"
        assert!(platform.is_optional);
    }

    #[test]
    fn test_android_package_per_rid_ids() {
        let deps = WorkloadDependencies::parse(DOCUMENT).unwrap();
        let packages = &deps.workloads["microsoft.net.sdk.android"]
            .android_sdk
            .as_ref()
            .unwrap()
            .packages;

        let emulator = &packages[1];
        assert_eq!(emulator.id, None);
        assert_eq!(emulator.id_for_rid("win-x64"), Some("emulator-win"));
        assert_eq!(emulator.id_for_rid("linux-x64"), None);
        assert!(!emulator.is_optional);
    }

    #[test]
    fn test_raw_value_retains_unmodeled_fields() {
        let deps = WorkloadDependencies::parse(DOCUMENT).unwrap();
        let android = &deps.workloads["microsoft.net.sdk.android"];
        assert_eq!(android.raw["vendorExtra"]["undocumented"], true);
    }

    #[test]
    fn test_appium_drivers() {
        let deps = WorkloadDependencies::parse(DOCUMENT).unwrap();
        let appium = deps.workloads["microsoft.net.sdk.ios"].appium.as_ref().unwrap();
        assert_eq!(appium.version.as_deref(), Some("2.0"));
        assert_eq!(appium.drivers.len(), 1);
        assert_eq!(appium.drivers[0].name, "xcuitest");
        assert_eq!(appium.drivers[0].recommended_version.as_deref(), Some("5.0.0"));
    }

    #[test]
    fn test_entry_lookup_case_insensitive() {
        let deps = WorkloadDependencies::parse(DOCUMENT).unwrap();
        assert!(deps.entry("Microsoft.NET.Sdk.Android").is_some());
        assert!(deps.entry("missing").is_none());
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(WorkloadDependencies::parse("nope").is_err());
        assert!(WorkloadDependencies::parse("[]").is_err());
    }
}
