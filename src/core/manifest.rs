//! WorkloadManifest.json parsing and schema.
//!
//! A workload manifest describes a family of related workloads and the
//! packs they are composed of, published per feature band. Property
//! names match case-insensitively and identifier keys keep the case
//! they were published with; only lookups are case-insensitive.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::util::json::{as_bool_lenient, as_string_list, get_ci, get_str_ci, parse_lenient};

/// The parsed WorkloadManifest.json document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadManifest {
    /// Manifest version, as published (not necessarily band-shaped).
    pub version: String,

    pub description: Option<String>,

    /// Other manifests this one requires, id -> minimum version.
    pub depends_on: BTreeMap<String, String>,

    /// Workload definitions keyed by id, case as published.
    pub workloads: BTreeMap<String, WorkloadDefinition>,

    /// Pack definitions keyed by id, case as published.
    pub packs: BTreeMap<String, PackDefinition>,
}

/// A single workload entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadDefinition {
    pub id: String,

    pub description: Option<String>,

    /// Abstract workloads exist only to be extended; they cannot be
    /// selected or installed directly.
    pub is_abstract: bool,

    pub kind: WorkloadKind,

    /// Pack ids this workload installs.
    pub packs: Vec<String>,

    /// Base workload ids whose packs are inherited.
    pub extends: Vec<String>,

    /// Platform RID restrictions; empty means unrestricted.
    pub platforms: Vec<String>,

    /// Id of a workload that supersedes this one.
    pub redirect_to: Option<String>,
}

/// Workload kind, validated at parse time.
///
/// Unrecognized kinds are kept verbatim rather than silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadKind {
    Dev,
    Build,
    Unknown(String),
}

impl WorkloadKind {
    fn parse(text: Option<&str>) -> WorkloadKind {
        match text {
            None => WorkloadKind::Dev,
            Some(s) if s.eq_ignore_ascii_case("dev") => WorkloadKind::Dev,
            Some(s) if s.eq_ignore_ascii_case("build") => WorkloadKind::Build,
            Some(s) => WorkloadKind::Unknown(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            WorkloadKind::Dev => "dev",
            WorkloadKind::Build => "build",
            WorkloadKind::Unknown(s) => s,
        }
    }
}

impl Serialize for WorkloadKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single pack entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackDefinition {
    pub id: String,

    pub version: String,

    pub kind: PackKind,

    /// Pack id this one is a platform-specific substitute for.
    pub alias_to: Option<String>,

    /// Per-RID alias map, RID -> pack id.
    pub platform_alias_to: BTreeMap<String, String>,
}

/// Pack payload kind.
///
/// `Unspecified` marks a pack published without a `kind` property;
/// `Unknown` keeps an unrecognized value verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackKind {
    Sdk,
    Framework,
    Library,
    Template,
    Tool,
    Unspecified,
    Unknown(String),
}

impl PackKind {
    fn parse(text: Option<&str>) -> PackKind {
        match text {
            None => PackKind::Unspecified,
            Some(s) if s.eq_ignore_ascii_case("sdk") => PackKind::Sdk,
            Some(s) if s.eq_ignore_ascii_case("framework") => PackKind::Framework,
            Some(s) if s.eq_ignore_ascii_case("library") => PackKind::Library,
            Some(s) if s.eq_ignore_ascii_case("template") => PackKind::Template,
            Some(s) if s.eq_ignore_ascii_case("tool") => PackKind::Tool,
            Some(s) => PackKind::Unknown(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PackKind::Sdk => "sdk",
            PackKind::Framework => "framework",
            PackKind::Library => "library",
            PackKind::Template => "template",
            PackKind::Tool => "tool",
            PackKind::Unspecified => "unspecified",
            PackKind::Unknown(s) => s,
        }
    }
}

impl Serialize for PackKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Manifest parse failure, localized to one document.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Schema(String),
}

/// Cycle found while expanding a workload's `extends` chain.
#[derive(Debug, Error)]
#[error("workload extends cycle: {}", chain.join(" -> "))]
pub struct CycleError {
    pub chain: Vec<String>,
}

impl WorkloadManifest {
    /// Parse a WorkloadManifest.json document.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let value = parse_lenient(text)?;
        Self::from_value(&value)
    }

    fn from_value(value: &Value) -> Result<Self, ManifestError> {
        let root = value
            .as_object()
            .ok_or_else(|| ManifestError::Schema("manifest root is not an object".into()))?;

        let version = get_str_ci(root, "version")
            .ok_or_else(|| ManifestError::Schema("manifest is missing `version`".into()))?;

        let mut depends_on = BTreeMap::new();
        if let Some(deps) = get_ci(root, "depends-on").and_then(Value::as_object) {
            for (id, minimum) in deps {
                if let Some(minimum) = minimum.as_str() {
                    depends_on.insert(id.clone(), minimum.to_string());
                }
            }
        }

        let mut workloads = BTreeMap::new();
        if let Some(entries) = get_ci(root, "workloads").and_then(Value::as_object) {
            for (id, body) in entries {
                workloads.insert(id.clone(), parse_workload(id, body));
            }
        }

        let mut packs = BTreeMap::new();
        if let Some(entries) = get_ci(root, "packs").and_then(Value::as_object) {
            for (id, body) in entries {
                packs.insert(id.clone(), parse_pack(id, body));
            }
        }

        Ok(WorkloadManifest {
            version,
            description: get_str_ci(root, "description"),
            depends_on,
            workloads,
            packs,
        })
    }

    /// Look up a workload by id, case-insensitively.
    pub fn workload(&self, id: &str) -> Option<&WorkloadDefinition> {
        self.workloads.get(id).or_else(|| {
            self.workloads
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(id))
                .map(|(_, w)| w)
        })
    }

    /// Look up a workload, following a `redirect-to` one hop.
    pub fn resolve_workload(&self, id: &str) -> Option<&WorkloadDefinition> {
        let workload = self.workload(id)?;
        match &workload.redirect_to {
            Some(target) => self.workload(target).or(Some(workload)),
            None => Some(workload),
        }
    }

    /// Ids of concrete (non-abstract) workloads.
    pub fn concrete_workload_ids(&self) -> Vec<&str> {
        self.workloads
            .iter()
            .filter(|(_, w)| !w.is_abstract)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Resolve the transitive pack set for a workload over its
    /// `extends` chain.
    ///
    /// Packs are deduplicated in first-seen order. An `extends` target
    /// missing from this manifest is skipped (it may live in another
    /// manifest); a cycle is rejected rather than looped.
    pub fn expand_packs(&self, id: &str) -> Result<Vec<String>, CycleError> {
        let mut packs = Vec::new();
        let mut seen_packs = BTreeSet::new();
        let mut walk: Vec<String> = Vec::new();

        self.expand_packs_into(id, &mut packs, &mut seen_packs, &mut walk)?;
        Ok(packs)
    }

    fn expand_packs_into(
        &self,
        id: &str,
        packs: &mut Vec<String>,
        seen_packs: &mut BTreeSet<String>,
        walk: &mut Vec<String>,
    ) -> Result<(), CycleError> {
        if walk.iter().any(|visited| visited.eq_ignore_ascii_case(id)) {
            let mut chain = walk.clone();
            chain.push(id.to_string());
            return Err(CycleError { chain });
        }

        let Some(workload) = self.workload(id) else {
            tracing::debug!("extends target `{}` not in this manifest, skipping", id);
            return Ok(());
        };

        walk.push(id.to_string());
        for pack in &workload.packs {
            if seen_packs.insert(pack.clone()) {
                packs.push(pack.clone());
            }
        }
        for base in &workload.extends {
            self.expand_packs_into(base, packs, seen_packs, walk)?;
        }
        walk.pop();

        Ok(())
    }
}

fn parse_workload(id: &str, body: &Value) -> WorkloadDefinition {
    let empty = serde_json::Map::new();
    let object = body.as_object().unwrap_or(&empty);

    WorkloadDefinition {
        id: id.to_string(),
        description: get_str_ci(object, "description"),
        is_abstract: get_ci(object, "abstract")
            .and_then(as_bool_lenient)
            .unwrap_or(false),
        kind: WorkloadKind::parse(get_str_ci(object, "kind").as_deref()),
        packs: get_ci(object, "packs").map(as_string_list).unwrap_or_default(),
        extends: get_ci(object, "extends").map(as_string_list).unwrap_or_default(),
        platforms: get_ci(object, "platforms").map(as_string_list).unwrap_or_default(),
        redirect_to: get_str_ci(object, "redirect-to"),
    }
}

fn parse_pack(id: &str, body: &Value) -> PackDefinition {
    let empty = serde_json::Map::new();
    let object = body.as_object().unwrap_or(&empty);

    let mut alias_to = None;
    let mut platform_alias_to = BTreeMap::new();
    match get_ci(object, "alias-to") {
        Some(Value::String(target)) => alias_to = Some(target.clone()),
        Some(Value::Object(per_rid)) => {
            for (rid, target) in per_rid {
                if let Some(target) = target.as_str() {
                    platform_alias_to.insert(rid.clone(), target.to_string());
                }
            }
        }
        _ => {}
    }

    PackDefinition {
        id: id.to_string(),
        version: get_str_ci(object, "version").unwrap_or_default(),
        kind: PackKind::parse(get_str_ci(object, "kind").as_deref()),
        alias_to,
        platform_alias_to,
    }
}
