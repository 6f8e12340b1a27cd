//! SDK version parsing and feature band derivation.
//!
//! SDK versions are not semver: workload set versions carry a fourth
//! segment (`9.0.100.1`) and preview labels follow the `-` separator
//! (`9.0.100-preview.3.24172.9`). Feature bands group versions by
//! flooring the patch to a multiple of 100 (`9.0.105` -> `9.0.100`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A parsed SDK or package version.
///
/// Immutable once constructed; invalid strings fail to parse rather
/// than panicking, so callers scanning directory names can skip them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SdkVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,

    /// Fourth segment used by workload set versions (`9.0.100.1`).
    pub revision: Option<u32>,

    /// Preview label after the `-` separator, if any.
    pub preview: Option<String>,
}

impl SdkVersion {
    /// Derive the feature band for this version.
    ///
    /// `9.0.105` and `9.0.100` both band to `9.0.100`.
    pub fn feature_band(&self) -> FeatureBand {
        FeatureBand {
            major: self.major,
            minor: self.minor,
            patch: (self.patch / 100) * 100,
        }
    }

    /// Whether this version carries a preview label.
    pub fn is_prerelease(&self) -> bool {
        self.preview.is_some()
    }
}

impl FromStr for SdkVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::new(s));
        }

        let (numeric, preview) = match s.split_once('-') {
            Some((n, p)) if !p.is_empty() => (n, Some(p.to_string())),
            Some(_) => return Err(VersionParseError::new(s)),
            None => (s, None),
        };

        let parts: Vec<&str> = numeric.split('.').collect();
        if parts.len() < 3 || parts.len() > 4 {
            return Err(VersionParseError::new(s));
        }

        let mut nums = Vec::with_capacity(parts.len());
        for part in &parts {
            nums.push(part.parse::<u32>().map_err(|_| VersionParseError::new(s))?);
        }

        Ok(SdkVersion {
            major: nums[0],
            minor: nums[1],
            patch: nums[2],
            revision: nums.get(3).copied(),
            preview,
        })
    }
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(rev) = self.revision {
            write!(f, ".{}", rev)?;
        }
        if let Some(preview) = &self.preview {
            write!(f, "-{}", preview)?;
        }
        Ok(())
    }
}

impl Serialize for SdkVersion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl Ord for SdkVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |v: &SdkVersion| (v.major, v.minor, v.patch, v.revision);
        key(self).cmp(&key(other)).then_with(|| {
            // A release outranks its own preview.
            match (&self.preview, &other.preview) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_preview(a, b),
            }
        })
    }
}

/// Compare preview labels by dot-separated segment, NuGet-style:
/// numeric segments compare numerically and sort below alphanumeric
/// ones; a missing segment sorts below any present one. `preview.10`
/// therefore outranks `preview.9`.
fn compare_preview(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(m), Ok(n)) => m.cmp(&n),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    // Numeric comparison equates differently-written segments ("07"
    // and "7"); break the tie on the raw text so Equal implies ==.
    a.cmp(b)
}

impl PartialOrd for SdkVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A feature band (`major.minor` plus patch floored to a multiple of 100).
///
/// Scopes which workload manifests and workload sets apply to an SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureBand {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FromStr for FeatureBand {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version: SdkVersion = s.parse()?;
        if version.revision.is_some() || version.preview.is_some() {
            return Err(VersionParseError::new(s));
        }
        Ok(version.feature_band())
    }
}

impl fmt::Display for FeatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for FeatureBand {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Failure to parse a version string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unparsable version string: `{text}`")]
pub struct VersionParseError {
    pub text: String,
}

impl VersionParseError {
    fn new(text: &str) -> Self {
        VersionParseError {
            text: text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SdkVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_three_part() {
        let version = v("9.0.105");
        assert_eq!(version.major, 9);
        assert_eq!(version.minor, 0);
        assert_eq!(version.patch, 105);
        assert_eq!(version.revision, None);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_parse_workload_set_version() {
        let version = v("9.0.100.1");
        assert_eq!(version.revision, Some(1));
        assert_eq!(version.to_string(), "9.0.100.1");
    }

    #[test]
    fn test_parse_preview() {
        let version = v("9.0.100-preview.3.24172.9");
        assert_eq!(version.preview.as_deref(), Some("preview.3.24172.9"));
        assert!(version.is_prerelease());
        assert_eq!(version.to_string(), "9.0.100-preview.3.24172.9");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<SdkVersion>().is_err());
        assert!("nine".parse::<SdkVersion>().is_err());
        assert!("9.0".parse::<SdkVersion>().is_err());
        assert!("9.0.1.2.3".parse::<SdkVersion>().is_err());
        assert!("9.0.100-".parse::<SdkVersion>().is_err());
        assert!("workloadsets".parse::<SdkVersion>().is_err());
    }

    #[test]
    fn test_feature_band_floors_patch() {
        assert_eq!(v("9.0.105").feature_band().to_string(), "9.0.100");
        assert_eq!(v("9.0.100").feature_band().to_string(), "9.0.100");
        assert_eq!(v("8.0.311").feature_band().to_string(), "8.0.300");
        assert_eq!(v("9.0.0").feature_band().to_string(), "9.0.0");
    }

    #[test]
    fn test_feature_band_from_str() {
        let band: FeatureBand = "9.0.105".parse().unwrap();
        assert_eq!(band.to_string(), "9.0.100");
        assert!("9.0.100-preview.1".parse::<FeatureBand>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(v("9.0.105") > v("9.0.100"));
        assert!(v("9.0.100.1") > v("9.0.100"));
        assert!(v("9.0.100.2") > v("9.0.100.1"));
        assert!(v("10.0.100") > v("9.0.200"));

        // Release outranks its own preview.
        assert!(v("9.0.100") > v("9.0.100-rc.2"));
        assert!(v("9.0.100-rc.2") > v("9.0.100-rc.1"));
    }

    #[test]
    fn test_preview_segments_compare_numerically() {
        assert!(v("9.0.100-preview.10") > v("9.0.100-preview.9"));
        assert!(v("9.0.100-preview.7.25380.108") > v("9.0.100-preview.7.25380.9"));
        assert!(v("9.0.100-preview.7.25380.108") > v("9.0.100-preview.7"));
        // Alphanumeric segments outrank numeric ones, and compare
        // lexically among themselves.
        assert!(v("9.0.100-rc.1") > v("9.0.100-preview.10"));
    }

    #[test]
    fn test_ordering_agrees_with_equality() {
        use std::cmp::Ordering;

        // An explicit zero revision is a distinct version, not Equal.
        assert_ne!(v("9.0.100"), v("9.0.100.0"));
        assert_ne!(v("9.0.100").cmp(&v("9.0.100.0")), Ordering::Equal);
        assert!(v("9.0.100.0") > v("9.0.100"));

        assert_eq!(v("9.0.100.1").cmp(&v("9.0.100.1")), Ordering::Equal);
    }
}
