//! On-disk extraction cache for downloaded packages.
//!
//! The cache is content-addressed by `(package, version)` and is an
//! explicit object handed to the feed at construction, so tests can
//! point it at a temp directory. Concurrent first-time extractions of
//! the same key may both do the work, but they converge on identical
//! content because a published archive never changes; staging plus
//! rename keeps partially-extracted state out of the addressed path.

use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::core::version::SdkVersion;
use crate::feed::{match_entry, FeedError, FeedResult};

/// Content-addressed store of extracted packages.
#[derive(Debug, Clone)]
pub struct ExtractionCache {
    root: PathBuf,
}

impl ExtractionCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ExtractionCache { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory an extracted `(package, version)` lives at.
    pub fn entry_path(&self, package: &str, version: &SdkVersion) -> PathBuf {
        self.root
            .join(package.to_ascii_lowercase())
            .join(version.to_string().to_ascii_lowercase())
    }

    /// Return the extracted directory if it is already populated.
    pub fn lookup(&self, package: &str, version: &SdkVersion) -> Option<PathBuf> {
        let path = self.entry_path(package, version);
        match std::fs::read_dir(&path) {
            Ok(mut entries) => entries.next().map(|_| path),
            Err(_) => None,
        }
    }

    /// Extract a zip archive into the cache and return the entry path.
    ///
    /// Extraction goes to a staging directory first; if another caller
    /// won the rename race the staged copy is discarded and the winner's
    /// directory is used.
    pub fn store(&self, package: &str, version: &SdkVersion, archive: &[u8]) -> FeedResult<PathBuf> {
        let dest = self.entry_path(package, version);
        if let Some(existing) = self.lookup(package, version) {
            return Ok(existing);
        }

        // Sibling of dest; version strings contain dots, so appending
        // (rather than with_extension) keeps distinct versions distinct.
        let mut staging = dest.clone().into_os_string();
        staging.push(format!(".part-{}", std::process::id()));
        let staging = PathBuf::from(staging);
        extract_zip(archive, &staging)
            .map_err(|e| match e {
                ExtractError::Archive(msg) => {
                    FeedError::malformed(format!("package archive {package} {version}"), msg)
                }
                ExtractError::Io(err) => {
                    FeedError::transient(format!("extracting {package} {version}"), err)
                }
            })?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FeedError::transient("creating cache directory", e))?;
        }

        match std::fs::rename(&staging, &dest) {
            Ok(()) => Ok(dest),
            Err(rename_err) => {
                // Lost the race: keep whoever got there first.
                if dest.exists() {
                    let _ = std::fs::remove_dir_all(&staging);
                    Ok(dest)
                } else {
                    let _ = std::fs::remove_dir_all(&staging);
                    Err(FeedError::transient(
                        format!("storing {package} {version}"),
                        rename_err,
                    ))
                }
            }
        }
    }

    /// Read one file from an already-extracted package, using the same
    /// candidate matching as in-archive lookup.
    pub fn file_content(
        &self,
        package: &str,
        version: &SdkVersion,
        path: &str,
    ) -> Option<String> {
        let dir = self.lookup(package, version)?;
        let files = relative_files(&dir);
        let matched = match_entry(files.iter().map(String::as_str), path)?;
        std::fs::read_to_string(dir.join(matched)).ok()
    }
}

enum ExtractError {
    Archive(String),
    Io(std::io::Error),
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io(err)
    }
}

fn extract_zip(data: &[u8], dest: &Path) -> Result<(), ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| ExtractError::Archive(e.to_string()))?;

    std::fs::create_dir_all(dest)?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ExtractError::Archive(e.to_string()))?;

        let Some(relative) = safe_relative_path(Path::new(entry.name())) else {
            tracing::debug!("skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let output = dest.join(&relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&output)?;
            continue;
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents)?;
        std::fs::write(&output, contents)?;
    }

    Ok(())
}

/// Reject absolute paths and parent-directory traversal in entry names.
fn safe_relative_path(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => out.push(segment),
            Component::CurDir => {}
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => return None,
        }
    }
    Some(out)
}

/// All file paths under `dir`, relative, `/`-separated.
fn relative_files(dir: &Path) -> Vec<String> {
    fn walk(base: &Path, current: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(current) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(base, &path, out);
            } else if let Ok(relative) = path.strip_prefix(base) {
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    let mut files = Vec::new();
    walk(dir, dir, &mut files);
    files
}
