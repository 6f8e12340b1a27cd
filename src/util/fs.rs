//! Filesystem helpers.

use std::path::Path;

/// Names of the immediate subdirectories of `dir`.
///
/// A missing or unreadable directory yields an empty list; local
/// inventory treats both the same as "nothing installed".
pub fn dir_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect()
}
