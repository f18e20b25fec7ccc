use crate::error::{PadError, PadResult};
use glob::{MatchOptions, Pattern};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Recursively collect regular files under `root` whose file name matches `pattern`.
///
/// Symbolic links are neither returned nor followed, and hidden (dot-prefixed)
/// files and directories below `root` are left out. Each directory lists its
/// files before descending into its subdirectories, both sorted by name
/// ignoring case. Entries that cannot be read are skipped.
pub fn find_files(root: &Path, pattern: &str) -> PadResult<Vec<PathBuf>> {
    let matcher = Pattern::new(pattern).map_err(|source| PadError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let files: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by(files_before_dirs)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && matches_name(&matcher, entry))
        .map(DirEntry::into_path)
        .collect();

    log::debug!(
        "Found {} file(s) matching '{}' under {}",
        files.len(),
        pattern,
        root.display()
    );
    Ok(files)
}

// The root itself is always walked, even when its own name starts with a dot.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn matches_name(matcher: &Pattern, entry: &DirEntry) -> bool {
    matcher.matches_with(&entry.file_name().to_string_lossy(), NAME_MATCH)
}

fn files_before_dirs(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_name = a.file_name().to_string_lossy().to_lowercase();
    let b_name = b.file_name().to_string_lossy().to_lowercase();
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a_name.cmp(&b_name))
        .then_with(|| a.file_name().cmp(b.file_name()))
}
