use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use log::{debug, warn};
use regex::Regex;

use crate::errors::{MinaError, Result};

/// Get every file under a directory (recursively) whose name matches `pattern`.
///
/// Symbolic links are followed, and the pattern is matched against the name
/// of the file a link resolves to, not the link's own name. Each real file
/// is returned once, by its canonical path, in sorted order.
pub fn find_matching_files<P: AsRef<Path>>(dir_path: P, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(MinaError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(MinaError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut visited_dirs = HashSet::new();
    let mut matches = BTreeSet::new();
    find_matching_files_recursive(dir_path, pattern, &mut visited_dirs, &mut matches)?;

    Ok(matches.into_iter().collect())
}

/// Helper function to recursively search for matching files
fn find_matching_files_recursive(
    dir_path: &Path,
    pattern: &Regex,
    visited_dirs: &mut HashSet<PathBuf>,
    result: &mut BTreeSet<PathBuf>,
) -> Result<()> {
    // A directory reachable twice (symlink cycle or alias) is walked once
    let canonical_dir = fs::canonicalize(dir_path)?;
    if !visited_dirs.insert(canonical_dir) {
        debug!("Skipping already visited directory {}", dir_path.display());
        return Ok(());
    }

    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_matching_files_recursive(&path, pattern, visited_dirs, result)?;
        } else if path.is_file() {
            let canonical = fs::canonicalize(&path)?;
            let Some(name) = canonical.file_name().and_then(|s| s.to_str()) else {
                warn!("Skipping file with non UTF-8 name: {}", path.display());
                continue;
            };

            if pattern.is_match(name) {
                result.insert(canonical);
            }
        }
    }

    Ok(())
}

/// Load a mask slice as an 8-bit grayscale image
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let img = image::open(path.as_ref())?;
    Ok(img.to_luma8())
}
