//! Locating tunefiles in the configured tune directories.
//!
//! A tune named `zlib` lives at `<dir>/zlib.tune` or `<dir>/zlib/zlib.tune`.
//! Directories are searched in order and the first hit wins.

use crate::error::LookupError;
use std::path::{Path, PathBuf};

pub const TUNE_EXTENSION: &str = "tune";

/// Reject names that could escape a tune directory.
pub fn validate_name(name: &str) -> Result<(), LookupError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(LookupError::InvalidName(name.to_string()))
    }
}

/// Resolve `package` to a tunefile.
///
/// Anything that looks like a path (has a separator or the `.tune`
/// extension) is taken literally.
pub fn resolve_tune(package: &str, paths: &[PathBuf]) -> Result<PathBuf, LookupError> {
    let suffix = format!(".{}", TUNE_EXTENSION);
    if package.contains('/') || package.contains('\\') || package.ends_with(&suffix) {
        let literal = PathBuf::from(package);
        if literal.is_file() {
            return Ok(literal);
        }
        return Err(not_found(package, &[]));
    }

    validate_name(package)?;
    let file_name = format!("{}.{}", package, TUNE_EXTENSION);
    for dir in paths {
        let direct = dir.join(&file_name);
        if direct.is_file() {
            return Ok(direct);
        }
        let nested = dir.join(package).join(&file_name);
        if nested.is_file() {
            return Ok(nested);
        }
    }
    Err(not_found(package, paths))
}

/// Every tunefile whose name contains `pattern`, case-insensitively, sorted
/// by name. A name found in several directories is listed once, from the
/// first directory.
pub fn search(pattern: &str, paths: &[PathBuf]) -> Vec<PathBuf> {
    let needle = pattern.to_lowercase();
    let mut hits: Vec<(String, PathBuf)> = Vec::new();

    for dir in paths {
        for path in tunes_in(dir) {
            let Some(name) = tune_name(&path) else {
                continue;
            };
            if name.to_lowercase().contains(&needle) && !hits.iter().any(|(n, _)| *n == name) {
                hits.push((name, path));
            }
        }
    }

    hits.sort_by(|a, b| a.0.cmp(&b.0));
    hits.into_iter().map(|(_, path)| path).collect()
}

/// `zlib` for `/x/tunes/zlib.tune`.
pub fn tune_name(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().to_string())
}

fn tunes_in(dir: &Path) -> Vec<PathBuf> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let patterns = [
        format!("{}/*.{}", base, TUNE_EXTENSION),
        format!("{}/*/*.{}", base, TUNE_EXTENSION),
    ];

    patterns
        .iter()
        .filter_map(|pattern| glob::glob(pattern).ok())
        .flat_map(|paths| paths.filter_map(Result::ok))
        .filter(|path| is_tune_location(dir, path))
        .collect()
}

/// Nested tunes only count when they match their directory name.
fn is_tune_location(dir: &Path, path: &Path) -> bool {
    match path.parent() {
        Some(parent) if parent == dir => true,
        Some(parent) => parent.file_name().map(|d| d.to_string_lossy().to_string()) == tune_name(path),
        None => false,
    }
}

fn not_found(name: &str, paths: &[PathBuf]) -> LookupError {
    LookupError::NotFound {
        name: name.to_string(),
        searched: if paths.is_empty() {
            "literal path".to_string()
        } else {
            paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        },
    }
}
