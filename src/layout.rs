//! Where archives and extracted sources live under the prefix directory.
//!
//! ```text
//! <prefix>/
//!   archives/zlib-1.3.1.tar.gz    downloaded, verified archive
//!   src/zlib-1.3.1/               extracted tree
//! ```

use crate::error::AcquireError;
use crate::extract::ArchiveFormat;
use std::path::{Path, PathBuf};

pub const DEFAULT_ARCHIVES_DIR: &str = "archives";
pub const DEFAULT_SRC_DIR: &str = "src";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    archives: PathBuf,
    src: PathBuf,
}

impl StorageLayout {
    /// The default layout under `prefix`.
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self::with_dirs(prefix, DEFAULT_ARCHIVES_DIR, DEFAULT_SRC_DIR)
    }

    /// A layout with custom archive and source directories. Relative
    /// directories are taken relative to `prefix`.
    pub fn with_dirs(
        prefix: impl Into<PathBuf>,
        archives: impl AsRef<Path>,
        src: impl AsRef<Path>,
    ) -> Self {
        let prefix = prefix.into();
        Self {
            archives: prefix.join(archives),
            src: prefix.join(src),
        }
    }

    pub fn archives_dir(&self) -> &Path {
        &self.archives
    }

    pub fn src_dir(&self) -> &Path {
        &self.src
    }

    /// Where the archive downloaded from `url` is stored.
    pub fn archive_path(&self, url: &str) -> PathBuf {
        self.archives.join(archive_filename(url))
    }

    /// Where the archive at `archive` is extracted to.
    pub fn source_dir(&self, archive: &Path) -> PathBuf {
        let name = archive
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "source".to_string());
        self.src.join(ArchiveFormat::stem(&name))
    }
}

/// Last path segment of `url`, without query string or fragment.
///
/// Returns "download" when the URL has no usable segment.
pub fn archive_filename(url: &str) -> String {
    let clean = url.split(['?', '#']).next().unwrap_or(url);
    let without_scheme = clean.split_once("://").map_or(clean, |(_, rest)| rest);

    match without_scheme.split_once('/') {
        Some((_, path)) => path
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .map(str::to_string)
            .unwrap_or_else(|| "download".to_string()),
        None => "download".to_string(),
    }
}

/// Create `dir` (and parents) unless it already exists as a directory.
pub fn ensure_dir(dir: &Path) -> Result<(), AcquireError> {
    match std::fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(AcquireError::StorageUnavailable {
            path: dir.to_path_buf(),
            reason: "exists and is not a directory".to_string(),
        }),
        Err(_) => std::fs::create_dir_all(dir).map_err(|e| AcquireError::StorageUnavailable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_filename() {
        assert_eq!(
            archive_filename("https://zlib.net/zlib-1.3.1.tar.gz"),
            "zlib-1.3.1.tar.gz"
        );
        assert_eq!(
            archive_filename("https://example.com/dl/pkg.tgz?mirror=1#top"),
            "pkg.tgz"
        );
        assert_eq!(archive_filename("https://example.com/"), "download");
        assert_eq!(archive_filename("https://example.com"), "download");
        assert_eq!(archive_filename("https://example.com/a/.."), "download");
    }

    #[test]
    fn test_layout_paths() {
        let layout = StorageLayout::new("/opt/gig");
        assert_eq!(layout.archives_dir(), Path::new("/opt/gig/archives"));
        assert_eq!(layout.src_dir(), Path::new("/opt/gig/src"));
        assert_eq!(
            layout.archive_path("http://x.org/foo-2.0.tar.xz"),
            PathBuf::from("/opt/gig/archives/foo-2.0.tar.xz")
        );
        assert_eq!(
            layout.source_dir(Path::new("/opt/gig/archives/foo-2.0.tar.xz")),
            PathBuf::from("/opt/gig/src/foo-2.0")
        );
    }

    #[test]
    fn test_custom_dirs() {
        let layout = StorageLayout::with_dirs("/p", "cache", "/abs/src");
        assert_eq!(layout.archives_dir(), Path::new("/p/cache"));
        assert_eq!(layout.src_dir(), Path::new("/abs/src"));
    }

    #[test]
    fn test_ensure_dir_creates_and_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();

        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_dir(&file),
            Err(AcquireError::StorageUnavailable { .. })
        ));
    }
}
