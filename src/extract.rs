//! Archive extraction
//!
//! Unpacks a verified tar archive, optionally compressed, into a directory.
//! Directories and regular files are recreated with the entry's permission
//! bits; links, devices and other entry types are reported and skipped.
//!
//! Compression is chosen from the archive name:
//!
//! | suffix | decoder |
//! |--------|---------|
//! | `.tar.gz`, `.tgz`, `.gz` | gzip |
//! | `.tar.xz`, `.txz` | xz |
//! | `.tar.bz2`, `.tbz2` | bzip2 |
//! | `.tar.zst`, `.tzst` | zstd |
//! | anything else | none (plain tar) |

use crate::acquire::progress;
use crate::error::AcquireError;
use crate::layout::{self, StorageLayout};
use crate::output;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Gzip,
    Xz,
    Bzip2,
    Zstd,
    Plain,
}

/// Recognized suffixes, longest first so `.tar.gz` wins over `.gz`.
const SUFFIXES: [(&str, ArchiveFormat); 10] = [
    (".tar.bz2", ArchiveFormat::Bzip2),
    (".tar.zst", ArchiveFormat::Zstd),
    (".tar.gz", ArchiveFormat::Gzip),
    (".tar.xz", ArchiveFormat::Xz),
    (".tbz2", ArchiveFormat::Bzip2),
    (".tzst", ArchiveFormat::Zstd),
    (".tgz", ArchiveFormat::Gzip),
    (".txz", ArchiveFormat::Xz),
    (".tar", ArchiveFormat::Plain),
    (".gz", ArchiveFormat::Gzip),
];

impl ArchiveFormat {
    /// Detect the format from a file name.
    pub fn detect(name: &str) -> Self {
        let lower = name.to_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix))
            .map(|(_, format)| *format)
            .unwrap_or(ArchiveFormat::Plain)
    }

    /// The name with its archive suffix removed: `foo-1.0.tar.gz` -> `foo-1.0`.
    pub fn stem(name: &str) -> &str {
        let lower = name.to_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix) && lower.len() > suffix.len())
            .map(|(suffix, _)| &name[..name.len() - suffix.len()])
            .unwrap_or(name)
    }

    /// Leading bytes every stream of this format starts with.
    fn magic(self) -> &'static [u8] {
        match self {
            Self::Gzip => &[0x1f, 0x8b],
            Self::Xz => &[0xfd, b'7', b'z', b'X', b'Z', 0x00],
            Self::Bzip2 => b"BZh",
            Self::Zstd => &[0x28, 0xb5, 0x2f, 0xfd],
            Self::Plain => &[],
        }
    }
}

/// What an extraction produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub directories: usize,
    pub files: usize,
    pub skipped: usize,
}

/// Extract `archive` into `dest`, creating `dest` if needed.
///
/// Entries are processed in archive order. On failure the entries already
/// written are left in place.
pub fn extract(archive: &Path, dest: &Path) -> Result<ExtractSummary, AcquireError> {
    let name = archive
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let format = ArchiveFormat::detect(&name);

    let file = File::open(archive).map_err(|e| extraction_error(archive, e))?;
    let mut reader = BufReader::new(file);
    check_magic(&mut reader, format, archive)?;

    std::fs::create_dir_all(dest).map_err(|e| {
        extraction_error(archive, format!("cannot create {}: {}", dest.display(), e))
    })?;

    match format {
        ArchiveFormat::Gzip => unpack(flate2::read::GzDecoder::new(reader), format, archive, dest),
        ArchiveFormat::Xz => unpack(xz2::read::XzDecoder::new(reader), format, archive, dest),
        ArchiveFormat::Bzip2 => unpack(bzip2::read::BzDecoder::new(reader), format, archive, dest),
        ArchiveFormat::Zstd => {
            let decoder = zstd::stream::read::Decoder::with_buffer(reader).map_err(|e| {
                AcquireError::UnsupportedFormat {
                    path: archive.to_path_buf(),
                    reason: format!("zstd init error: {}", e),
                }
            })?;
            unpack(decoder, format, archive, dest)
        }
        ArchiveFormat::Plain => unpack(reader, format, archive, dest),
    }
}

/// Extract into `<src>/<stem>` through a staging directory, so the final
/// directory only ever holds a complete tree. A previous extraction of the
/// same archive is replaced.
pub fn unpack_source(
    archive: &Path,
    layout: &StorageLayout,
    show_progress: bool,
) -> Result<PathBuf, AcquireError> {
    layout::ensure_dir(layout.src_dir())?;
    let final_dir = layout.source_dir(archive);
    let stem = final_dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "source".to_string());

    let staging = tempfile::Builder::new()
        .prefix(&format!(".{}_", stem))
        .tempdir_in(layout.src_dir())
        .map_err(|e| AcquireError::StorageUnavailable {
            path: layout.src_dir().to_path_buf(),
            reason: format!("cannot create staging directory: {}", e),
        })?;

    let pb = if show_progress {
        progress::create_spinner(&format!("extracting {}", stem))
    } else {
        progress::hidden()
    };
    let summary = {
        let _guard = progress::ProgressGuard::new(&pb);
        extract(archive, staging.path())?
    };

    if final_dir.exists() {
        std::fs::remove_dir_all(&final_dir)?;
    }
    std::fs::rename(staging.path(), &final_dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&final_dir, std::fs::Permissions::from_mode(0o755))?;
    }

    if show_progress {
        output::detail(&format!(
            "extracted {} files, {} directories to {}",
            summary.files,
            summary.directories,
            final_dir.display()
        ));
    }
    Ok(final_dir)
}

fn extraction_error(archive: &Path, message: impl ToString) -> AcquireError {
    AcquireError::Extraction {
        path: archive.to_path_buf(),
        message: message.to_string(),
    }
}

fn check_magic(
    reader: &mut BufReader<File>,
    format: ArchiveFormat,
    archive: &Path,
) -> Result<(), AcquireError> {
    let magic = format.magic();
    if magic.is_empty() {
        return Ok(());
    }
    let head = reader.fill_buf().map_err(|e| extraction_error(archive, e))?;
    if !head.starts_with(magic) {
        return Err(AcquireError::UnsupportedFormat {
            path: archive.to_path_buf(),
            reason: format!("not a {:?} stream", format).to_lowercase(),
        });
    }
    Ok(())
}

/// A compressed stream that fails before yielding its first entry has a
/// bad header past the magic bytes and is reported as `UnsupportedFormat`;
/// later failures are `Extraction`.
fn unpack<R: Read>(
    reader: R,
    format: ArchiveFormat,
    archive: &Path,
    dest: &Path,
) -> Result<ExtractSummary, AcquireError> {
    let mut tar = tar::Archive::new(reader);
    let mut summary = ExtractSummary::default();
    let mut seen_entry = false;

    let read_error = |seen_entry: bool, e: std::io::Error| {
        if !seen_entry && format != ArchiveFormat::Plain {
            AcquireError::UnsupportedFormat {
                path: archive.to_path_buf(),
                reason: format!("corrupt {:?} stream: {}", format, e).to_lowercase(),
            }
        } else {
            extraction_error(archive, format!("tar entry error: {}", e))
        }
    };

    let entries = tar.entries().map_err(|e| read_error(seen_entry, e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| read_error(seen_entry, e))?;
        seen_entry = true;
        let path = entry
            .path()
            .map_err(|e| extraction_error(archive, format!("tar path error: {}", e)))?
            .into_owned();

        if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(extraction_error(
                archive,
                format!("unsafe path: {}", path.display()),
            ));
        }
        // Some archives contain a "." entry; treat it as a no-op.
        if path.as_os_str().is_empty() || path == Path::new(".") {
            continue;
        }

        let target = dest.join(&path);
        ensure_no_symlink_components(dest, &target, archive)?;

        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| {
                extraction_error(archive, format!("cannot create {}: {}", target.display(), e))
            })?;
            summary.directories += 1;
        } else if entry_type.is_file() {
            write_file(&mut entry, &target, archive)?;
            summary.files += 1;
        } else {
            output::warning(&format!(
                "skipping unsupported entry {} ({:?})",
                path.display(),
                entry_type
            ));
            summary.skipped += 1;
        }
    }

    Ok(summary)
}

fn write_file<R: Read>(
    entry: &mut tar::Entry<'_, R>,
    target: &Path,
    archive: &Path,
) -> Result<(), AcquireError> {
    let fail = |what: &str, e: std::io::Error| {
        extraction_error(archive, format!("{} {}: {}", what, target.display(), e))
    };

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| fail("cannot create parent of", e))?;
    }

    let size = entry.header().size().map_err(|e| fail("bad size for", e))?;
    let mut file = File::create(target).map_err(|e| fail("cannot create", e))?;
    let copied = std::io::copy(&mut entry.take(size), &mut file).map_err(|e| fail("write error for", e))?;
    if copied != size {
        return Err(extraction_error(
            archive,
            format!(
                "truncated entry {}: expected {} bytes, got {}",
                target.display(),
                size,
                copied
            ),
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = entry.header().mode().map_err(|e| fail("bad mode for", e))?;
        std::fs::set_permissions(target, std::fs::Permissions::from_mode(mode & 0o7777))
            .map_err(|e| fail("cannot chmod", e))?;
    }

    Ok(())
}

/// Writing through a symlink already present under `dest` could escape it.
fn ensure_no_symlink_components(
    dest: &Path,
    target: &Path,
    archive: &Path,
) -> Result<(), AcquireError> {
    let Ok(rel) = target.strip_prefix(dest) else {
        return Err(extraction_error(
            archive,
            format!("path outside destination: {}", target.display()),
        ));
    };

    let mut current = dest.to_path_buf();
    for component in rel.components() {
        current.push(component);
        let is_symlink = std::fs::symlink_metadata(&current)
            .map(|md| md.file_type().is_symlink())
            .unwrap_or(false);
        if is_symlink {
            return Err(extraction_error(
                archive,
                format!("symlink in path component: {}", current.display()),
            ));
        }
    }

    Ok(())
}
