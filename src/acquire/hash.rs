//! SHA-1 helpers.

use crate::error::AcquireError;
use sha1::{Digest, Sha1};
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 8 * 1024;

/// Lowercase hex SHA-1 of `bytes`.
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Lowercase hex SHA-1 of the file at `path`, read in chunks.
pub fn file_checksum(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hex digests compare case-insensitively, ignoring surrounding whitespace.
pub fn checksums_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}

/// Fail with ChecksumMismatch unless `actual` matches `expected`.
pub fn verify(expected: &str, actual: &str) -> Result<(), AcquireError> {
    if checksums_match(expected, actual) {
        Ok(())
    } else {
        Err(AcquireError::ChecksumMismatch {
            expected: expected.trim().to_lowercase(),
            actual: actual.to_lowercase(),
        })
    }
}
