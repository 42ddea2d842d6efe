//! Shared helpers for gig integration tests.

#![allow(dead_code)]

mod fixtures;

pub use fixtures::*;

use gig::manifest::{Env, ProcessContext};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One member of a generated tar archive.
pub enum Member<'a> {
    Dir(&'a str),
    File(&'a str, u32, &'a [u8]),
}

/// Build an uncompressed tar from `members`, in order.
pub fn tar(members: &[Member<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for member in members {
        let mut header = tar::Header::new_gnu();
        match member {
            Member::Dir(path) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                header.set_cksum();
                builder
                    .append_data(&mut header, path, std::io::empty())
                    .unwrap();
            }
            Member::File(path, mode, content) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(*mode);
                header.set_size(content.len() as u64);
                header.set_cksum();
                builder.append_data(&mut header, path, *content).unwrap();
            }
        }
    }
    builder.into_inner().unwrap()
}

/// Build a gzip-compressed tar from `members`.
pub fn tar_gz(members: &[Member<'_>]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&tar(members)).unwrap();
    encoder.finish().unwrap()
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    gig::acquire::hash::sha1_hex(bytes)
}

/// A bootstrapped Env that does not echo `disp` output.
pub fn quiet_env(cwd: &Path) -> Env {
    Env::bootstrapped(ProcessContext::new(cwd).quiet())
}

pub fn write_tune(dir: &Path, name: &str, content: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}.tune", name));
    std::fs::write(&path, content).unwrap();
    path
}
