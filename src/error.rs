//! Error types for manifest evaluation, acquisition and configuration.

use crate::parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while evaluating a tunefile.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("'{0}' is not callable")]
    NotCallable(String),

    #[error("type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("'{form}' requires at least {min} argument(s)")]
    MissingArgument { form: String, min: usize },

    #[error("'{form}' takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        form: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid '{form}' form: {reason}")]
    InvalidForm { form: String, reason: String },

    #[error("command failed: {command}: {message}")]
    Execution { command: String, message: String },

    #[error("{0}")]
    User(String),

    #[error("evaluation nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while fetching, verifying or extracting a source archive.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("descriptor is missing required field '{0}'")]
    IncompleteDescriptor(&'static str),

    #[error("storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported archive format for {path}: {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("download of {url} was cancelled")]
    Cancelled { url: String },

    #[error("download of {url} exceeded its deadline")]
    DeadlineExceeded { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading the gig configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot determine a default prefix directory")]
    NoPrefix,
}

/// Errors raised while locating a tunefile by name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("invalid tune name '{0}': only alphanumeric characters, '_', '-' and '.' are allowed")]
    InvalidName(String),

    #[error("tune not found: {name} (searched {searched})")]
    NotFound { name: String, searched: String },
}
