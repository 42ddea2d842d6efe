//! gig: a source package manager driven by tunefiles
//!
//! A tunefile is a small parenthesized program that describes one package.
//! Evaluating it in a bootstrapped [`manifest::Env`] fills in a
//! [`manifest::Descriptor`]; the descriptor's source archive is then
//! downloaded and checked by [`acquire`], and unpacked by [`extract`].
//!
//! # Example Tunefile
//!
//! ```text
//! ; zlib.tune
//! (name "zlib")
//! (version "1.3.1")
//! (description "compression library")
//! (license "Zlib")
//! (url (str "https://zlib.net/zlib-" pkg-version ".tar.gz"))
//! (checksum "f535367b1a11e2f9ac3bec723fb007fbc0d189e5")
//! (depends-on "make" "gcc")
//! (install (fn () (shell "make" "install")))
//! ```
//!
//! # Bootstrap Forms
//!
//! ## Descriptor
//! - `name`, `version`, `description`, `license`, `homepage`, `url`,
//!   `checksum` (alias `sha1`): set the field; read back as `pkg-<field>`
//! - `depends-on`: replace the dependency list
//! - `install`: set the install callable
//!
//! ## Utilities
//! - `list`, `str`, `disp`, `==`, `!=`, `not`, `error`
//! - `cd`, `set-env`, `shell`, `get-platform`: act on the Env's
//!   [`manifest::ProcessContext`], never on the process itself
//!
//! ## Special Forms
//! - `var`, `set`, `fn`, `func`, `if`, `do`, `and`, `or`
//!
//! # Storage
//!
//! Archives are kept under `<prefix>/archives/` and extracted to
//! `<prefix>/src/<stem>/`; see [`layout`] and [`config`].

pub mod acquire;
pub mod ast;
pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod manifest;
pub mod output;
pub mod parser;
pub mod search;

pub use acquire::{FetchOptions, Fetcher, SourceTree};
pub use config::Config;
pub use error::{AcquireError, ConfigError, LookupError, ManifestError};
pub use layout::StorageLayout;
pub use manifest::{Descriptor, Env, ProcessContext};
