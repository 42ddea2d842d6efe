//! Sample tunefiles.

#![allow(dead_code)]

/// A complete tune. `{url}` and `{checksum}` are substituted by [`tune`].
pub const ZLIB_TUNE: &str = r#"
; zlib compression library
(name "zlib")
(version "1.3.1")
(description "general purpose compression library")
(license "Zlib")
(homepage "https://zlib.net")
(url "{url}")
(checksum "{checksum}")
(depends-on "make" "gcc")
(install (fn () (disp "installing" pkg-name) pkg-version))
"#;

/// Helpers a bootstrap file might define for every tune.
pub const HELPERS_TUNE: &str = r#"
(func mirror (path) (str "https://mirror.example.org/" path))
(var default-license "MIT")
"#;

/// A tune that builds on [`HELPERS_TUNE`].
pub const HELPED_TUNE: &str = r#"
(name "hello")
(version 2)
(license default-license)
(url (mirror (str pkg-name "-" pkg-version ".tar.gz")))
"#;

pub fn tune(url: &str, checksum: &str) -> String {
    ZLIB_TUNE
        .replace("{url}", url)
        .replace("{checksum}", checksum)
}
