//! Package metadata produced by evaluating a tunefile.

use super::Env;
use super::value::{Callable, Value};
use crate::error::{AcquireError, ManifestError};

/// Storage bindings are the field name with this prefix, e.g. `pkg-url`.
pub const FIELD_PREFIX: &str = "pkg-";

/// Descriptor fields holding a single string.
pub const STRING_FIELDS: [&str; 7] = [
    "name",
    "version",
    "description",
    "license",
    "homepage",
    "url",
    "checksum",
];

pub const DEPENDENCIES_FIELD: &str = "dependencies";
pub const INSTALL_FIELD: &str = "install";

/// Name of the binding that stores `field`.
pub fn storage_name(field: &str) -> String {
    format!("{}{}", FIELD_PREFIX, field)
}

#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,
    pub homepage: Option<String>,
    pub url: String,
    /// Expected SHA-1 of the source archive, in hex.
    pub checksum: String,
    pub dependencies: Vec<String>,
    pub install: Callable,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: String::new(),
            description: String::new(),
            license: String::new(),
            homepage: None,
            url: String::new(),
            checksum: String::new(),
            dependencies: Vec::new(),
            install: Callable::noop(INSTALL_FIELD),
        }
    }
}

impl Descriptor {
    /// Read every `pkg-` binding out of `env`.
    pub fn from_env(env: &Env) -> Result<Self, ManifestError> {
        let text = |field: &str| env.get_string(&storage_name(field));

        let version_name = storage_name("version");
        let version = match env.get(&version_name)? {
            Value::String(s) => s,
            number @ Value::Number(_) => number.to_string(),
            other => return Err(other.mismatch(&version_name, "string")),
        };

        let homepage = text("homepage")?;
        let install_name = storage_name(INSTALL_FIELD);
        let install = match env.get(&install_name)? {
            Value::Callable(callable) => callable,
            other => return Err(other.mismatch(&install_name, "callable")),
        };

        Ok(Self {
            name: text("name")?,
            version,
            description: text("description")?,
            license: text("license")?,
            homepage: (!homepage.is_empty()).then_some(homepage),
            url: text("url")?,
            checksum: text("checksum")?,
            dependencies: env.get_list(&storage_name(DEPENDENCIES_FIELD))?,
            install,
        })
    }

    /// The url and checksum, or the first of them that is empty.
    pub fn require_source(&self) -> Result<(&str, &str), AcquireError> {
        let url = self.url.trim();
        let checksum = self.checksum.trim();
        if url.is_empty() {
            return Err(AcquireError::IncompleteDescriptor("url"));
        }
        if checksum.is_empty() {
            return Err(AcquireError::IncompleteDescriptor("checksum"));
        }
        Ok((url, checksum))
    }

    /// `name-version`, or just the name when no version was set.
    pub fn display_name(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{}-{}", self.name, self.version)
        }
    }
}
