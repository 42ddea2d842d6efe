//! gig configuration
//!
//! Read from TOML, looked up in this order:
//!
//! 1. an explicit path (`gig --config`)
//! 2. `$GIG_CONFIG`
//! 3. `<config_dir>/gig/gig.toml`, if it exists
//!
//! Missing keys take defaults. `$GIG_PREFIX` overrides `core.prefixdir`.

use crate::acquire::{DEFAULT_BUFFER_SIZE, DEFAULT_TIMEOUT_SECS, FetchOptions};
use crate::error::ConfigError;
use crate::layout::{DEFAULT_ARCHIVES_DIR, DEFAULT_SRC_DIR, StorageLayout};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "GIG_CONFIG";
pub const PREFIX_ENV: &str = "GIG_PREFIX";
const DEFAULT_TUNES_DIR: &str = "tunes";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct GigToml {
    core: Option<CoreToml>,
    layout: Option<LayoutToml>,
    fetch: Option<FetchToml>,
    tunes: Option<TunesToml>,
    bootstrap: Option<BootstrapToml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct CoreToml {
    prefixdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct LayoutToml {
    archives: Option<PathBuf>,
    src: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct FetchToml {
    buffer_size: Option<usize>,
    timeout_secs: Option<u64>,
    deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct TunesToml {
    paths: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct BootstrapToml {
    files: Option<Vec<PathBuf>>,
}

/// Resolved configuration. Relative paths are already joined onto the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prefix: PathBuf,
    pub archives_dir: PathBuf,
    pub src_dir: PathBuf,
    pub buffer_size: usize,
    pub timeout: Duration,
    pub deadline: Option<Duration>,
    pub tune_paths: Vec<PathBuf>,
    pub bootstrap_files: Vec<PathBuf>,
    /// The file this was read from, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load using the process environment for lookup and overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let env_config = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let env_prefix = std::env::var_os(PREFIX_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let user_config = dirs::config_dir()
            .map(|d| d.join("gig").join("gig.toml"))
            .filter(|p| p.is_file());

        let path = explicit.map(Path::to_path_buf).or(env_config).or(user_config);
        let raw = match &path {
            Some(path) => read_toml(path)?,
            None => GigToml::default(),
        };
        let default_prefix = dirs::data_dir().map(|d| d.join("gig"));
        Self::resolve(raw, path, env_prefix, default_prefix)
    }

    /// Parse `text` as a config file, with no environment overrides.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw = toml::from_str::<GigToml>(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source,
        })?;
        Self::resolve(raw, None, None, dirs::data_dir().map(|d| d.join("gig")))
    }

    fn resolve(
        raw: GigToml,
        source: Option<PathBuf>,
        prefix_override: Option<PathBuf>,
        default_prefix: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let core = raw.core.unwrap_or_default();
        let layout = raw.layout.unwrap_or_default();
        let fetch = raw.fetch.unwrap_or_default();
        let tunes = raw.tunes.unwrap_or_default();
        let bootstrap = raw.bootstrap.unwrap_or_default();

        let prefix = prefix_override
            .or(core.prefixdir)
            .or(default_prefix)
            .ok_or(ConfigError::NoPrefix)?;

        let under_prefix = |p: PathBuf| prefix.join(p);
        let archives_dir =
            under_prefix(layout.archives.unwrap_or_else(|| DEFAULT_ARCHIVES_DIR.into()));
        let src_dir = under_prefix(layout.src.unwrap_or_else(|| DEFAULT_SRC_DIR.into()));
        let tune_paths = tunes
            .paths
            .unwrap_or_else(|| vec![DEFAULT_TUNES_DIR.into()])
            .into_iter()
            .map(under_prefix)
            .collect();
        let bootstrap_files = bootstrap
            .files
            .unwrap_or_default()
            .into_iter()
            .map(under_prefix)
            .collect();

        Ok(Self {
            archives_dir,
            src_dir,
            buffer_size: fetch.buffer_size.filter(|&n| n > 0).unwrap_or(DEFAULT_BUFFER_SIZE),
            timeout: Duration::from_secs(fetch.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            deadline: fetch
                .deadline_secs
                .filter(|&s| s > 0)
                .map(Duration::from_secs),
            tune_paths,
            bootstrap_files,
            source,
            prefix,
        })
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout::with_dirs(&self.prefix, &self.archives_dir, &self.src_dir)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            buffer_size: self.buffer_size,
            timeout: self.timeout,
            deadline: self.deadline,
            ..FetchOptions::default()
        }
    }
}

fn read_toml(path: &Path) -> Result<GigToml, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<GigToml>(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
