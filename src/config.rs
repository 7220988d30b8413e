//! Optional TOML configuration.
//!
//! ```toml
//! output_dir = "output"
//!
//! [unpack]
//! aik_dir = "/opt/AIK-Linux"
//!
//! [snapshot]
//! enabled = true
//! fallback_name = "recovery-dtgen"
//! fallback_email = "recovery-dtgen@localhost"
//! ```
//!
//! Relative paths inside a file are resolved against the file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, IoResultExt, Result};
use crate::snapshot::{Identity, SnapshotRecorder};

pub const CONFIG_DIR_NAME: &str = "recovery-dtgen";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    output_dir: Option<PathBuf>,
    unpack: Option<UnpackToml>,
    snapshot: Option<SnapshotToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnpackToml {
    aik_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotToml {
    enabled: Option<bool>,
    fallback_name: Option<String>,
    fallback_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output_dir: PathBuf,
    pub aik_dir: Option<PathBuf>,
    pub snapshot: bool,
    pub fallback_identity: Identity,
    /// File the values came from, `None` for built-in defaults.
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            aik_dir: None,
            snapshot: false,
            fallback_identity: Identity::default(),
            source: None,
        }
    }
}

impl Config {
    /// `explicit` must exist; otherwise the per-user file is used when
    /// present, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).fs_context("reading config", path)?;
        let mut config = Self::parse(&text, path)?;
        let base = path.parent().unwrap_or(Path::new(""));
        config.output_dir = base.join(&config.output_dir);
        config.aik_dir = config.aik_dir.map(|dir| base.join(dir));
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse `text`; `path` is only used in error messages and as `source`.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };
        let parsed: ConfigToml = toml::from_str(text).map_err(|e| invalid(e.to_string()))?;

        let defaults = Identity::default();
        let snapshot = parsed.snapshot.unwrap_or(SnapshotToml {
            enabled: None,
            fallback_name: None,
            fallback_email: None,
        });
        let fallback_identity = Identity {
            name: non_empty("snapshot.fallback_name", snapshot.fallback_name)
                .map_err(invalid)?
                .unwrap_or(defaults.name),
            email: non_empty("snapshot.fallback_email", snapshot.fallback_email)
                .map_err(invalid)?
                .unwrap_or(defaults.email),
        };

        Ok(Self {
            output_dir: parsed
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            aik_dir: parsed.unpack.and_then(|u| u.aik_dir),
            snapshot: snapshot.enabled.unwrap_or(false),
            fallback_identity,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn recorder(&self) -> SnapshotRecorder {
        SnapshotRecorder::new(self.fallback_identity.clone())
    }
}

/// `$XDG_CONFIG_HOME/recovery-dtgen/config.toml` or the platform equivalent.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_empty(
    key: &str,
    value: Option<String>,
) -> std::result::Result<Option<String>, String> {
    match value {
        Some(v) if v.trim().is_empty() => Err(format!("{key} must not be empty")),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}
