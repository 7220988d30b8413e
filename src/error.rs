//! Error types for device tree generation.
//!
//! Every failure in the pipeline is terminal for the run. The only variant
//! callers are expected to recover from is [`Error::VcsIdentityUnavailable`],
//! which triggers the fallback commit identity.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("input image not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("no valid ramdisk found in '{}' (neither ramdisk nor vendor_ramdisk)", .image.display())]
    NoRamdiskFound { image: PathBuf },

    #[error(
        "no property file found in any of the {} searched locations:\n{}",
        .attempted.len(),
        list_paths(.attempted)
    )]
    PropertyFileNotFound { attempted: Vec<PathBuf> },

    #[error(
        "no recovery fstab found in any of the {} searched locations:\n{}",
        .attempted.len(),
        list_paths(.attempted)
    )]
    PartitionTableNotFound { attempted: Vec<PathBuf> },

    #[error("property '{key}' is not set in '{}'", .source_file.display())]
    MissingProperty { key: String, source_file: PathBuf },

    #[error("{field} '{value}' cannot be used as a directory name")]
    InvalidDeviceName { field: &'static str, value: String },

    #[error("{action} '{}': {source}", .path.display())]
    Filesystem {
        action: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unpacking '{}' failed: {reason}", .image.display())]
    Unpack { image: PathBuf, reason: String },

    #[error("git {command} failed in '{}': {reason}", .repo.display())]
    Vcs {
        command: String,
        repo: PathBuf,
        reason: String,
    },

    #[error("git identity is not configured ({missing})")]
    VcsIdentityUnavailable { missing: &'static str },

    #[error("missing required host tools:\n{tools}")]
    MissingHostTools { tools: String },

    #[error("invalid config '{}': {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Attach the failed action and path to an I/O error.
pub trait IoResultExt<T> {
    fn fs_context(self, action: impl Into<String>, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn fs_context(self, action: impl Into<String>, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Filesystem {
            action: action.into(),
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_every_attempt() {
        let err = Error::PropertyFileNotFound {
            attempted: vec![PathBuf::from("/r/default.prop"), PathBuf::from("/r/prop.default")],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 searched locations"));
        assert!(msg.contains("  - /r/default.prop"));
        assert!(msg.contains("  - /r/prop.default"));
    }

    #[test]
    fn test_fs_context_keeps_path() {
        let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = res.fs_context("copying kernel", Path::new("/tmp/k")).unwrap_err();
        assert_eq!(err.to_string(), "copying kernel '/tmp/k': gone");
    }
}
