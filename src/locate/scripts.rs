//! Init script collection.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::candidates::INIT_RC_LOCATIONS;
use crate::error::{IoResultExt, Result};

/// Suffix of init scripts.
pub const INIT_RC_SUFFIX: &str = ".rc";

/// The primary init script, never copied into the device tree.
pub const RESERVED_INIT_RC: &str = "init.rc";

/// Init scripts found in the ramdisk, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSet {
    scripts: BTreeSet<PathBuf>,
}

impl ScriptSet {
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.scripts.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl FromIterator<PathBuf> for ScriptSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            scripts: iter.into_iter().collect(),
        }
    }
}

fn is_init_script(name: &str) -> bool {
    name.ends_with(INIT_RC_SUFFIX) && name != RESERVED_INIT_RC
}

/// Collect init scripts from the ramdisk root and the system/vendor init dirs.
///
/// Regular files and symlinks qualify; missing directories are skipped.
pub fn collect_init_scripts(ramdisk: &Path) -> Result<ScriptSet> {
    let mut scripts = BTreeSet::new();

    for rel in INIT_RC_LOCATIONS {
        let dir = ramdisk.join(rel);
        if !dir.is_dir() {
            continue;
        }

        let entries = fs::read_dir(&dir).fs_context("reading init script dir", &dir)?;
        for entry in entries {
            let entry = entry.fs_context("reading directory entry in", &dir)?;
            let path = entry.path();
            let file_type = entry
                .file_type()
                .fs_context("reading file type for", &path)?;
            if file_type.is_dir() {
                continue;
            }
            if is_init_script(&entry.file_name().to_string_lossy()) {
                scripts.insert(path);
            }
        }
    }

    debug!("Found {} init scripts", scripts.len());
    Ok(ScriptSet { scripts })
}
