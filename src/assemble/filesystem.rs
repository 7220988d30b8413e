//! Filesystem helpers for laying out the device tree.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tracing::debug;

use crate::error::{IoResultExt, Result};

/// Owner read/write/execute, group and other read.
pub const SCRIPT_MODE: u32 = 0o744;

/// Delete `path` if it exists and create it empty.
///
/// Nothing from a previous run survives, including a `.git` directory.
pub fn recreate_dir(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            debug!("Removing existing {}", path.display());
            fs::remove_dir_all(path).fs_context("removing existing device tree", path)?;
        }
        Ok(_) => {
            fs::remove_file(path).fs_context("removing existing device tree", path)?;
        }
        Err(_) => {}
    }
    fs::create_dir_all(path).fs_context("creating device tree directory", path)
}

/// Create each of `dirs` below `root`.
pub fn create_dirs(root: &Path, dirs: &[&str]) -> Result<()> {
    for dir in dirs {
        let path = root.join(dir);
        fs::create_dir_all(&path).fs_context("creating", &path)?;
    }
    Ok(())
}

pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mut perms = fs::metadata(path)
        .fs_context("reading metadata", path)?
        .permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms).fs_context("setting permissions", path)
}

/// Copy file content, following symlinks at `src`.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).fs_context(format!("copying to '{}' from", dst.display()), src)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_recreate_drops_old_content() {
        let temp = TempDir::new().unwrap();
        let tree = temp.path().join("xiaomi/sunny");
        fs::create_dir_all(tree.join(".git")).unwrap();
        fs::write(tree.join("stale.mk"), "").unwrap();

        recreate_dir(&tree).unwrap();
        assert!(tree.is_dir());
        assert_eq!(fs::read_dir(&tree).unwrap().count(), 0);
    }

    #[test]
    fn test_recreate_replaces_file() {
        let temp = TempDir::new().unwrap();
        let tree = temp.path().join("sunny");
        fs::write(&tree, "not a dir").unwrap();

        recreate_dir(&tree).unwrap();
        assert!(tree.is_dir());
    }

    #[test]
    fn test_copy_follows_symlink() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("init.target.rc");
        let link = temp.path().join("init.link.rc");
        fs::write(&target, "on boot\n").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let dst = temp.path().join("copy.rc");
        copy_file(&link, &dst).unwrap();
        assert!(!fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "on boot\n");
    }

    #[test]
    fn test_script_mode() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("extract-files.sh");
        fs::write(&script, "#!/bin/bash\n").unwrap();

        set_mode(&script, SCRIPT_MODE).unwrap();
        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o744);
    }
}
