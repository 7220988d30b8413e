//! Android Image Kitchen integration.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{ImageInfo, Unpacker};
use crate::error::{Error, IoResultExt, Result};
use crate::preflight::check_required_tools;

const UNPACK_SCRIPT: &str = "unpackimg.sh";
const CLEANUP_SCRIPT: &str = "cleanup.sh";

/// Host tools the kitchen scripts call.
pub const AIK_HOST_TOOLS: &[(&str, &str)] = &[("bash", "bash"), ("cpio", "cpio")];

/// Runs the kitchen's unpack script against an image file.
#[derive(Debug, Clone)]
pub struct Aik {
    dir: PathBuf,
}

impl Aik {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn run_script(&self, script: &str, args: &[&std::ffi::OsStr]) -> Result<()> {
        let output = Command::new("bash")
            .arg(script)
            .args(args)
            .current_dir(&self.dir)
            .output()
            .fs_context(format!("running {script} in"), &self.dir)?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::Unpack {
            image: self.dir.join(script),
            reason: format!(
                "exit code {}: {}\n{}",
                output.status.code().unwrap_or(-1),
                stdout.trim(),
                stderr.trim()
            ),
        })
    }
}

impl Unpacker for Aik {
    fn unpack(&self, image: &Path) -> Result<ImageInfo> {
        if !self.dir.join(UNPACK_SCRIPT).is_file() {
            return Err(Error::Unpack {
                image: image.to_path_buf(),
                reason: format!("{} not found in '{}'", UNPACK_SCRIPT, self.dir.display()),
            });
        }
        check_required_tools(AIK_HOST_TOOLS).map_err(|e| Error::Unpack {
            image: image.to_path_buf(),
            reason: e.to_string(),
        })?;

        let image = fs::canonicalize(image).fs_context("resolving image path", image)?;
        info!("Extracting {}", image.display());
        self.run_script(UNPACK_SCRIPT, &["--nosudo".as_ref(), image.as_os_str()])
            .map_err(|e| match e {
                Error::Unpack { reason, .. } => Error::Unpack {
                    image: image.clone(),
                    reason,
                },
                other => other,
            })?;

        ImageInfo::from_workdir(&self.dir)
    }

    fn cleanup(&self) -> Result<()> {
        if !self.dir.join(CLEANUP_SCRIPT).is_file() {
            return Ok(());
        }
        debug!("Cleaning up {}", self.dir.display());
        self.run_script(CLEANUP_SCRIPT, &["--quiet".as_ref()])
    }
}

/// An image that was already unpacked into a kitchen-style work directory.
#[derive(Debug, Clone)]
pub struct Extracted {
    dir: PathBuf,
}

impl Extracted {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Unpacker for Extracted {
    fn unpack(&self, _image: &Path) -> Result<ImageInfo> {
        ImageInfo::from_workdir(&self.dir)
    }

    fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}

/// Choose an unpacker for `input`.
///
/// Directories are read as already-extracted work directories; files need a
/// kitchen checkout.
pub fn open_image(input: &Path, aik_dir: Option<&Path>) -> Result<Box<dyn Unpacker>> {
    if input.is_dir() {
        let dir = std::path::absolute(input).fs_context("resolving work directory", input)?;
        return Ok(Box::new(Extracted::new(dir)));
    }
    if !input.is_file() {
        return Err(Error::InputNotFound {
            path: input.to_path_buf(),
        });
    }
    match aik_dir {
        Some(dir) => {
            let dir = std::path::absolute(dir).fs_context("resolving kitchen directory", dir)?;
            Ok(Box::new(Aik::new(dir)))
        }
        None => Err(Error::Unpack {
            image: input.to_path_buf(),
            reason: "no Android Image Kitchen directory configured (use --aik or [unpack] aik_dir)"
                .to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_input() {
        let temp = TempDir::new().unwrap();
        let err = open_image(&temp.path().join("boot.img"), None).err().unwrap();
        assert!(matches!(err, Error::InputNotFound { .. }));
    }

    #[test]
    fn test_file_without_kitchen() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("recovery.img");
        fs::write(&image, b"ANDROID!").unwrap();

        let err = open_image(&image, None).err().unwrap();
        assert!(matches!(err, Error::Unpack { .. }));
    }

    #[test]
    fn test_directory_is_extracted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("ramdisk")).unwrap();

        let unpacker = open_image(temp.path(), None).unwrap();
        let info = unpacker.unpack(temp.path()).unwrap();
        assert_eq!(info.ramdisk, Some(temp.path().join("ramdisk")));
        unpacker.cleanup().unwrap();
    }

    #[test]
    fn test_kitchen_without_script() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("boot.img");
        fs::write(&image, b"ANDROID!").unwrap();

        let err = Aik::new(temp.path().join("aik")).unpack(&image).unwrap_err();
        assert!(err.to_string().contains(UNPACK_SCRIPT));
    }

    #[test]
    fn test_kitchen_script_runs_in_its_dir() {
        if !crate::preflight::command_exists("bash") || !crate::preflight::command_exists("cpio") {
            return;
        }
        let temp = TempDir::new().unwrap();
        let aik = temp.path().join("aik");
        fs::create_dir_all(&aik).unwrap();
        fs::write(
            aik.join(UNPACK_SCRIPT),
            "mkdir -p split_img ramdisk\n\
             printf '4096' > \"split_img/$(basename \"$2\")-pagesize\"\n",
        )
        .unwrap();
        let image = temp.path().join("boot.img");
        fs::write(&image, b"ANDROID!").unwrap();

        let info = Aik::new(&aik).unpack(&image).unwrap();
        assert_eq!(info.header.pagesize.as_deref(), Some("4096"));
        assert_eq!(info.ramdisk, Some(aik.join("ramdisk")));
    }
}
