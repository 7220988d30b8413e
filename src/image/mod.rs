//! Unpacked boot/recovery image artifacts.
//!
//! Unpacking itself is delegated to Android Image Kitchen. This module reads
//! its work directory layout:
//!
//! ```text
//! <workdir>/
//!     split_img/<image>-kernel, -dtb, -dtbo, -base, -cmdline, ...
//!     ramdisk/
//!     vendor_ramdisk/
//! ```

pub mod aik;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, IoResultExt, Result};

pub use aik::{open_image, Aik, Extracted};

/// Turns an image into its extracted artifacts.
pub trait Unpacker {
    fn unpack(&self, image: &Path) -> Result<ImageInfo>;

    /// Remove anything `unpack` left behind.
    fn cleanup(&self) -> Result<()>;
}

/// Boot image header values, as reported by the unpacker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootHeader {
    pub base_address: Option<String>,
    pub board_name: Option<String>,
    pub cmdline: Option<String>,
    pub header_version: Option<String>,
    pub pagesize: Option<String>,
    pub kernel_offset: Option<String>,
    pub ramdisk_offset: Option<String>,
    pub second_offset: Option<String>,
    pub tags_offset: Option<String>,
    pub dtb_offset: Option<String>,
    pub image_type: Option<String>,
    pub ramdisk_compression: Option<String>,
    pub os_version: Option<String>,
    pub os_patch_level: Option<String>,
}

/// Artifacts extracted from one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInfo {
    pub kernel: Option<PathBuf>,
    pub dt: Option<PathBuf>,
    pub dtb: Option<PathBuf>,
    pub dtbo: Option<PathBuf>,
    pub ramdisk: Option<PathBuf>,
    pub vendor_ramdisk: Option<PathBuf>,
    pub header: BootHeader,
}

impl ImageInfo {
    /// Read an Android Image Kitchen work directory.
    pub fn from_workdir(workdir: &Path) -> Result<Self> {
        let split_img = workdir.join("split_img");
        let files = split_img_files(&split_img)?;
        let blob = |keys: &[&str]| keys.iter().find_map(|k| files.get(*k).cloned());
        let text = |key: &str| -> Result<Option<String>> {
            match files.get(key) {
                Some(path) => {
                    let raw = fs::read_to_string(path).fs_context("reading image header value", path)?;
                    Ok(Some(raw.trim().to_string()).filter(|v| !v.is_empty()))
                }
                None => Ok(None),
            }
        };

        let header = BootHeader {
            base_address: text("base")?,
            board_name: text("board")?,
            cmdline: text("cmdline")?,
            header_version: text("header_version")?,
            pagesize: text("pagesize")?,
            kernel_offset: text("kernel_offset")?,
            ramdisk_offset: text("ramdisk_offset")?,
            second_offset: text("second_offset")?,
            tags_offset: text("tags_offset")?,
            dtb_offset: text("dtb_offset")?,
            image_type: text("imgtype")?,
            ramdisk_compression: text("ramdiskcomp")?,
            os_version: text("os_version")?,
            os_patch_level: text("os_patch_level")?,
        };

        let dir_if_present = |name: &str| Some(workdir.join(name)).filter(|p| p.is_dir());

        Ok(Self {
            kernel: blob(&["kernel", "zImage"]),
            dt: blob(&["dt"]),
            dtb: blob(&["dtb"]),
            dtbo: blob(&["dtbo", "recovery_dtbo"]),
            ramdisk: dir_if_present("ramdisk"),
            vendor_ramdisk: dir_if_present("vendor_ramdisk"),
            header,
        })
    }

    /// Pick the ramdisk to search: the primary one, else the vendor one.
    pub fn ramdisk_root(&self, image: &Path) -> Result<&Path> {
        if let Some(ramdisk) = self.ramdisk.as_deref().filter(|p| p.is_dir()) {
            debug!("Using standard ramdisk");
            return Ok(ramdisk);
        }
        if let Some(ramdisk) = self.vendor_ramdisk.as_deref().filter(|p| p.is_dir()) {
            debug!("Using vendor_ramdisk (vendor_boot v4 detected)");
            return Ok(ramdisk);
        }
        Err(Error::NoRamdiskFound {
            image: image.to_path_buf(),
        })
    }
}

/// Map `split_img/<image>-<key>` files by key.
fn split_img_files(split_img: &Path) -> Result<HashMap<String, PathBuf>> {
    let mut files = HashMap::new();
    if !split_img.is_dir() {
        return Ok(files);
    }
    for entry in fs::read_dir(split_img).fs_context("reading split_img", split_img)? {
        let entry = entry.fs_context("reading directory entry in", split_img)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some((_, key)) = name.to_str().and_then(|n| n.rsplit_once('-')) else {
            continue;
        };
        files.insert(key.to_string(), path);
    }
    Ok(files)
}
