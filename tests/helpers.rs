//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A firmware dump with an Android Image Kitchen work dir inside it.
///
/// ```text
/// <temp>/dump/
///     vendor_boot/ramdisk/...     sub-image trees
///     aik/split_img/              boot header values and blobs
///     aik/ramdisk/                primary ramdisk (optional)
///     aik/vendor_ramdisk/         vendor ramdisk (optional)
/// <temp>/out/                     output root
/// ```
pub struct DumpEnv {
    pub _temp_dir: TempDir,
    pub dump: PathBuf,
    pub workdir: PathBuf,
    pub output: PathBuf,
}

impl DumpEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dump = temp_dir.path().join("dump");
        let workdir = dump.join("aik");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(workdir.join("split_img")).expect("Failed to create split_img");

        Self {
            _temp_dir: temp_dir,
            dump,
            workdir,
            output,
        }
    }

    pub fn vendor_ramdisk(&self) -> PathBuf {
        self.workdir.join("vendor_ramdisk")
    }

    pub fn ramdisk(&self) -> PathBuf {
        self.workdir.join("ramdisk")
    }

    /// Write a file below the dump root, creating parents.
    pub fn dump_file(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.dump.join(rel), content)
    }

    /// Write `split_img/boot.img-<key>`.
    pub fn split_img(&self, key: &str, content: &[u8]) -> PathBuf {
        let path = self.workdir.join("split_img").join(format!("boot.img-{key}"));
        fs::write(&path, content).expect("Failed to write split_img file");
        path
    }

    pub fn config_file(&self, content: &str) -> PathBuf {
        write_file(&self._temp_dir.path().join("config.toml"), content)
    }
}

pub fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}

pub const VENDOR_BOOT_PROPS: &str = "\
# vendor_boot properties
ro.product.vendor.device=sunny
ro.product.vendor.manufacturer=Xiaomi
ro.product.vendor.brand=Redmi
ro.product.vendor.model=Redmi Note 10
ro.product.cpu.abilist=arm64-v8a,armeabi-v7a,armeabi
ro.board.platform=bengal
ro.build.ab_update=true
ro.build.version.sdk=30
";

pub const VENDOR_FSTAB: &str = "\
# Android fstab file.
system   /system   ext4   ro,barrier=1   wait,slotselect,avb=vbmeta_system,logical,first_stage_mount
vendor   /vendor   ext4   ro,barrier=1   wait,slotselect,avb,logical,first_stage_mount
/dev/block/bootdevice/by-name/userdata   /data   f2fs   noatime,nosuid   latemount,wait,check,fileencryption=ice
/dev/block/zram0   none   swap   defaults   zramsize=50%
";
