//! Materialize a [`DeviceTree`] as a build-ready directory.
//!
//! Output lives at `<output>/<manufacturer>/<codename>` and is recreated from
//! scratch on every run:
//!
//! ```text
//! Android.bp  Android.mk  AndroidProducts.mk  BoardConfig.mk  device.mk
//! extract-files.sh  omni_<codename>.mk  README.md  setup-makefiles.sh
//! vendorsetup.sh  recovery.fstab
//! prebuilt/{kernel,dt.img,dtb.img,dtbo.img}
//! recovery/root/*.rc
//! ```

pub mod filesystem;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{IoResultExt, Result};
use crate::snapshot::SnapshotRecorder;
use crate::templates::{RenderContext, Template};
use crate::tree::DeviceTree;

use filesystem::{copy_file, create_dirs, recreate_dir, set_mode, SCRIPT_MODE};

pub const PREBUILT_DIR: &str = "prebuilt";
pub const RECOVERY_ROOT_DIR: &str = "recovery/root";
pub const RECOVERY_FSTAB: &str = "recovery.fstab";

/// Version stamped into generated headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `<output_root>/<manufacturer>/<codename>`
pub fn tree_path(tree: &DeviceTree, output_root: &Path) -> PathBuf {
    output_root
        .join(&tree.device.manufacturer)
        .join(&tree.device.codename)
}

/// Assemble with the current year in license headers.
pub fn assemble(
    tree: &DeviceTree,
    output_root: &Path,
    snapshot: Option<&SnapshotRecorder>,
) -> Result<PathBuf> {
    Assembler::new(current_year()).run(tree, output_root, snapshot)
}

pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

#[derive(Debug, Clone)]
pub struct Assembler {
    year: i32,
    version: String,
}

impl Assembler {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            version: VERSION.to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Write the tree and return its path.
    ///
    /// Any error leaves the directory partially populated.
    pub fn run(
        &self,
        tree: &DeviceTree,
        output_root: &Path,
        snapshot: Option<&SnapshotRecorder>,
    ) -> Result<PathBuf> {
        let final_path = tree_path(tree, output_root);
        let ctx = RenderContext {
            year: self.year,
            device: &tree.device,
            fstab: &tree.fstab,
            image: &tree.image,
            version: &self.version,
        };

        info!("Creating device tree folders...");
        recreate_dir(&final_path)?;
        create_dirs(&final_path, &[PREBUILT_DIR, RECOVERY_ROOT_DIR])?;

        info!("Writing makefiles/blueprints");
        for template in Template::TREE_FILES {
            let Some(path) = template.write_to(&final_path, &ctx)? else {
                continue;
            };
            if template.is_script() {
                set_mode(&path, SCRIPT_MODE)?;
            }
        }

        info!("Copying kernel...");
        copy_prebuilts(tree, &final_path.join(PREBUILT_DIR))?;

        info!("Copying fstab...");
        let fstab = final_path.join(RECOVERY_FSTAB);
        fs::write(&fstab, tree.fstab.format_recovery()).fs_context("writing", &fstab)?;

        info!("Copying init scripts...");
        let root = final_path.join(RECOVERY_ROOT_DIR);
        for script in tree.scripts.iter() {
            let Some(name) = script.file_name() else {
                continue;
            };
            copy_file(script, &root.join(name))?;
        }
        debug!("Copied {} init script(s)", tree.scripts.len());

        if let Some(recorder) = snapshot {
            let message = Template::CommitMessage.render(&ctx);
            recorder.record(&final_path, &message)?;
        }

        Ok(final_path)
    }
}

fn copy_prebuilts(tree: &DeviceTree, prebuilt: &Path) -> Result<()> {
    let image = &tree.image;
    let blobs = [
        (image.kernel.as_deref(), "kernel"),
        (image.dt.as_deref(), "dt.img"),
        (image.dtb.as_deref(), "dtb.img"),
        (image.dtbo.as_deref(), "dtbo.img"),
    ];
    for (src, name) in blobs {
        match src {
            Some(src) => copy_file(src, &prebuilt.join(name))?,
            None => debug!("No {name} in image, skipping"),
        }
    }
    Ok(())
}
