//! The device tree aggregate: everything discovered about one image.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::device::{DeviceInfo, Fstab, PropertySet};
use crate::error::{IoResultExt, Result};
use crate::image::ImageInfo;
use crate::locate::{self, ArtifactKind, FsProbe, Probe, ScriptSet};

/// Discovered sources for one generation run.
///
/// Built once per image. Construction fails before anything is written if
/// either the property file or the recovery fstab cannot be found, so a
/// `DeviceTree` always has both.
#[derive(Debug, Clone)]
pub struct DeviceTree {
    pub image_path: PathBuf,
    pub image: ImageInfo,
    pub ramdisk: PathBuf,
    pub props: PropertySet,
    pub device: DeviceInfo,
    pub fstab_source: PathBuf,
    pub fstab: Fstab,
    pub scripts: ScriptSet,
}

impl DeviceTree {
    pub fn new(image_path: &Path, image: ImageInfo) -> Result<Self> {
        Self::with_probe(&FsProbe, image_path, image)
    }

    pub fn with_probe<P: Probe + ?Sized>(
        probe: &P,
        image_path: &Path,
        image: ImageInfo,
    ) -> Result<Self> {
        // parent directories of a relative path run out early
        let ramdisk = image.ramdisk_root(image_path)?;
        let ramdisk = std::path::absolute(ramdisk).fs_context("resolving ramdisk path", ramdisk)?;

        info!("Getting device infos...");
        let prop_file = locate::locate_property_file(probe, &ramdisk)
            .require(ArtifactKind::PropertyFile)?;
        let props = PropertySet::load(&prop_file)?;
        let device = DeviceInfo::from_props(&props)?;
        info!("Device: {}/{}", device.manufacturer, device.codename);

        let fstab_source = locate::locate_partition_table(probe, &ramdisk)
            .require(ArtifactKind::PartitionTable)?;
        debug!("Generating fstab using {} as reference...", fstab_source.display());
        let fstab = Fstab::load(&fstab_source)?;

        let scripts = locate::collect_init_scripts(&ramdisk)?;

        Ok(Self {
            image_path: image_path.to_path_buf(),
            image,
            ramdisk,
            props,
            device,
            fstab_source,
            fstab,
            scripts,
        })
    }
}
