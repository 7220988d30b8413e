//! Rendered device tree files.
//!
//! Every file shares one [`RenderContext`]. Bodies are plain text with
//! `{{ name }}` placeholders; optional sections are assembled in Rust before
//! substitution.
//!
//! - [`build`] - blueprints and makefiles
//! - [`scripts`] - extraction and lunch helper scripts
//! - [`docs`] - README and commit message

mod build;
mod docs;
mod scripts;

use std::fs;
use std::path::{Path, PathBuf};

use crate::device::{DeviceInfo, Fstab};
use crate::error::{IoResultExt, Result};
use crate::image::ImageInfo;

/// Everything a template may refer to.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub year: i32,
    pub device: &'a DeviceInfo,
    pub fstab: &'a Fstab,
    pub image: &'a ImageInfo,
    pub version: &'a str,
}

impl RenderContext<'_> {
    fn vars(&self) -> Vec<(&'static str, String)> {
        let d = self.device;
        vec![
            ("year", self.year.to_string()),
            ("version", self.version.to_string()),
            ("codename", d.codename.clone()),
            ("manufacturer", d.manufacturer.clone()),
            ("manufacturer_upper", d.manufacturer.to_ascii_uppercase()),
            ("brand", d.brand.clone()),
            ("model", d.model.clone()),
            ("arch", d.arch.to_string()),
            ("platform", d.platform.clone().unwrap_or_default()),
        ]
    }

    /// Replace `{{ name }}` placeholders with context values.
    pub fn fill(&self, template: &str) -> String {
        let mut out = template.to_string();
        for (name, value) in self.vars() {
            out = out.replace(&format!("{{{{ {name} }}}}"), &value);
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    AndroidBp,
    AndroidMk,
    AndroidProductsMk,
    BoardConfigMk,
    DeviceMk,
    ExtractFiles,
    OmniDevice,
    Readme,
    SetupMakefiles,
    VendorSetup,
    CommitMessage,
}

impl Template {
    /// Files written into every device tree, in write order.
    pub const TREE_FILES: [Template; 10] = [
        Template::AndroidBp,
        Template::AndroidMk,
        Template::AndroidProductsMk,
        Template::BoardConfigMk,
        Template::DeviceMk,
        Template::ExtractFiles,
        Template::OmniDevice,
        Template::Readme,
        Template::SetupMakefiles,
        Template::VendorSetup,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Template::AndroidBp => "Android.bp",
            Template::AndroidMk => "Android.mk",
            Template::AndroidProductsMk => "AndroidProducts.mk",
            Template::BoardConfigMk => "BoardConfig.mk",
            Template::DeviceMk => "device.mk",
            Template::ExtractFiles => "extract-files.sh",
            Template::OmniDevice => "omni_device.mk",
            Template::Readme => "README.md",
            Template::SetupMakefiles => "setup-makefiles.sh",
            Template::VendorSetup => "vendorsetup.sh",
            Template::CommitMessage => "commit_message",
        }
    }

    /// File name inside the tree, `None` for text-only templates.
    pub fn output_name(self, codename: &str) -> Option<String> {
        match self {
            Template::OmniDevice => Some(format!("omni_{codename}.mk")),
            Template::CommitMessage => None,
            other => Some(other.name().to_string()),
        }
    }

    /// Whether the file must be executable.
    pub fn is_script(self) -> bool {
        matches!(self, Template::ExtractFiles | Template::SetupMakefiles)
    }

    fn comment_prefix(self) -> Option<&'static str> {
        match self {
            Template::AndroidBp => Some("//"),
            Template::Readme | Template::CommitMessage => None,
            _ => Some("#"),
        }
    }

    fn body(self, ctx: &RenderContext<'_>) -> String {
        match self {
            Template::AndroidBp => build::android_bp(),
            Template::AndroidMk => build::android_mk(),
            Template::AndroidProductsMk => build::android_products_mk(),
            Template::BoardConfigMk => build::board_config_mk(ctx),
            Template::DeviceMk => build::device_mk(ctx),
            Template::OmniDevice => build::omni_device_mk(ctx),
            Template::ExtractFiles => scripts::extract_files_sh(),
            Template::SetupMakefiles => scripts::setup_makefiles_sh(),
            Template::VendorSetup => scripts::vendorsetup_sh(),
            Template::Readme => docs::readme_md(ctx),
            Template::CommitMessage => docs::commit_message(ctx),
        }
    }

    /// Render to text, license header included.
    pub fn render(self, ctx: &RenderContext<'_>) -> String {
        let body = ctx.fill(&self.body(ctx));
        let Some(prefix) = self.comment_prefix() else {
            return body;
        };
        let header = license_header(prefix, ctx);
        // a shebang has to stay on the first line
        match body.strip_prefix("#!").and_then(|rest| rest.split_once('\n')) {
            Some((interpreter, rest)) => format!("#!{interpreter}\n{header}{rest}"),
            None => format!("{header}{body}"),
        }
    }

    /// Render into `dir` and return the written path.
    pub fn write_to(self, dir: &Path, ctx: &RenderContext<'_>) -> Result<Option<PathBuf>> {
        let Some(name) = self.output_name(&ctx.device.codename) else {
            return Ok(None);
        };
        let path = dir.join(name);
        fs::write(&path, self.render(ctx)).fs_context("writing", &path)?;
        Ok(Some(path))
    }
}

fn license_header(prefix: &str, ctx: &RenderContext<'_>) -> String {
    format!(
        "{p}\n\
         {p} Copyright (C) {year} The Android Open Source Project\n\
         {p}\n\
         {p} SPDX-License-Identifier: Apache-2.0\n\
         {p}\n\
         {p} This file was automatically generated by recovery-dtgen {version}\n\
         {p}\n\n",
        p = prefix,
        year = ctx.year,
        version = ctx.version,
    )
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::device::{DeviceInfo, Fstab, PropertySet};
    use crate::image::ImageInfo;

    pub fn device() -> DeviceInfo {
        let props = PropertySet::parse(
            "ro.product.device=sunny\n\
             ro.product.manufacturer=Xiaomi\n\
             ro.product.brand=Redmi\n\
             ro.product.model=Redmi Note 10\n\
             ro.product.cpu.abi=arm64-v8a\n\
             ro.board.platform=bengal\n\
             ro.build.ab_update=true\n\
             ro.build.version.sdk=30\n\
             ro.sf.lcd_density=440\n\
             ro.build.fingerprint=Redmi/sunny/sunny:11/RKQ1/V12:user/release-keys\n",
        );
        DeviceInfo::from_props(&props).unwrap()
    }

    pub fn fstab() -> Fstab {
        Fstab::parse(
            "system  /system  ext4  ro  wait,slotselect,logical\n\
             vendor  /vendor  ext4  ro  wait,slotselect,logical\n\
             /dev/block/by-name/userdata  /data  f2fs  noatime  wait,check\n",
        )
    }

    pub fn image() -> ImageInfo {
        let mut image = ImageInfo::default();
        image.header.base_address = Some("0x00000000".into());
        image.header.pagesize = Some("4096".into());
        image.header.cmdline = Some("console=ttyMSM0,115200n8 androidboot.hardware=qcom".into());
        image.header.header_version = Some("3".into());
        image.header.os_patch_level = Some("2021-05".into());
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_ctx<T>(f: impl FnOnce(&RenderContext<'_>) -> T) -> T {
        let device = fixtures::device();
        let fstab = fixtures::fstab();
        let image = fixtures::image();
        let ctx = RenderContext {
            year: 2024,
            device: &device,
            fstab: &fstab,
            image: &image,
            version: "0.1.0",
        };
        f(&ctx)
    }

    #[test]
    fn test_no_placeholder_left() {
        with_ctx(|ctx| {
            for template in Template::TREE_FILES.iter().chain([&Template::CommitMessage]) {
                let text = template.render(ctx);
                assert!(!text.contains("{{"), "{} left a placeholder", template.name());
            }
        });
    }

    #[test]
    fn test_header_prefixes() {
        with_ctx(|ctx| {
            assert!(Template::AndroidBp.render(ctx).starts_with("//\n// Copyright (C) 2024"));
            assert!(Template::BoardConfigMk.render(ctx).starts_with("#\n# Copyright (C) 2024"));
            assert!(Template::Readme.render(ctx).starts_with("# Device tree for"));
        });
    }

    #[test]
    fn test_shebang_stays_first() {
        with_ctx(|ctx| {
            let script = Template::ExtractFiles.render(ctx);
            let mut lines = script.lines();
            assert_eq!(lines.next(), Some("#!/bin/bash"));
            assert_eq!(lines.next(), Some("#"));
            assert!(script.contains("DEVICE=sunny"));
        });
    }

    #[test]
    fn test_omni_output_name() {
        assert_eq!(
            Template::OmniDevice.output_name("sunny").as_deref(),
            Some("omni_sunny.mk")
        );
        assert_eq!(Template::CommitMessage.output_name("sunny"), None);
    }

    #[test]
    fn test_write_to() {
        let temp = TempDir::new().unwrap();
        with_ctx(|ctx| {
            let path = Template::OmniDevice.write_to(temp.path(), ctx).unwrap().unwrap();
            assert_eq!(path, temp.path().join("omni_sunny.mk"));
            assert!(fs::read_to_string(&path).unwrap().contains("PRODUCT_NAME := omni_sunny"));
            assert!(Template::CommitMessage.write_to(temp.path(), ctx).unwrap().is_none());
        });
    }
}
