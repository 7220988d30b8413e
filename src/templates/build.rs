//! Blueprint and makefile bodies.

use std::fmt::Write as _;

use super::RenderContext;
use crate::device::Arch;

pub(super) fn android_bp() -> String {
    "soong_namespace {\n}\n".to_string()
}

pub(super) fn android_mk() -> String {
    r#"LOCAL_PATH := $(call my-dir)

ifeq ($(TARGET_DEVICE),{{ codename }})
include $(call all-subdir-makefiles,$(LOCAL_PATH))
endif
"#
    .to_string()
}

pub(super) fn android_products_mk() -> String {
    r#"PRODUCT_MAKEFILES := \
    $(LOCAL_DIR)/omni_{{ codename }}.mk

COMMON_LUNCH_CHOICES := \
    omni_{{ codename }}-user \
    omni_{{ codename }}-userdebug \
    omni_{{ codename }}-eng
"#
    .to_string()
}

/// Partitions whose filesystem type BoardConfig declares, as
/// (mount point, board variable).
const PARTITION_TYPES: &[(&str, &str)] = &[
    ("/system", "BOARD_SYSTEMIMAGE_PARTITION_TYPE"),
    ("/data", "BOARD_USERDATAIMAGE_FILE_SYSTEM_TYPE"),
    ("/vendor", "BOARD_VENDORIMAGE_FILE_SYSTEM_TYPE"),
    ("/product", "BOARD_PRODUCTIMAGE_FILE_SYSTEM_TYPE"),
    ("/system_ext", "BOARD_SYSTEM_EXTIMAGE_FILE_SYSTEM_TYPE"),
    ("/odm", "BOARD_ODMIMAGE_FILE_SYSTEM_TYPE"),
    ("/cache", "BOARD_CACHEIMAGE_FILE_SYSTEM_TYPE"),
];

pub(super) fn board_config_mk(ctx: &RenderContext<'_>) -> String {
    let device = ctx.device;
    let header = &ctx.image.header;
    let mut out = String::from(
        r#"DEVICE_PATH := device/{{ manufacturer }}/{{ codename }}

# For building with minimal manifest
ALLOW_MISSING_DEPENDENCIES := true
"#,
    );

    if device.is_ab {
        out.push_str(
            r#"
# A/B
AB_OTA_UPDATER := true
AB_OTA_PARTITIONS += boot
BOARD_USES_RECOVERY_AS_BOOT := true
TW_INCLUDE_REPACKTOOLS := true
"#,
        );
        for partition in ctx.fstab.logical_partitions() {
            let _ = writeln!(out, "AB_OTA_PARTITIONS += {partition}");
        }
    }

    let arch = device.arch;
    let _ = write!(
        out,
        "
# Architecture
TARGET_ARCH := {}
TARGET_ARCH_VARIANT := {}
TARGET_CPU_ABI := {}
TARGET_CPU_ABI2 :=
TARGET_CPU_VARIANT := generic
",
        arch.target_arch(),
        arch.arch_variant(),
        arch.cpu_abi()
    );
    if let Some(second) = arch.secondary() {
        let _ = write!(
            out,
            "
TARGET_2ND_ARCH := {}
TARGET_2ND_ARCH_VARIANT := {}
TARGET_2ND_CPU_ABI := {}
",
            second.target_arch(),
            second.arch_variant(),
            second.cpu_abi()
        );
        if second == Arch::Arm {
            out.push_str("TARGET_2ND_CPU_ABI2 := armeabi\n");
        }
        out.push_str("TARGET_2ND_CPU_VARIANT := generic\n");
    }

    let board_name = header
        .board_name
        .clone()
        .unwrap_or_else(|| device.codename.clone());
    let _ = write!(
        out,
        "
# Bootloader
TARGET_BOOTLOADER_BOARD_NAME := {board_name}
TARGET_NO_BOOTLOADER := true
"
    );

    if let Some(density) = device.screen_density {
        let _ = write!(out, "\n# Display\nTARGET_SCREEN_DENSITY := {density}\n");
    }

    out.push_str("\n# Kernel\n");
    let kernel_vars = [
        ("BOARD_BOOTIMG_HEADER_VERSION", &header.header_version),
        ("BOARD_KERNEL_BASE", &header.base_address),
        ("BOARD_KERNEL_CMDLINE", &header.cmdline),
        ("BOARD_KERNEL_PAGESIZE", &header.pagesize),
        ("BOARD_KERNEL_OFFSET", &header.kernel_offset),
        ("BOARD_RAMDISK_OFFSET", &header.ramdisk_offset),
        ("BOARD_KERNEL_SECOND_OFFSET", &header.second_offset),
        ("BOARD_KERNEL_TAGS_OFFSET", &header.tags_offset),
        ("BOARD_DTB_OFFSET", &header.dtb_offset),
    ];
    for (name, value) in kernel_vars {
        if let Some(value) = value {
            let _ = writeln!(out, "{name} := {value}");
        }
    }
    let mkbootimg_args = [
        ("--header_version", "BOARD_BOOTIMG_HEADER_VERSION", &header.header_version),
        ("--kernel_offset", "BOARD_KERNEL_OFFSET", &header.kernel_offset),
        ("--ramdisk_offset", "BOARD_RAMDISK_OFFSET", &header.ramdisk_offset),
        ("--tags_offset", "BOARD_KERNEL_TAGS_OFFSET", &header.tags_offset),
        ("--dtb_offset", "BOARD_DTB_OFFSET", &header.dtb_offset),
    ];
    for (flag, name, value) in mkbootimg_args {
        if value.is_some() {
            let _ = writeln!(out, "BOARD_MKBOOTIMG_ARGS += {flag} $({name})");
        }
    }
    out.push_str(
        r#"BOARD_KERNEL_IMAGE_NAME := Image
TARGET_KERNEL_CONFIG := {{ codename }}_defconfig
TARGET_KERNEL_SOURCE := kernel/{{ manufacturer }}/{{ codename }}

# Kernel - prebuilt
TARGET_FORCE_PREBUILT_KERNEL := true
ifeq ($(TARGET_PREBUILT_KERNEL),)
TARGET_PREBUILT_KERNEL := $(DEVICE_PATH)/prebuilt/kernel
"#,
    );
    if ctx.image.dtb.is_some() {
        out.push_str(
            "TARGET_PREBUILT_DTB := $(DEVICE_PATH)/prebuilt/dtb.img\n\
             BOARD_MKBOOTIMG_ARGS += --dtb $(TARGET_PREBUILT_DTB)\n\
             BOARD_INCLUDE_DTB_IN_BOOTIMG := \n",
        );
    }
    if ctx.image.dt.is_some() {
        out.push_str("BOARD_MKBOOTIMG_ARGS += --dt $(DEVICE_PATH)/prebuilt/dt.img\n");
    }
    if ctx.image.dtbo.is_some() {
        out.push_str(
            "BOARD_PREBUILT_DTBOIMAGE := $(DEVICE_PATH)/prebuilt/dtbo.img\n\
             BOARD_KERNEL_SEPARATED_DTBO := \n",
        );
    }
    out.push_str("endif\n");

    out.push_str("\n# Partitions\nBOARD_FLASH_BLOCK_SIZE := 262144 # (BOARD_KERNEL_PAGESIZE * 64)\nBOARD_HAS_LARGE_FILESYSTEM := true\n");
    for (mount_point, name) in PARTITION_TYPES {
        if let Some(entry) = ctx.fstab.get(mount_point) {
            let _ = writeln!(out, "{name} := {}", entry.fs_type);
        }
    }
    if ctx.fstab.get("/vendor").is_some() {
        out.push_str("TARGET_COPY_OUT_VENDOR := vendor\n");
    }

    let logical = ctx.fstab.logical_partitions();
    if !logical.is_empty() {
        let _ = write!(
            out,
            "
# Dynamic partitions
BOARD_SUPER_PARTITION_GROUPS := {{{{ manufacturer }}}}_dynamic_partitions
BOARD_{{{{ manufacturer_upper }}}}_DYNAMIC_PARTITIONS_PARTITION_LIST := {}
# Set to the super partition size minus 4MiB before building
BOARD_{{{{ manufacturer_upper }}}}_DYNAMIC_PARTITIONS_SIZE := 9126805504
",
            logical.join(" ")
        );
    }

    if device.platform.is_some() {
        out.push_str("\n# Platform\nTARGET_BOARD_PLATFORM := {{ platform }}\n");
    }

    let _ = write!(
        out,
        "
# Recovery
TARGET_RECOVERY_FSTAB := $(DEVICE_PATH)/recovery.fstab
TARGET_RECOVERY_PIXEL_FORMAT := RGBX_8888
TARGET_USERIMAGES_USE_EXT4 := true
TARGET_USERIMAGES_USE_F2FS := true

# Security patch level
PLATFORM_SECURITY_PATCH := {}
PLATFORM_VERSION := {}

# TWRP Configuration
TW_THEME := portrait_hdpi
TW_EXTRA_LANGUAGES := true
TW_SCREEN_BLANK_ON_BOOT := true
TW_INPUT_BLACKLIST := \"hbtp_vm\"
TW_USE_TOOLBOX := true
",
        header
            .os_patch_level
            .as_deref()
            .map(|p| if p.len() == 7 { format!("{p}-01") } else { p.to_string() })
            .unwrap_or_else(|| "2099-12-31".to_string()),
        header.os_version.as_deref().unwrap_or("16.1.0"),
    );

    out
}

pub(super) fn device_mk(ctx: &RenderContext<'_>) -> String {
    let mut out = String::from("LOCAL_PATH := device/{{ manufacturer }}/{{ codename }}\n");

    if ctx.device.is_ab {
        out.push_str(
            r#"
# A/B
AB_OTA_POSTINSTALL_CONFIG += \
    RUN_POSTINSTALL_system=true \
    POSTINSTALL_PATH_system=system/bin/otapreopt_script \
    FILESYSTEM_TYPE_system=ext4 \
    POSTINSTALL_OPTIONAL_system=true

# Boot control HAL
PRODUCT_PACKAGES += \
    android.hardware.boot@1.0-impl \
    android.hardware.boot@1.0-service

PRODUCT_PACKAGES += \
    otapreopt_script \
    cppreopts.sh \
    update_engine \
    update_verifier \
    update_engine_sideload
"#,
        );
    }

    if ctx.device.is_ab && ctx.device.platform.is_some() {
        out.push_str(
            r#"
PRODUCT_PACKAGES += \
    bootctrl.{{ platform }}

PRODUCT_STATIC_BOOT_CONTROL_HAL := \
    bootctrl.{{ platform }} \
    libgptutils \
    libz \
    libcutils
"#,
        );
    }

    if !ctx.fstab.logical_partitions().is_empty() {
        out.push_str("\n# Dynamic partitions\nPRODUCT_USE_DYNAMIC_PARTITIONS := true\n");
    }

    if let Some(sdk) = ctx.device.sdk_version {
        let _ = write!(out, "\n# API level\nPRODUCT_SHIPPING_API_LEVEL := {sdk}\n");
    }

    out
}

pub(super) fn omni_device_mk(ctx: &RenderContext<'_>) -> String {
    let mut out = String::from("# Inherit from those products. Most specific first.\n");
    if ctx.device.arch.secondary().is_some() {
        out.push_str("$(call inherit-product, $(SRC_TARGET_DIR)/product/core_64_bit.mk)\n");
    }
    out.push_str(
        r#"$(call inherit-product, $(SRC_TARGET_DIR)/product/full_base_telephony.mk)

# Inherit some common Omni stuff.
$(call inherit-product, vendor/omni/config/common.mk)

# Inherit from {{ codename }} device
$(call inherit-product, device/{{ manufacturer }}/{{ codename }}/device.mk)

PRODUCT_DEVICE := {{ codename }}
PRODUCT_NAME := omni_{{ codename }}
PRODUCT_BRAND := {{ brand }}
PRODUCT_MODEL := {{ model }}
PRODUCT_MANUFACTURER := {{ manufacturer }}

PRODUCT_GMS_CLIENTID_BASE := android-{{ manufacturer }}
"#,
    );
    if let Some(fingerprint) = &ctx.device.fingerprint {
        let _ = write!(out, "\nBUILD_FINGERPRINT := {fingerprint}\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::{fixtures, RenderContext, Template};
    use crate::device::{Arch, Fstab};

    fn render(template: Template, fstab: &Fstab) -> String {
        let device = fixtures::device();
        let mut image = fixtures::image();
        image.dtbo = Some("/x/boot.img-dtbo".into());
        let ctx = RenderContext {
            year: 2024,
            device: &device,
            fstab,
            image: &image,
            version: "0.1.0",
        };
        template.render(&ctx)
    }

    #[test]
    fn test_board_config_sections() {
        let out = render(Template::BoardConfigMk, &fixtures::fstab());

        assert!(out.contains("DEVICE_PATH := device/xiaomi/sunny"));
        assert!(out.contains("AB_OTA_UPDATER := true"));
        assert!(out.contains("AB_OTA_PARTITIONS += system\nAB_OTA_PARTITIONS += vendor\n"));
        assert!(out.contains("TARGET_ARCH := arm64"));
        assert!(out.contains("TARGET_2ND_ARCH := arm"));
        assert!(out.contains("TARGET_SCREEN_DENSITY := 440"));
        assert!(out.contains("BOARD_KERNEL_PAGESIZE := 4096"));
        assert!(out.contains("BOARD_MKBOOTIMG_ARGS += --header_version $(BOARD_BOOTIMG_HEADER_VERSION)"));
        assert!(!out.contains("--tags_offset"));
        assert!(out.contains("BOARD_PREBUILT_DTBOIMAGE := $(DEVICE_PATH)/prebuilt/dtbo.img"));
        assert!(!out.contains("TARGET_PREBUILT_DTB"));
        assert!(out.contains("BOARD_USERDATAIMAGE_FILE_SYSTEM_TYPE := f2fs"));
        assert!(out.contains("BOARD_SUPER_PARTITION_GROUPS := xiaomi_dynamic_partitions"));
        assert!(out.contains("BOARD_XIAOMI_DYNAMIC_PARTITIONS_PARTITION_LIST := system vendor"));
        assert!(out.contains("TARGET_BOARD_PLATFORM := bengal"));
        assert!(out.contains("PLATFORM_SECURITY_PATCH := 2021-05-01"));
        assert!(out.contains("PLATFORM_VERSION := 16.1.0"));
    }

    #[test]
    fn test_board_config_without_dynamic_partitions() {
        let fstab = Fstab::parse("/dev/block/by-name/system /system ext4 ro wait\n");
        let out = render(Template::BoardConfigMk, &fstab);
        assert!(!out.contains("Dynamic partitions"));
        assert!(out.contains("BOARD_SYSTEMIMAGE_PARTITION_TYPE := ext4"));
    }

    #[test]
    fn test_device_mk() {
        let out = render(Template::DeviceMk, &fixtures::fstab());
        assert!(out.contains("bootctrl.bengal"));
        assert!(out.contains("PRODUCT_USE_DYNAMIC_PARTITIONS := true"));
        assert!(out.contains("PRODUCT_SHIPPING_API_LEVEL := 30"));
    }

    #[test]
    fn test_device_mk_without_platform() {
        let mut device = fixtures::device();
        device.platform = None;
        let fstab = fixtures::fstab();
        let image = fixtures::image();
        let ctx = RenderContext {
            year: 2024,
            device: &device,
            fstab: &fstab,
            image: &image,
            version: "0.1.0",
        };
        let out = Template::DeviceMk.render(&ctx);
        assert!(out.contains("android.hardware.boot@1.0-impl"));
        assert!(!out.contains("bootctrl"));
    }

    #[test]
    fn test_second_abi2_only_for_arm() {
        let out = render(Template::BoardConfigMk, &fixtures::fstab());
        assert!(out.contains("TARGET_2ND_CPU_ABI2 := armeabi\nTARGET_2ND_CPU_VARIANT := generic"));

        let mut device = fixtures::device();
        device.arch = Arch::X86_64;
        let fstab = fixtures::fstab();
        let image = fixtures::image();
        let ctx = RenderContext {
            year: 2024,
            device: &device,
            fstab: &fstab,
            image: &image,
            version: "0.1.0",
        };
        let out = Template::BoardConfigMk.render(&ctx);
        assert!(out.contains("TARGET_2ND_ARCH := x86"));
        assert!(!out.contains("TARGET_2ND_CPU_ABI2"));
    }

    #[test]
    fn test_omni_device_mk() {
        let out = render(Template::OmniDevice, &fixtures::fstab());
        assert!(out.contains("core_64_bit.mk"));
        assert!(out.contains("PRODUCT_BRAND := Redmi"));
        assert!(out.contains("PRODUCT_MODEL := Redmi Note 10"));
        assert!(out.contains("BUILD_FINGERPRINT := Redmi/sunny/sunny:11/RKQ1/V12:user/release-keys"));
    }

    #[test]
    fn test_products_mk() {
        let out = render(Template::AndroidProductsMk, &fixtures::fstab());
        assert!(out.contains("$(LOCAL_DIR)/omni_sunny.mk"));
        assert!(out.contains("omni_sunny-eng"));
    }
}
