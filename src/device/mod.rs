//! Device metadata derived from the discovered property file.
//!
//! - [`props`] - property file parsing
//! - [`fstab`] - partition table model and recovery formatting

pub mod fstab;
pub mod props;

use std::fmt;

use tracing::warn;

use crate::error::{Error, Result};

pub use fstab::{Fstab, FstabEntry};
pub use props::PropertySet;

/// Partitions whose `ro.product.<partition>.*` variants are consulted after
/// the bare key.
const PROP_PARTITIONS: &[&str] = &["vendor", "odm", "product", "system", "system_ext"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Arm64,
    Arm,
    X86_64,
    X86,
}

impl Arch {
    fn from_abi(abi: &str) -> Option<Self> {
        match abi {
            "arm64-v8a" => Some(Arch::Arm64),
            "armeabi-v7a" | "armeabi" => Some(Arch::Arm),
            "x86_64" => Some(Arch::X86_64),
            "x86" => Some(Arch::X86),
            _ => None,
        }
    }

    /// Value of `TARGET_ARCH`.
    pub fn target_arch(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64",
            Arch::Arm => "arm",
            Arch::X86_64 => "x86_64",
            Arch::X86 => "x86",
        }
    }

    /// Value of `TARGET_ARCH_VARIANT`.
    pub fn arch_variant(self) -> &'static str {
        match self {
            Arch::Arm64 => "armv8-a",
            Arch::Arm => "armv7-a-neon",
            Arch::X86_64 => "x86_64",
            Arch::X86 => "x86",
        }
    }

    /// Value of `TARGET_CPU_ABI`.
    pub fn cpu_abi(self) -> &'static str {
        match self {
            Arch::Arm64 => "arm64-v8a",
            Arch::Arm => "armeabi-v7a",
            Arch::X86_64 => "x86_64",
            Arch::X86 => "x86",
        }
    }

    /// Secondary arch for 64-bit targets that also run 32-bit code.
    pub fn secondary(self) -> Option<Arch> {
        match self {
            Arch::Arm64 => Some(Arch::Arm),
            Arch::X86_64 => Some(Arch::X86),
            Arch::Arm | Arch::X86 => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target_arch())
    }
}

/// Identity and build metadata of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub codename: String,
    pub manufacturer: String,
    pub brand: String,
    pub model: String,
    pub platform: Option<String>,
    pub arch: Arch,
    pub is_ab: bool,
    pub sdk_version: Option<u32>,
    pub screen_density: Option<u32>,
    pub fingerprint: Option<String>,
}

impl DeviceInfo {
    pub fn from_props(props: &PropertySet) -> Result<Self> {
        let codename = lookup_product(props, "device")
            .or_else(|| props.get("ro.build.product"))
            .ok_or_else(|| missing(props, "ro.product.device"))?
            .to_string();
        let manufacturer = lookup_product(props, "manufacturer")
            .and_then(|m| m.split_whitespace().next())
            .ok_or_else(|| missing(props, "ro.product.manufacturer"))?
            .to_ascii_lowercase();
        check_dir_name("codename", &codename)?;
        check_dir_name("manufacturer", &manufacturer)?;

        let brand = lookup_product(props, "brand")
            .map(str::to_string)
            .unwrap_or_else(|| manufacturer.clone());
        let model = lookup_product(props, "model")
            .map(str::to_string)
            .unwrap_or_else(|| codename.clone());

        let abi = lookup_product(props, "cpu.abi").or_else(|| {
            lookup_product(props, "cpu.abilist").and_then(|l| l.split(',').next())
        });
        let arch = match abi.map(|a| (a, Arch::from_abi(a))) {
            Some((_, Some(arch))) => arch,
            Some((other, None)) => {
                warn!("Unknown CPU ABI '{}', assuming arm64", other);
                Arch::Arm64
            }
            None => {
                warn!("No CPU ABI property, assuming arm64");
                Arch::Arm64
            }
        };

        Ok(Self {
            codename,
            manufacturer,
            brand,
            model,
            platform: props
                .get("ro.board.platform")
                .or_else(|| props.get("ro.hardware.platform"))
                .map(str::to_string),
            arch,
            is_ab: props.get("ro.build.ab_update") == Some("true"),
            sdk_version: lookup_build(props, "version.sdk").and_then(|v| v.parse().ok()),
            screen_density: props.get("ro.sf.lcd_density").and_then(|v| v.parse().ok()),
            fingerprint: lookup_build(props, "fingerprint").map(str::to_string),
        })
    }
}

/// `ro.product.<field>`, then `ro.product.<partition>.<field>`.
fn lookup_product<'a>(props: &'a PropertySet, field: &str) -> Option<&'a str> {
    lookup_qualified(props, "ro.product", field)
}

/// `ro.build.<field>`, then `ro.<partition>.build.<field>`.
fn lookup_build<'a>(props: &'a PropertySet, field: &str) -> Option<&'a str> {
    props
        .get(&format!("ro.build.{field}"))
        .filter(|v| !v.is_empty())
        .or_else(|| {
            PROP_PARTITIONS
                .iter()
                .filter_map(|p| props.get(&format!("ro.{p}.build.{field}")))
                .find(|v| !v.is_empty())
        })
}

fn lookup_qualified<'a>(props: &'a PropertySet, prefix: &str, field: &str) -> Option<&'a str> {
    std::iter::once(format!("{prefix}.{field}"))
        .chain(PROP_PARTITIONS.iter().map(|p| format!("{prefix}.{p}.{field}")))
        .filter_map(|key| props.get(&key))
        .find(|v| !v.is_empty())
}

fn missing(props: &PropertySet, key: &str) -> Error {
    Error::MissingProperty {
        key: key.to_string(),
        source_file: props.source().to_path_buf(),
    }
}

fn check_dir_name(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\', '\0']) {
        return Err(Error::InvalidDeviceName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
