//! Candidate locations, highest priority first.

use std::path::{Path, PathBuf};

use super::Probe;

/// Property files relative to the ramdisk root.
pub const RAMDISK_PROP_LOCATIONS: &[&str] = &[
    "default.prop",
    "prop.default",
    "system/build.prop",
    "vendor/build.prop",
    "system/etc/build.prop",
    "vendor/etc/build.prop",
];

/// Property files relative to a dump directory above the ramdisk.
///
/// These cover full firmware dumps where the ramdisk was extracted next to
/// the system, vendor and sub-image trees.
pub const DUMP_PROP_LOCATIONS: &[&str] = &[
    "system/system/build.prop",
    "system/build.prop",
    "vendor/build.prop",
    "vendor_boot/ramdisk/default.prop",
    "vendor_boot/ramdisk/prop.default",
    "vendor_boot/ramdisk/build.prop",
    "vendor_boot/ramdisk/system/build.prop",
    "vendor_boot/ramdisk/vendor/build.prop",
    "system/etc/build.prop",
    "vendor/etc/build.prop",
    "product/build.prop",
    "system_ext/build.prop",
    "odm/build.prop",
    "boot/ramdisk/default.prop",
    "boot/ramdisk/prop.default",
    "recovery/ramdisk/default.prop",
    "recovery/ramdisk/prop.default",
];

/// How many directories above the ramdisk are treated as dump roots.
pub const DUMP_SEARCH_DEPTH: usize = 3;

/// Recovery fstab locations relative to the ramdisk root. There is no
/// fallback beyond this list.
pub const FSTAB_LOCATIONS: &[&str] = &[
    "etc/recovery.fstab",
    "system/etc/recovery.fstab",
    "vendor/etc/recovery.fstab",
];

/// Directories scanned for init scripts, relative to the ramdisk root.
pub const INIT_RC_LOCATIONS: &[&str] = &["", "system/etc/init", "vendor/etc/init"];

/// Property file candidates for `ramdisk`, in priority order.
///
/// Dump directories are checked for existence only when the iterator
/// reaches them.
pub fn property_candidates<'a, P>(
    probe: &'a P,
    ramdisk: &'a Path,
) -> impl Iterator<Item = PathBuf> + 'a
where
    P: Probe + ?Sized,
{
    let in_ramdisk = RAMDISK_PROP_LOCATIONS
        .iter()
        .map(move |rel| ramdisk.join(rel));

    let in_dumps = ramdisk
        .ancestors()
        .skip(1)
        .take(DUMP_SEARCH_DEPTH)
        .filter(move |dir| probe.is_dir(dir))
        .flat_map(|dir| DUMP_PROP_LOCATIONS.iter().map(move |rel| dir.join(rel)));

    in_ramdisk.chain(in_dumps)
}

/// Recovery fstab candidates for `ramdisk`, in priority order.
pub fn fstab_candidates(ramdisk: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    FSTAB_LOCATIONS.iter().map(move |rel| ramdisk.join(rel))
}
