//! Partition table (fstab) model.
//!
//! Two input layouts are understood:
//! - Android (v2): `<source> <mount_point> <fs_type> <mnt_flags> <fs_mgr_flags>`
//! - Recovery (v1): `<mount_point> <fs_type> <device> [device2] [flags=...]`
//!
//! Output is always the recovery layout.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{IoResultExt, Result};

/// fs_mgr flags that keep their meaning in a recovery fstab.
const RECOVERY_FS_MGR_FLAGS: &[&str] = &["slotselect", "logical"];

/// Filesystem types never written to a recovery fstab.
const SKIPPED_FS_TYPES: &[&str] = &["swap"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Android,
    Recovery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FstabEntry {
    pub source: String,
    pub mount_point: String,
    pub fs_type: String,
    pub mount_flags: Option<String>,
    pub fs_mgr_flags: Vec<String>,
    pub layout: Layout,
}

impl FstabEntry {
    fn parse(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return None;
        }

        // the mount point is the second column in v2 and the first in v1
        let android = tokens[1].starts_with('/') || tokens[1] == "none";
        if android {
            return Some(Self {
                source: tokens[0].to_string(),
                mount_point: tokens[1].to_string(),
                fs_type: tokens[2].to_string(),
                mount_flags: tokens.get(3).map(|s| s.to_string()),
                fs_mgr_flags: tokens
                    .get(4)
                    .map(|s| split_flags(s, ','))
                    .unwrap_or_default(),
                layout: Layout::Android,
            });
        }

        if !tokens[0].starts_with('/') {
            return None;
        }
        // flags may contain quoted spaces, so take the raw remainder
        let fs_mgr_flags = line
            .find("flags=")
            .map(|at| split_flags(line[at + "flags=".len()..].trim(), ';'))
            .unwrap_or_default();
        Some(Self {
            source: tokens[2].to_string(),
            mount_point: tokens[0].to_string(),
            fs_type: tokens[1].to_string(),
            mount_flags: None,
            fs_mgr_flags,
            layout: Layout::Recovery,
        })
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.fs_mgr_flags
            .iter()
            .any(|f| f == flag || f.split('=').next() == Some(flag))
    }

    pub fn is_logical(&self) -> bool {
        self.has_flag("logical")
    }

    /// Mount point as seen by recovery. A v2 `/` root becomes `/system_root`.
    pub fn recovery_mount_point(&self) -> &str {
        if self.layout == Layout::Android && self.mount_point == "/" {
            "/system_root"
        } else {
            &self.mount_point
        }
    }

    fn recovery_flags(&self) -> Vec<&str> {
        match self.layout {
            Layout::Recovery => self.fs_mgr_flags.iter().map(String::as_str).collect(),
            Layout::Android => self
                .fs_mgr_flags
                .iter()
                .map(String::as_str)
                .filter(|f| RECOVERY_FS_MGR_FLAGS.contains(f))
                .collect(),
        }
    }

    fn in_recovery(&self) -> bool {
        self.mount_point.starts_with('/') && !SKIPPED_FS_TYPES.contains(&self.fs_type.as_str())
    }
}

fn split_flags(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "defaults")
        .map(str::to_string)
        .collect()
}

/// Structured mount entries from one fstab file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fstab {
    entries: Vec<FstabEntry>,
}

impl Fstab {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).fs_context("reading fstab", path)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match FstabEntry::parse(line) {
                Some(entry) => entries.push(entry),
                None => warn!("Skipping malformed fstab line {}: {}", n + 1, line),
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[FstabEntry] {
        &self.entries
    }

    /// Find an entry by its recovery mount point.
    pub fn get(&self, mount_point: &str) -> Option<&FstabEntry> {
        self.entries
            .iter()
            .find(|e| e.recovery_mount_point() == mount_point)
    }

    /// Names of logical (dynamic) partitions, in file order.
    pub fn logical_partitions(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_logical())
            .map(|e| e.recovery_mount_point().trim_start_matches('/'))
            .collect()
    }

    /// Render the table in the recovery layout.
    pub fn format_recovery(&self) -> String {
        let mut out = String::from("# mount point       fstype    device                                                                flags\n");
        for entry in self.entries.iter().filter(|e| e.in_recovery()) {
            let mut line = format!(
                "{:<19} {:<9} {}",
                entry.recovery_mount_point(),
                entry.fs_type,
                entry.source
            );
            let flags = entry.recovery_flags();
            if !flags.is_empty() {
                let pad = 70usize.saturating_sub(entry.source.len()).max(1);
                let _ = write!(line, "{:pad$}flags={}", "", flags.join(";"));
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
