//! Content digest of an assembled tree.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{IoResultExt, Result};

const VCS_DIR: &str = ".git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path relative to the tree root, `/`-separated.
    pub path: String,
    pub sha256: String,
    pub size: u64,
    pub mode: u32,
}

/// Sorted per-file digests of a tree plus one combined digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeManifest {
    pub root: PathBuf,
    pub entries: Vec<ManifestEntry>,
    pub digest: String,
}

impl TreeManifest {
    /// Walk `root`, skipping any `.git` directory.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != VCS_DIR);
        for entry in walker {
            let entry = entry.map_err(io::Error::from).fs_context("walking", root)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let rel = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            let (sha256, size) = sha256_file(path)?;
            let mode = entry
                .metadata()
                .map_err(io::Error::from)
                .fs_context("reading metadata", path)?
                .permissions()
                .mode()
                & 0o7777;
            entries.push(ManifestEntry {
                path: rel,
                sha256,
                size,
                mode,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let mut hasher = Sha256::new();
        for e in &entries {
            hasher.update(format!("{}\0{}\0{:o}\n", e.path, e.sha256, e.mode));
        }
        Ok(Self {
            root: root.to_path_buf(),
            entries,
            digest: format!("{:x}", hasher.finalize()),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }
}

fn sha256_file(path: &Path) -> Result<(String, u64)> {
    let f = File::open(path).fs_context("opening", path)?;
    let mut r = BufReader::new(f);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut size = 0u64;
    loop {
        let n = r.read(&mut buf).fs_context("reading", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    Ok((format!("{:x}", hasher.finalize()), size))
}
