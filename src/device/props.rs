//! `build.prop`-style property files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result};

/// Properties parsed from exactly one file.
///
/// Keys keep the order in which they first appeared; a repeated key
/// replaces the earlier value in place.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    source: PathBuf,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PropertySet {
    /// Parse a property file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).fs_context("reading property file", path)?;
        let mut props = Self::parse(&content);
        props.source = path.to_path_buf();
        Ok(props)
    }

    /// Parse property text. Comments, blank lines, `import` directives and
    /// lines without `=` are ignored.
    pub fn parse(content: &str) -> Self {
        let mut props = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("import ") {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            props.insert(key, value.trim());
        }
        props
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 = value.to_string(),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), value.to_string()));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    /// The file these properties were loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
