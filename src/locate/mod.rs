//! Artifact discovery inside an unpacked ramdisk.
//!
//! Device configuration lives at different depths depending on the image
//! generation and on how the dump was produced. Each artifact category has a
//! priority-ordered candidate list; candidates are checked lazily and the
//! first existing file wins. Nothing is read until a match is chosen.
//!
//! - [`candidates`] - candidate lists for property files and recovery fstabs
//! - [`scripts`] - init script collection

pub mod candidates;
pub mod scripts;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

pub use scripts::{collect_init_scripts, ScriptSet};

/// Filesystem existence checks used by the locator.
///
/// Kept behind a trait so discovery can be observed without touching
/// the real filesystem semantics.
pub trait Probe {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Probe backed by `std::fs` metadata calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl Probe for FsProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Artifact categories with a single mandatory source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    PropertyFile,
    PartitionTable,
}

impl ArtifactKind {
    /// Convert a failed search into the category-specific error.
    pub fn not_found(self, attempted: Vec<PathBuf>) -> Error {
        match self {
            ArtifactKind::PropertyFile => Error::PropertyFileNotFound { attempted },
            ArtifactKind::PartitionTable => Error::PartitionTableNotFound { attempted },
        }
    }
}

/// Outcome of a first-match search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found(PathBuf),
    NotFound { attempted: Vec<PathBuf> },
}

impl Located {
    /// Turn a miss into an error carrying the attempted locations.
    pub fn require(self, kind: ArtifactKind) -> Result<PathBuf> {
        match self {
            Located::Found(path) => Ok(path),
            Located::NotFound { attempted } => {
                debug!("Searched locations for {:?}:", kind);
                for location in &attempted {
                    let marker = if location.exists() { "EXISTS" } else { "NOT FOUND" };
                    debug!("  - {} ({})", location.display(), marker);
                }
                Err(kind.not_found(attempted))
            }
        }
    }
}

/// Return the first candidate that is an existing file.
///
/// Candidates after the match are never produced, so any lazy work in the
/// iterator (such as parent directory checks) stops with it.
pub fn first_existing<P, I>(probe: &P, candidates: I) -> Located
where
    P: Probe + ?Sized,
    I: IntoIterator<Item = PathBuf>,
{
    let mut attempted = Vec::new();
    for candidate in candidates {
        if probe.is_file(&candidate) {
            return Located::Found(candidate);
        }
        attempted.push(candidate);
    }
    Located::NotFound { attempted }
}

/// Locate the property file for a ramdisk root.
pub fn locate_property_file<P: Probe + ?Sized>(probe: &P, ramdisk: &Path) -> Located {
    let (located, probed) =
        first_existing_counted(probe, candidates::property_candidates(probe, ramdisk));
    match &located {
        Located::Found(path) => debug!(
            "Loading build.prop from {} ({} candidates probed)",
            path.display(),
            probed
        ),
        Located::NotFound { .. } => debug!("No build.prop in {} locations", probed),
    }
    located
}

/// [`first_existing`] plus the number of candidates checked.
fn first_existing_counted<P, I>(probe: &P, candidates: I) -> (Located, usize)
where
    P: Probe + ?Sized,
    I: IntoIterator<Item = PathBuf>,
{
    let mut probed = 0;
    let located = first_existing(probe, candidates.into_iter().inspect(|_| probed += 1));
    (located, probed)
}

/// Locate the recovery fstab for a ramdisk root.
pub fn locate_partition_table<P: Probe + ?Sized>(probe: &P, ramdisk: &Path) -> Located {
    first_existing(probe, candidates::fstab_candidates(ramdisk))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Probe that records every path it was asked about.
    #[derive(Default)]
    pub struct RecordingProbe {
        pub files: RefCell<Vec<PathBuf>>,
        pub dirs: RefCell<Vec<PathBuf>>,
    }

    impl Probe for RecordingProbe {
        fn is_file(&self, path: &Path) -> bool {
            self.files.borrow_mut().push(path.to_path_buf());
            path.is_file()
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.borrow_mut().push(path.to_path_buf());
            path.is_dir()
        }
    }
}
