//! Generate a recovery device tree from an Android boot or recovery image.
//!
//! The pipeline is a single synchronous pass:
//!
//! - **Image unpacking** - Android Image Kitchen, or an already-extracted work dir
//! - **Artifact discovery** - property file, recovery fstab and init scripts,
//!   each found by strict first-match over fixed candidate lists
//! - **Device metadata** - codename, manufacturer, arch and friends
//! - **Assembly** - destructive rewrite of `<output>/<manufacturer>/<codename>`
//! - **Snapshot** - optional git commit of the result
//!
//! # Architecture
//!
//! ```text
//! image ──► Unpacker ──► ImageInfo
//!                           │
//!                           ▼
//!               locate::* ──► DeviceTree ──► assemble ──► tree dir
//!                                                 │
//!                                                 └──► SnapshotRecorder
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use recovery_dtgen::{assemble, open_image, DeviceTree};
//! use std::path::Path;
//!
//! let image = Path::new("recovery.img");
//! let unpacker = open_image(image, Some(Path::new("/opt/AIK-Linux")))?;
//! let info = unpacker.unpack(image)?;
//! let tree = DeviceTree::new(image, info)?;
//! let path = assemble(&tree, Path::new("output"), None)?;
//! unpacker.cleanup()?;
//! ```

pub mod assemble;
pub mod config;
pub mod device;
pub mod error;
pub mod image;
pub mod locate;
pub mod manifest;
pub mod preflight;
pub mod snapshot;
pub mod templates;
pub mod tree;

pub use assemble::{assemble, Assembler};
pub use config::Config;
pub use device::{DeviceInfo, Fstab, PropertySet};
pub use error::{Error, Result};
pub use image::{open_image, ImageInfo, Unpacker};
pub use manifest::TreeManifest;
pub use snapshot::{Identity, SnapshotRecorder};
pub use tree::DeviceTree;
