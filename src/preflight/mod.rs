//! Preflight checks for host tools.
//!
//! Snapshot recording shells out to `git` and image unpacking to the
//! Android Image Kitchen scripts. Checking up front turns a cryptic spawn
//! failure into a list of packages to install.
//!
//! # Example
//!
//! ```rust
//! use recovery_dtgen::preflight::{command_exists, check_required_tools};
//!
//! if !command_exists("git") {
//!     println!("git not installed");
//! }
//!
//! let tools = &[("bash", "bash"), ("cpio", "cpio")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use crate::error::{Error, Result};

/// Check if a command exists in PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Tools needed to record a snapshot of the generated tree.
pub const SNAPSHOT_TOOLS: &[(&str, &str)] = &[("git", "git")];

/// Check that specific tools are available.
///
/// Each tuple is (command_name, package_name). Fails with every missing
/// tool listed.
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<_> = tools
        .iter()
        .filter(|(tool, _)| !command_exists(tool))
        .map(|(tool, package)| format!("  {} (install: {})", tool, package))
        .collect();

    if !missing.is_empty() {
        return Err(Error::MissingHostTools {
            tools: missing.join("\n"),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        // 'ls' should exist on any Unix system
        assert!(command_exists("ls"));
        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }

    #[test]
    fn test_check_required_tools_success() {
        let tools = &[("ls", "coreutils"), ("cat", "coreutils")];
        assert!(check_required_tools(tools).is_ok());
    }

    #[test]
    fn test_check_required_tools_failure() {
        let tools = &[("nonexistent_command_xyz", "fake-package"), ("ls", "coreutils")];
        let err = check_required_tools(tools).unwrap_err().to_string();
        assert!(err.contains("nonexistent_command_xyz (install: fake-package)"));
        assert!(!err.contains("coreutils"));
    }
}
