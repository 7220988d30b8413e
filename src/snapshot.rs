//! Record the assembled tree as a git commit.
//!
//! Each call to [`SnapshotRecorder::record`] appends exactly one commit, even
//! when nothing changed since the previous one.

use std::fmt;
use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::preflight::{check_required_tools, SNAPSHOT_TOOLS};

pub const DEFAULT_FALLBACK_NAME: &str = "recovery-dtgen";
pub const DEFAULT_FALLBACK_EMAIL: &str = "recovery-dtgen@localhost";

/// Commit author identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: DEFAULT_FALLBACK_NAME.to_string(),
            email: DEFAULT_FALLBACK_EMAIL.to_string(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotRecorder {
    fallback: Identity,
}

impl SnapshotRecorder {
    pub fn new(fallback: Identity) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> &Identity {
        &self.fallback
    }

    /// Initialize a repository at `path` if needed, stage everything and commit.
    pub fn record(&self, path: &Path, message: &str) -> Result<()> {
        check_required_tools(SNAPSHOT_TOOLS)?;

        if path.join(".git").exists() {
            debug!("Reusing git repo in {}", path.display());
        } else {
            info!("Creating git repo...");
            run_git(path, &["init", "-q"])?;
        }

        self.ensure_identity(path)?;

        run_git(path, &["add", "-A"])?;
        run_git(
            path,
            &[
                "-c",
                "commit.gpgsign=false",
                "commit",
                "--allow-empty",
                "--no-verify",
                "-q",
                "-m",
                message,
            ],
        )?;
        debug!("Repository now has {} commit(s)", commit_count(path)?);
        Ok(())
    }

    /// Fill in whichever of `user.name` / `user.email` is unset. Configured
    /// values are left alone.
    fn ensure_identity(&self, repo: &Path) -> Result<()> {
        match configured_identity(repo) {
            Ok(identity) => {
                debug!("Committing as {identity}");
                Ok(())
            }
            Err(Error::VcsIdentityUnavailable { missing }) => {
                warn!("git identity incomplete ({missing}), using {}", self.fallback);
                for (key, value) in [
                    ("user.name", &self.fallback.name),
                    ("user.email", &self.fallback.email),
                ] {
                    if config_value(repo, key)?.is_none() {
                        run_git(repo, &["config", "--local", key, value])?;
                    }
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// The identity git would commit with in `repo`.
pub fn configured_identity(repo: &Path) -> Result<Identity> {
    let name = config_value(repo, "user.name")?;
    let email = config_value(repo, "user.email")?;
    match (name, email) {
        (Some(name), Some(email)) => Ok(Identity { name, email }),
        (None, None) => Err(Error::VcsIdentityUnavailable {
            missing: "user.name and user.email",
        }),
        (None, _) => Err(Error::VcsIdentityUnavailable {
            missing: "user.name",
        }),
        (_, None) => Err(Error::VcsIdentityUnavailable {
            missing: "user.email",
        }),
    }
}

/// Number of commits reachable from HEAD.
pub fn commit_count(repo: &Path) -> Result<usize> {
    let count = run_git(repo, &["rev-list", "--count", "HEAD"])?;
    count.trim().parse().map_err(|_| Error::Vcs {
        command: "rev-list".to_string(),
        repo: repo.to_path_buf(),
        reason: format!("unexpected output '{}'", count.trim()),
    })
}

fn config_value(repo: &Path, key: &str) -> Result<Option<String>> {
    let output = git(repo, &["config", "--get", key])?;
    // exit code 1 means the key is not set
    if output.status.code() == Some(1) {
        return Ok(None);
    }
    let value = checked(repo, &["config", "--get", key], output)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn git(repo: &Path, args: &[&str]) -> Result<Output> {
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .map_err(|e| Error::Vcs {
            command: args.join(" "),
            repo: repo.to_path_buf(),
            reason: e.to_string(),
        })
}

fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    let output = git(repo, args)?;
    checked(repo, args, output)
}

fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    args.iter()
        .copied()
        .find(|arg| !arg.starts_with('-') && !arg.contains('='))
        .unwrap_or("git")
}

fn checked(repo: &Path, args: &[&str], output: Output) -> Result<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Vcs {
            command: subcommand(args).to_string(),
            repo: repo.to_path_buf(),
            reason: format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::command_exists;
    use std::fs;
    use tempfile::TempDir;

    fn git_available() -> bool {
        command_exists("git")
    }

    #[test]
    fn test_each_record_adds_one_commit() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("BoardConfig.mk"), "TARGET_ARCH := arm64\n").unwrap();
        let recorder = SnapshotRecorder::default();

        recorder.record(temp.path(), "xiaomi/sunny: Initial recovery device tree").unwrap();
        assert_eq!(commit_count(temp.path()).unwrap(), 1);

        // identical tree, still a new commit
        recorder.record(temp.path(), "xiaomi/sunny: Initial recovery device tree").unwrap();
        assert_eq!(commit_count(temp.path()).unwrap(), 2);
    }

    #[test]
    fn test_configured_name_is_kept() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        run_git(temp.path(), &["init", "-q"]).unwrap();
        run_git(temp.path(), &["config", "--local", "user.name", "Jane Doe"]).unwrap();
        fs::write(temp.path().join("README.md"), "# tree\n").unwrap();

        SnapshotRecorder::default().record(temp.path(), "init").unwrap();

        let identity = configured_identity(temp.path()).unwrap();
        assert_eq!(identity.name, "Jane Doe");
        let author = run_git(temp.path(), &["log", "-1", "--format=%an"]).unwrap();
        assert_eq!(author.trim(), "Jane Doe");
    }

    #[test]
    fn test_commit_stages_everything() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("recovery/root")).unwrap();
        fs::write(temp.path().join("recovery/root/init.recovery.qcom.rc"), "on init\n").unwrap();
        fs::write(temp.path().join("recovery.fstab"), "/data f2fs /dev/userdata\n").unwrap();

        SnapshotRecorder::default().record(temp.path(), "init").unwrap();

        let files = run_git(temp.path(), &["ls-files"]).unwrap();
        let files: Vec<&str> = files.lines().collect();
        assert_eq!(files, ["recovery.fstab", "recovery/root/init.recovery.qcom.rc"]);
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(
            Identity::default().to_string(),
            "recovery-dtgen <recovery-dtgen@localhost>"
        );
    }
}
