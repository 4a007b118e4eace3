//! Invocation of the external compiler toolchain.
//!
//! The build step is best-effort: [`CommandToolchain`] reports what
//! happened through [`BuildStatus`] and leaves the decision to continue to
//! the caller.

use std::fmt;
use std::path::Path;
use std::process::Command;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Program and arguments used to produce the release binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCommand {
    /// Executable to spawn, looked up on `PATH`.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: "cargo".to_owned(),
            args: vec!["build".to_owned(), "--release".to_owned()],
        }
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Outcome of a build attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildStatus {
    /// The build command exited successfully.
    Succeeded,
    /// The build command ran and exited unsuccessfully. `code` is `None`
    /// when the process was terminated by a signal.
    Failed {
        /// Process exit code, if any.
        code: Option<i32>,
    },
    /// The build command could not be started.
    NotStarted {
        /// Reason reported by the operating system.
        reason: String,
    },
}

impl BuildStatus {
    /// Returns `true` when the build command exited successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed { code: Some(code) } => write!(f, "exited with status {code}"),
            Self::Failed { code: None } => f.write_str("terminated by signal"),
            Self::NotStarted { reason } => write!(f, "could not be started: {reason}"),
        }
    }
}

/// Something able to build the project in a given directory.
#[cfg_attr(test, mockall::automock)]
pub trait Toolchain {
    /// Human readable description of what [`Toolchain::build`] runs.
    fn describe(&self) -> String;

    /// Runs the build to completion in `project_root`.
    fn build(&self, project_root: &Path) -> BuildStatus;
}

/// [`Toolchain`] that spawns a [`BuildCommand`] and waits for it.
#[derive(Clone, Debug, Default)]
pub struct CommandToolchain {
    command: BuildCommand,
}

impl CommandToolchain {
    /// Wraps `command` as a toolchain.
    #[must_use]
    pub const fn new(command: BuildCommand) -> Self {
        Self { command }
    }
}

impl Toolchain for CommandToolchain {
    fn describe(&self) -> String {
        self.command.to_string()
    }

    fn build(&self, project_root: &Path) -> BuildStatus {
        info!("running `{}` in {}", self.command, project_root.display());
        match Command::new(&self.command.program)
            .args(&self.command.args)
            .current_dir(project_root)
            .status()
        {
            Ok(status) if status.success() => BuildStatus::Succeeded,
            Ok(status) => {
                warn!("`{}` exited with status {status}", self.command);
                BuildStatus::Failed {
                    code: status.code(),
                }
            }
            Err(e) => {
                warn!("failed to run `{}`: {e}", self.command);
                BuildStatus::NotStarted {
                    reason: e.to_string(),
                }
            }
        }
    }
}
