//! Error type shared by the packaging steps.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a packaging run.
#[derive(Debug, Error)]
pub enum DistError {
    /// Layered configuration could not be extracted.
    #[error("invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The build command failed while strict builds were requested.
    #[error("build command `{command}` did not succeed: {detail}")]
    BuildFailed {
        /// Rendered command line.
        command: String,
        /// Exit code or spawn failure description.
        detail: String,
    },

    /// The compiled binary is missing after the build step.
    #[error("compiled binary not found at {}", path.display())]
    BinaryNotFound {
        /// Expected location of the binary.
        path: PathBuf,
    },

    /// The runtime library directory does not exist.
    #[error("runtime library directory not found at {}", path.display())]
    LibraryDirNotFound {
        /// Expected location of the library directory.
        path: PathBuf,
    },

    /// A path that must be a regular file is a directory, a dangling
    /// symlink or has no file name.
    #[error("{} is not a regular file", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// The output directory could not be created.
    #[error("failed to create output directory {}", path.display())]
    CreateOutputDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// A directory listing failed part-way.
    #[error("failed to read directory {}", path.display())]
    ReadDir {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// A single file copy failed.
    #[error("failed to copy {} to {}", from.display(), to.display())]
    Copy {
        /// Source file.
        from: PathBuf,
        /// Destination file.
        to: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
}

impl From<figment::Error> for DistError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Convenience alias for results carrying [`DistError`].
pub type Result<T, E = DistError> = std::result::Result<T, E>;
