//! Layered configuration for a packaging run.
//!
//! Values are merged from built-in defaults, an optional TOML file,
//! `DIST_`-prefixed environment variables and command-line overrides, in
//! that order. With no file, variables or flags the defaults reproduce the
//! fixed layout of the game repository: `cargo build --release`, then
//! `target/release/jiskricka.exe` and the contents of `SFML-2.6.1/bin` copied
//! into `build/`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::toolchain::BuildCommand;

/// Default configuration file, resolved against the working directory.
pub const CONFIG_FILE: &str = "dist.toml";
/// Prefix of environment variables read by [`DistConfig::load`].
pub const ENV_PREFIX: &str = "DIST_";
/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "build";
/// Default directory holding the compiled binary.
pub const DEFAULT_BINARY_DIR: &str = "target/release";
/// Default file name of the compiled binary.
pub const DEFAULT_BINARY_NAME: &str = "jiskricka.exe";
/// Default directory of redistributed runtime libraries.
pub const DEFAULT_LIB_DIR: &str = "SFML-2.6.1/bin";

/// Settings for one packaging run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistConfig {
    /// Directory the build runs in; relative paths below resolve against it.
    pub project_root: PathBuf,
    /// Destination of the assembled package.
    pub output_dir: PathBuf,
    /// Directory the toolchain writes the release binary to.
    pub binary_dir: PathBuf,
    /// File name of the release binary.
    pub binary_name: String,
    /// Directory whose immediate files are redistributed.
    pub lib_dir: PathBuf,
    /// Command producing the release binary.
    pub build: BuildCommand,
    /// Package whatever is already on disk without building.
    pub skip_build: bool,
    /// Abort when the build command does not succeed.
    pub strict_build: bool,
}

impl Default for DistConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            binary_dir: PathBuf::from(DEFAULT_BINARY_DIR),
            binary_name: DEFAULT_BINARY_NAME.to_owned(),
            lib_dir: PathBuf::from(DEFAULT_LIB_DIR),
            build: BuildCommand::default(),
            skip_build: false,
            strict_build: false,
        }
    }
}

/// Command-line values layered on top of every other source.
///
/// `None` leaves the lower layers untouched.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConfigOverrides {
    /// Replacement for [`DistConfig::project_root`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    /// Replacement for [`DistConfig::output_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Replacement for [`DistConfig::binary_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_dir: Option<PathBuf>,
    /// Replacement for [`DistConfig::binary_name`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_name: Option<String>,
    /// Replacement for [`DistConfig::lib_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib_dir: Option<PathBuf>,
    /// Replacement for [`DistConfig::skip_build`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_build: Option<bool>,
    /// Replacement for [`DistConfig::strict_build`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_build: Option<bool>,
}

/// Concrete paths a run reads from and writes to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistLayout {
    /// Directory receiving the package.
    pub output_dir: PathBuf,
    /// Expected location of the compiled binary.
    pub binary_path: PathBuf,
    /// Directory of runtime libraries to copy.
    pub lib_dir: PathBuf,
}

impl DistConfig {
    /// Builds the provider chain without extracting it.
    ///
    /// A missing `config_file` is skipped; parent directories are not
    /// searched. Nested keys in the environment use a double underscore,
    /// e.g. `DIST_BUILD__PROGRAM`.
    #[must_use]
    pub fn figment(config_file: &Path, overrides: &ConfigOverrides) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Serialized::defaults(overrides))
    }

    /// Loads the merged configuration.
    ///
    /// # Errors
    /// Returns [`crate::DistError::Config`] when a source holds a value of
    /// the wrong type or the TOML file cannot be parsed.
    pub fn load(config_file: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        Ok(Self::figment(config_file, overrides).extract()?)
    }

    /// Resolves the configured paths against [`DistConfig::project_root`].
    #[must_use]
    pub fn layout(&self) -> DistLayout {
        DistLayout {
            output_dir: self.project_root.join(&self.output_dir),
            binary_path: self
                .project_root
                .join(&self.binary_dir)
                .join(&self.binary_name),
            lib_dir: self.project_root.join(&self.lib_dir),
        }
    }
}
