//! Build-and-package tooling for the jiskricka game.
//!
//! Runs the release build, then assembles a flat distributable folder
//! holding the game binary and the SFML runtime libraries it loads.
pub mod config;
pub mod error;
pub mod logging;
pub mod package;
pub mod toolchain;

pub use config::{ConfigOverrides, DistConfig, DistLayout};
pub use error::DistError;
pub use logging::{init as init_logging, Verbosity};
pub use package::{
    assemble, copy_binary, copy_runtime_libraries, ensure_output_dir, DistReport,
};
pub use toolchain::{BuildCommand, BuildStatus, CommandToolchain, Toolchain};
