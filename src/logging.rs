//! Logger setup for the packaging binary.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// How much a packaging run reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only, for CI logs. Ignored build failures still
    /// show up.
    Quiet,
    /// One line per packaging step.
    #[default]
    Normal,
    /// Adds per-file copies and the resolved layout.
    Verbose,
}

impl Verbosity {
    /// Picks a verbosity from the `--quiet` / `--verbose` flags. `quiet`
    /// wins if both are set.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, true) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    /// Level filter used when `RUST_LOG` is unset.
    #[must_use]
    pub const fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Warn,
            Self::Normal => LevelFilter::Info,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

/// Initializes the global logger at `verbosity`.
///
/// `RUST_LOG` takes precedence. Output goes to stderr without timestamps or
/// module targets so CI logs stay readable.
pub fn init(verbosity: Verbosity) {
    let env = Env::default().default_filter_or(verbosity.level().to_string());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None).format_target(false);

    // `try_init` only fails if a logger was already set. Ignore that case so
    // tests can call `init` multiple times without panicking.
    let _ = builder.try_init();
}
