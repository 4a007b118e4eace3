//! Builds the game in release mode and assembles its distributable folder.
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;
use jiskricka_dist::config::CONFIG_FILE;
use jiskricka_dist::logging::Verbosity;
use jiskricka_dist::{assemble, init_logging, CommandToolchain, ConfigOverrides, DistConfig};
use log::info;

/// Build the game and assemble its distributable folder
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file; ignored when missing
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Directory to build in and resolve relative paths against
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Directory receiving the package
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory the release binary is written to
    #[arg(long)]
    binary_dir: Option<PathBuf>,

    /// File name of the release binary
    #[arg(long)]
    binary_name: Option<String>,

    /// Directory of runtime libraries to redistribute
    #[arg(long)]
    lib_dir: Option<PathBuf>,

    /// Package existing artifacts without running the build
    #[arg(long)]
    skip_build: bool,

    /// Abort when the build command fails
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            project_root: self.project_root.clone(),
            output_dir: self.output_dir.clone(),
            binary_dir: self.binary_dir.clone(),
            binary_name: self.binary_name.clone(),
            lib_dir: self.lib_dir.clone(),
            skip_build: self.skip_build.then_some(true),
            strict_build: self.strict.then_some(true),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    // Only the working directory's `.env`; parents are not searched.
    dotenvy::from_path(Path::new(".env")).ok();
    let args = Args::parse();
    init_logging(Verbosity::from_flags(args.quiet, args.verbose));

    let config = DistConfig::load(&args.config, &args.overrides())?;
    let toolchain = CommandToolchain::new(config.build.clone());
    let report = assemble(&config, &toolchain)?;

    info!(
        "packaged {} file(s) into {}",
        report.libraries.len() + 1,
        config.layout().output_dir.display()
    );
    Ok(())
}
