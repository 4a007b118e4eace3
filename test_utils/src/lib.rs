//! Utility helpers for tests.
//!
//! Builds throwaway project trees shaped like the game repository and
//! inspects the package directories produced from them.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Write a file of `len` bytes named `name` inside `dir`, creating `dir`
/// first if needed. Returns the file's path.
///
/// The content is a repeating byte pattern so truncated or mixed-up copies
/// are detectable.
///
/// # Panics
/// Panics if the directory or file cannot be written.
pub fn write_sized(dir: &Path, name: &str, len: usize) -> PathBuf {
    fs::create_dir_all(dir)
        .unwrap_or_else(|e| panic!("failed to create {}: {e}", dir.display()));
    let path = dir.join(name);
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(&path, data).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path
}

/// List the immediate entries of `dir` as `(name, size)` pairs sorted by
/// name. Directories appear with a trailing `/` and size `0`.
///
/// # Panics
/// Panics if `dir` cannot be read.
pub fn dir_listing(dir: &Path) -> Vec<(String, u64)> {
    let entries =
        fs::read_dir(dir).unwrap_or_else(|e| panic!("failed to read {}: {e}", dir.display()));
    let mut listing: Vec<(String, u64)> = entries
        .map(|entry| {
            let entry = entry.unwrap_or_else(|e| panic!("bad entry in {}: {e}", dir.display()));
            let meta = entry
                .metadata()
                .unwrap_or_else(|e| panic!("no metadata for {}: {e}", entry.path().display()));
            let name = entry.file_name().to_string_lossy().into_owned();
            if meta.is_dir() {
                (format!("{name}/"), 0)
            } else {
                (name, meta.len())
            }
        })
        .collect();
    listing.sort();
    listing
}

/// Assert that every file in `names` exists in `dir`.
///
/// # Panics
/// Panics with a helpful message if any file is missing.
pub fn assert_all_present(dir: &Path, names: &[&str]) {
    for name in names {
        assert!(
            dir.join(name).is_file(),
            "{name} not found in {}",
            dir.display()
        );
    }
}

/// Assert that no file in `names` exists in `dir`.
///
/// # Panics
/// Panics with a helpful message if any file is found.
pub fn assert_all_absent(dir: &Path, names: &[&str]) {
    for name in names {
        assert!(
            !dir.join(name).exists(),
            "{name} should not be present in {}",
            dir.display()
        );
    }
}

/// Temporary project tree with the default game layout.
///
/// The directory is removed when the fixture is dropped.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Relative directory the release binary is written to.
    pub const BINARY_DIR: &'static str = "target/release";
    /// Relative directory holding the runtime libraries.
    pub const LIB_DIR: &'static str = "SFML-2.6.1/bin";
    /// Relative output directory.
    pub const OUTPUT_DIR: &'static str = "build";

    /// Create an empty project tree.
    ///
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("failed to create temp dir: {e}"));
        Self { dir }
    }

    /// Root of the project.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of the output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root().join(Self::OUTPUT_DIR)
    }

    /// Absolute path of the runtime library directory.
    pub fn lib_dir(&self) -> PathBuf {
        self.root().join(Self::LIB_DIR)
    }

    /// Place a release binary of `len` bytes.
    pub fn with_binary(self, name: &str, len: usize) -> Self {
        write_sized(&self.root().join(Self::BINARY_DIR), name, len);
        self
    }

    /// Place a runtime library of `len` bytes.
    pub fn with_library(self, name: &str, len: usize) -> Self {
        write_sized(&self.lib_dir(), name, len);
        self
    }

    /// Create the output directory, optionally pre-populated with a file.
    pub fn with_output_file(self, name: &str, len: usize) -> Self {
        write_sized(&self.output_dir(), name, len);
        self
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}
