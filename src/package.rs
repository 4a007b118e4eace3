//! Assembly of the distributable folder.
//!
//! [`assemble`] runs the build and copy steps strictly in order. Nothing is
//! rolled back when a later step fails, and the output directory is never
//! cleared, so files from earlier runs survive unless overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::DistConfig;
use crate::error::{DistError, Result};
use crate::toolchain::{BuildStatus, Toolchain};

/// Summary of a successful packaging run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistReport {
    /// Outcome of the build step, `None` when it was skipped.
    pub build: Option<BuildStatus>,
    /// Where the binary was copied to.
    pub binary: PathBuf,
    /// Where each runtime library was copied to, in name order.
    pub libraries: Vec<PathBuf>,
}

/// Creates `output_dir` unless it already exists.
///
/// # Errors
/// Returns [`DistError::CreateOutputDir`] if the directory cannot be created,
/// for example because a file occupies the path.
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        debug!("output directory {} already exists", output_dir.display());
        return Ok(());
    }
    fs::create_dir_all(output_dir).map_err(|source| DistError::CreateOutputDir {
        path: output_dir.to_path_buf(),
        source,
    })
}

/// Copies the compiled binary into `output_dir`, keeping its file name.
///
/// Returns the destination path.
///
/// # Errors
/// Returns [`DistError::BinaryNotFound`] when nothing exists at
/// `binary_path`, [`DistError::NotAFile`] when something other than a file
/// does, or [`DistError::Copy`] when the copy itself fails.
pub fn copy_binary(binary_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    if !binary_path.exists() {
        return Err(DistError::BinaryNotFound {
            path: binary_path.to_path_buf(),
        });
    }
    let file_name = match binary_path.file_name() {
        Some(name) if binary_path.is_file() => name,
        _ => return Err(not_a_file(binary_path)),
    };
    let dest = output_dir.join(file_name);
    copy_file(binary_path, &dest)?;
    Ok(dest)
}

/// Copies every entry directly inside `lib_dir` into `output_dir`.
///
/// Entries are copied in name order and replace same-named files already in
/// `output_dir`. Symlinks are followed. Returns the destination paths.
///
/// # Errors
/// Returns [`DistError::LibraryDirNotFound`] when `lib_dir` does not exist,
/// [`DistError::ReadDir`] when it cannot be listed, [`DistError::NotAFile`]
/// when an entry is a subdirectory or a dangling symlink, or
/// [`DistError::Copy`] when a copy fails. Entries ordered before the failing
/// one have already been copied.
pub fn copy_runtime_libraries(lib_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir_err = |source: io::Error| DistError::ReadDir {
        path: lib_dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(lib_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DistError::LibraryDirNotFound {
                path: lib_dir.to_path_buf(),
            });
        }
        Err(e) => return Err(read_dir_err(e)),
    };

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(read_dir_err)?;
        sources.push((entry.file_name(), entry.path()));
    }
    sources.sort();

    let mut copied = Vec::with_capacity(sources.len());
    for (file_name, src) in sources {
        if !src.is_file() {
            return Err(not_a_file(&src));
        }
        let dest = output_dir.join(file_name);
        copy_file(&src, &dest)?;
        copied.push(dest);
    }
    Ok(copied)
}

/// Builds the project and assembles the output directory described by
/// `config`.
///
/// A failed build is logged and ignored unless
/// [`DistConfig::strict_build`] is set, in which case the run stops before
/// touching the filesystem.
///
/// # Errors
/// Returns [`DistError::BuildFailed`] in strict mode, otherwise any error
/// from [`ensure_output_dir`], [`copy_binary`] or
/// [`copy_runtime_libraries`].
pub fn assemble(config: &DistConfig, toolchain: &dyn Toolchain) -> Result<DistReport> {
    let layout = config.layout();
    debug!("resolved layout: {layout:?}");

    let build = if config.skip_build {
        info!("skipping build step");
        None
    } else {
        Some(run_build(config, toolchain)?)
    };

    ensure_output_dir(&layout.output_dir)?;

    let binary = copy_binary(&layout.binary_path, &layout.output_dir)?;
    info!("copied {} to {}", layout.binary_path.display(), binary.display());

    let libraries = copy_runtime_libraries(&layout.lib_dir, &layout.output_dir)?;
    info!(
        "copied {} runtime libraries from {}",
        libraries.len(),
        layout.lib_dir.display()
    );

    Ok(DistReport {
        build,
        binary,
        libraries,
    })
}

fn run_build(config: &DistConfig, toolchain: &dyn Toolchain) -> Result<BuildStatus> {
    let status = toolchain.build(&config.project_root);
    if status.is_success() {
        info!("build {status}");
        return Ok(status);
    }
    if config.strict_build {
        return Err(DistError::BuildFailed {
            command: toolchain.describe(),
            detail: status.to_string(),
        });
    }
    warn!("build {status}; packaging existing artifacts anyway");
    Ok(status)
}

fn not_a_file(path: &Path) -> DistError {
    DistError::NotAFile {
        path: path.to_path_buf(),
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    debug!("copying {} -> {}", src.display(), dest.display());
    fs::copy(src, dest)
        .map(|_| ())
        .map_err(|source| DistError::Copy {
            from: src.to_path_buf(),
            to: dest.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::MockToolchain;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use test_utils::{dir_listing, write_sized};

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn config_for(root: &Path) -> DistConfig {
        DistConfig {
            project_root: root.to_path_buf(),
            ..DistConfig::default()
        }
    }

    fn failing_toolchain() -> MockToolchain {
        let mut toolchain = MockToolchain::new();
        toolchain
            .expect_build()
            .times(1)
            .returning(|_| BuildStatus::Failed { code: Some(101) });
        toolchain
            .expect_describe()
            .returning(|| "cargo build --release".to_owned());
        toolchain
    }

    #[rstest]
    fn ensure_output_dir_is_idempotent(temp_dir: TempDir) {
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        write_sized(&out, "keep.txt", 3);
        ensure_output_dir(&out).unwrap();
        assert_eq!(dir_listing(&out), vec![("keep.txt".to_owned(), 3)]);
    }

    #[rstest]
    fn ensure_output_dir_rejects_file_in_the_way(temp_dir: TempDir) {
        let out = write_sized(temp_dir.path(), "build", 1);
        let err = ensure_output_dir(&out).unwrap_err();
        assert!(matches!(err, DistError::CreateOutputDir { .. }));
    }

    #[rstest]
    fn copy_binary_keeps_file_name(temp_dir: TempDir) {
        let bin = write_sized(&temp_dir.path().join("target/release"), "app.bin", 100);
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        let dest = copy_binary(&bin, &out).unwrap();
        assert_eq!(dest, out.join("app.bin"));
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&bin).unwrap());
    }

    #[rstest]
    fn copy_binary_reports_missing_binary(temp_dir: TempDir) {
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        let missing = temp_dir.path().join("target/release/app.bin");
        let err = copy_binary(&missing, &out).unwrap_err();
        assert!(matches!(err, DistError::BinaryNotFound { path } if path == missing));
        assert!(dir_listing(&out).is_empty());
    }

    #[rstest]
    fn copy_binary_rejects_directory(temp_dir: TempDir) {
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        let err = copy_binary(temp_dir.path(), &out).unwrap_err();
        assert!(matches!(err, DistError::NotAFile { .. }));
    }

    #[rstest]
    fn copy_binary_rejects_parent_component(temp_dir: TempDir) {
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        let parent = temp_dir.path().join("build/..");
        let err = copy_binary(&parent, &out).unwrap_err();
        assert!(matches!(err, DistError::NotAFile { path } if path == parent));
    }

    #[rstest]
    fn libraries_overwrite_existing_files(temp_dir: TempDir) {
        let libs = temp_dir.path().join("libs");
        let out = temp_dir.path().join("build");
        write_sized(&libs, "sfml-system-2.dll", 8);
        write_sized(&out, "sfml-system-2.dll", 64);

        copy_runtime_libraries(&libs, &out).unwrap();

        assert_eq!(
            fs::read(out.join("sfml-system-2.dll")).unwrap(),
            fs::read(libs.join("sfml-system-2.dll")).unwrap()
        );
    }

    #[rstest]
    fn libraries_fail_on_subdirectory(temp_dir: TempDir) {
        let libs = temp_dir.path().join("libs");
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        write_sized(&libs, "a.dll", 3);
        write_sized(&libs.join("debug"), "openal32-d.dll", 5);
        write_sized(&libs, "openal32.dll", 5);

        let err = copy_runtime_libraries(&libs, &out).unwrap_err();

        assert!(matches!(err, DistError::NotAFile { path } if path == libs.join("debug")));
        assert_eq!(dir_listing(&out), vec![("a.dll".to_owned(), 3)]);
    }

    #[cfg(unix)]
    #[rstest]
    fn libraries_fail_on_dangling_symlink(temp_dir: TempDir) {
        let libs = temp_dir.path().join("libs");
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        write_sized(&libs, "openal32.dll", 5);
        let link = libs.join("sfml-audio-2.dll");
        std::os::unix::fs::symlink(libs.join("missing.dll"), &link).unwrap();

        let err = copy_runtime_libraries(&libs, &out).unwrap_err();

        assert!(matches!(err, DistError::NotAFile { path } if path == link));
    }

    #[cfg(unix)]
    #[rstest]
    fn libraries_follow_symlinks(temp_dir: TempDir) {
        let libs = temp_dir.path().join("libs");
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        fs::create_dir_all(&libs).unwrap();
        let target = write_sized(temp_dir.path(), "real.dll", 7);
        std::os::unix::fs::symlink(&target, libs.join("linked.dll")).unwrap();

        copy_runtime_libraries(&libs, &out).unwrap();

        assert_eq!(dir_listing(&out), vec![("linked.dll".to_owned(), 7)]);
    }

    #[rstest]
    fn libraries_copied_in_name_order(temp_dir: TempDir) {
        let libs = temp_dir.path().join("libs");
        let out = temp_dir.path().join("build");
        ensure_output_dir(&out).unwrap();
        for name in ["c.dll", "a.dll", "b.dll"] {
            write_sized(&libs, name, 1);
        }
        let copied = copy_runtime_libraries(&libs, &out).unwrap();
        let names: Vec<_> = copied
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, ["a.dll", "b.dll", "c.dll"]);
    }

    #[rstest]
    fn missing_library_dir_is_reported(temp_dir: TempDir) {
        let missing = temp_dir.path().join("SFML-2.6.1/bin");
        let err = copy_runtime_libraries(&missing, temp_dir.path()).unwrap_err();
        assert!(matches!(err, DistError::LibraryDirNotFound { path } if path == missing));
    }

    #[rstest]
    fn failed_build_is_ignored_by_default(temp_dir: TempDir) {
        let root = temp_dir.path();
        write_sized(&root.join("target/release"), "jiskricka.exe", 100);
        write_sized(&root.join("SFML-2.6.1/bin"), "sfml-graphics-2.dll", 4);

        let report = assemble(&config_for(root), &failing_toolchain()).unwrap();

        assert_eq!(report.build, Some(BuildStatus::Failed { code: Some(101) }));
        assert_eq!(
            dir_listing(&root.join("build")),
            vec![
                ("jiskricka.exe".to_owned(), 100),
                ("sfml-graphics-2.dll".to_owned(), 4)
            ]
        );
    }

    #[rstest]
    fn strict_build_stops_before_packaging(temp_dir: TempDir) {
        let root = temp_dir.path();
        write_sized(&root.join("target/release"), "jiskricka.exe", 100);
        let config = DistConfig {
            strict_build: true,
            ..config_for(root)
        };

        let err = assemble(&config, &failing_toolchain()).unwrap_err();

        assert!(matches!(err, DistError::BuildFailed { .. }));
        assert!(!root.join("build").exists());
    }

    #[rstest]
    fn skip_build_never_invokes_toolchain(temp_dir: TempDir) {
        let root = temp_dir.path();
        write_sized(&root.join("target/release"), "jiskricka.exe", 10);
        write_sized(&root.join("SFML-2.6.1/bin"), "openal32.dll", 2);
        let mut toolchain = MockToolchain::new();
        toolchain.expect_build().times(0);
        let config = DistConfig {
            skip_build: true,
            ..config_for(root)
        };

        let report = assemble(&config, &toolchain).unwrap();

        assert_eq!(report.build, None);
        assert_eq!(report.libraries.len(), 1);
    }

    #[rstest]
    fn binary_is_copied_before_missing_library_dir_fails(temp_dir: TempDir) {
        let root = temp_dir.path();
        write_sized(&root.join("target/release"), "jiskricka.exe", 100);
        let expected_root = root.to_path_buf();
        let mut toolchain = MockToolchain::new();
        toolchain
            .expect_build()
            .withf(move |dir: &Path| dir == expected_root.as_path())
            .times(1)
            .returning(|_| BuildStatus::Succeeded);

        let err = assemble(&config_for(root), &toolchain).unwrap_err();

        assert!(matches!(err, DistError::LibraryDirNotFound { .. }));
        assert_eq!(
            dir_listing(&root.join("build")),
            vec![("jiskricka.exe".to_owned(), 100)]
        );
    }
}
