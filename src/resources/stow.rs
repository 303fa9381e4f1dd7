//! GNU stow package resource.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A stow package linked from the stow directory into the target directory.
#[derive(Debug)]
pub struct StowPackageResource<'a> {
    /// Package directory name.
    pub package: String,
    stow_dir: PathBuf,
    target: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> StowPackageResource<'a> {
    /// Create a new stow package resource.
    #[must_use]
    pub fn new(package: String, stow_dir: &Path, target: &Path, executor: &'a dyn Executor) -> Self {
        Self {
            package,
            stow_dir: stow_dir.to_path_buf(),
            target: target.to_path_buf(),
            executor,
        }
    }

    fn package_dir(&self) -> PathBuf {
        self.stow_dir.join(&self.package)
    }
}

/// Every regular file or symlink below `dir`, relative to `dir`.
fn package_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current)
            .with_context(|| format!("reading {}", current.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else if let Ok(rel) = path.strip_prefix(dir) {
                files.push(rel.to_path_buf());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Whether `target` resolves to the same file as `source`.
///
/// Covers both per-file links and folded directory links created by stow.
fn resolves_to(target: &Path, source: &Path) -> bool {
    match (dunce::canonicalize(target), dunce::canonicalize(source)) {
        (Ok(t), Ok(s)) => t == s,
        _ => false,
    }
}

impl Resource for StowPackageResource<'_> {
    fn description(&self) -> String {
        format!("{} → {}", self.package, self.target.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        let package_dir = self.package_dir();
        if !package_dir.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} does not exist", package_dir.display()),
            });
        }

        let mut linked = 0usize;
        let files = package_files(&package_dir)?;
        for rel in &files {
            let target = self.target.join(rel);
            if resolves_to(&target, &package_dir.join(rel)) {
                linked += 1;
            } else if target.symlink_metadata().is_ok() {
                return Ok(ResourceState::Incorrect {
                    current: format!("{} exists and is not a link into the package", target.display()),
                });
            }
        }

        if linked == files.len() {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor.run(
            "stow",
            &[
                "--dir",
                &self.stow_dir.to_string_lossy(),
                "--target",
                &self.target.to_string_lossy(),
                "--stow",
                &self.package,
            ],
        )?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;
    use std::os::unix::fs::symlink;

    struct Fixture {
        _tmp: tempfile::TempDir,
        stow: PathBuf,
        home: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let stow = tmp.path().join("dotfiles");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(stow.join("zsh/.config/zsh")).unwrap();
        std::fs::write(stow.join("zsh/.zshrc"), "# zshrc").unwrap();
        std::fs::write(stow.join("zsh/.config/zsh/aliases.zsh"), "# aliases").unwrap();
        std::fs::create_dir_all(&home).unwrap();
        Fixture {
            _tmp: tmp,
            stow,
            home,
        }
    }

    #[test]
    fn unlinked_package_is_missing() {
        let f = fixture();
        let executor = MockExecutor::default();
        let resource = StowPackageResource::new("zsh".to_string(), &f.stow, &f.home, &executor);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn per_file_links_are_correct() {
        let f = fixture();
        symlink(f.stow.join("zsh/.zshrc"), f.home.join(".zshrc")).unwrap();
        std::fs::create_dir_all(f.home.join(".config/zsh")).unwrap();
        symlink(
            f.stow.join("zsh/.config/zsh/aliases.zsh"),
            f.home.join(".config/zsh/aliases.zsh"),
        )
        .unwrap();
        let executor = MockExecutor::default();
        let resource = StowPackageResource::new("zsh".to_string(), &f.stow, &f.home, &executor);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn folded_directory_link_is_correct() {
        let f = fixture();
        symlink(f.stow.join("zsh/.zshrc"), f.home.join(".zshrc")).unwrap();
        symlink(f.stow.join("zsh/.config"), f.home.join(".config")).unwrap();
        let executor = MockExecutor::default();
        let resource = StowPackageResource::new("zsh".to_string(), &f.stow, &f.home, &executor);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }

    #[test]
    fn conflicting_file_is_incorrect() {
        let f = fixture();
        std::fs::write(f.home.join(".zshrc"), "# mine").unwrap();
        let executor = MockExecutor::default();
        let resource = StowPackageResource::new("zsh".to_string(), &f.stow, &f.home, &executor);
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
    }

    #[test]
    fn missing_package_dir_is_invalid() {
        let f = fixture();
        let executor = MockExecutor::default();
        let resource = StowPackageResource::new("nvim".to_string(), &f.stow, &f.home, &executor);
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn apply_runs_stow() {
        let executor = MockExecutor::ok("");
        let resource = StowPackageResource::new(
            "zsh".to_string(),
            Path::new("/srv/dotfiles"),
            Path::new("/home/alice"),
            &executor,
        );
        resource.apply().unwrap();
        assert_eq!(
            executor.calls(),
            vec!["stow --dir /srv/dotfiles --target /home/alice --stow zsh"]
        );
    }
}
